//! `maas-gnn`: the road-capacity graph network.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`message`]   | `MessageGraph`: aggregation lists and self-looped         |
//! |               | attention edges, built once per graph                     |
//! | [`layers`]    | `SageConv`, `GraphNorm`, `GatConv`, `Linear`, activations |
//! | [`network`]   | `MaasGraphNetwork`, `NetworkConfig`, fleet-impact head    |
//! | [`loss`]      | Mean squared error and its gradient                       |
//! | [`optim`]     | Adam with L2 weight decay                                 |
//! | [`persist`]   | JSON parameter files, `load_or_init` fallback             |
//! | [`error`]     | `GnnError`, `GnnResult<T>`                                |
//!
//! Gradients are computed by hand: each layer's `forward` returns a cache
//! and its `backward` consumes it, accumulating into a zeroed copy of the
//! parameters.

pub mod error;
pub mod layers;
pub mod loss;
pub mod message;
pub mod network;
pub mod optim;
pub mod persist;


pub use error::{GnnError, GnnResult};
pub use layers::Parameterized;
pub use loss::{mse_grad, mse_loss};
pub use message::MessageGraph;
pub use network::{
    column_means, impact_from_predictions, ForwardCache, MaasGraphNetwork, NetworkConfig, NetworkParams,
    FLEET_CHANNEL,
};
pub use optim::Adam;
pub use persist::ParamSource;
