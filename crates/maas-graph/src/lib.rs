//! `maas-graph`: road network, dataset I/O, and tensor conversion.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `RoadNetwork` (CSR), `RoadNetworkBuilder`, attribute types|
//! | [`dataset`]   | JSON dataset schema, `load_network`, `write_dataset`,     |
//! |               | maxspeed normalisation                                    |
//! | [`expand`]    | `expand_undirected`: the one place both directions of a  |
//! |               | stored road are materialised                              |
//! | [`tensors`]   | `GraphTensors`, `EdgeIndex`                               |
//! | [`synthetic`] | Erdős–Rényi networks for datasets without a map extract   |
//! | [`error`]     | `GraphError`, `GraphResult<T>`                            |
//!
//! Edges are stored in the direction the dataset lists them.  Roads are
//! physically bidirectional, so any consumer that needs undirected
//! connectivity goes through [`expand_undirected`].

pub mod dataset;
pub mod error;
pub mod expand;
pub mod network;
pub mod synthetic;
pub mod tensors;

#[cfg(test)]
mod tests;

pub use dataset::{load_network, read_dataset, write_dataset, RawDataset};
pub use error::{GraphError, GraphResult};
pub use expand::expand_undirected;
pub use network::{EdgeAttrs, NodeAttrs, RoadNetwork, RoadNetworkBuilder};
pub use synthetic::SyntheticSpec;
pub use tensors::{EdgeIndex, GraphTensors, EDGE_FEATURES};
