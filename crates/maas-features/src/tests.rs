//! Unit tests for maas-features.

#[cfg(test)]
mod helpers {
    use maas_core::GeoPoint;
    use maas_graph::{EdgeAttrs, NodeAttrs, RoadNetwork, RoadNetworkBuilder};

    use crate::FeatureVector;

    /// Three nodes in a chain of stored edges: 0 -> 1 -> 2.
    pub fn chain_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        let n1 = b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        let n2 = b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        b.add_edge(n0, n1, EdgeAttrs::new(100.0, 50.0));
        b.add_edge(n1, n2, EdgeAttrs::new(250.0, 80.0));
        b.build().unwrap()
    }

    /// Hand-picked features whose unsmoothed targets are:
    ///
    /// ```text
    /// node 0: flow 0.38, eta 0.70, fleet 0.40
    /// node 1: flow 0.23, eta 0.80, fleet 0.20
    /// node 2: flow 0.00, eta 0.20, fleet 0.00
    /// ```
    pub fn fixed_features() -> Vec<FeatureVector> {
        vec![
            FeatureVector {
                population_density: 0.5,
                traffic_volume:     0.4,
                normalized_speed:   0.5,
                is_motorway_hub:    0.0,
                pending_requests:   2.0,
            },
            FeatureVector {
                population_density: 0.5,
                traffic_volume:     0.2,
                normalized_speed:   0.3,
                is_motorway_hub:    0.0,
                pending_requests:   1.0,
            },
            FeatureVector {
                population_density: 0.5,
                traffic_volume:     0.0,
                normalized_speed:   0.8,
                is_motorway_hub:    0.0,
                pending_requests:   0.0,
            },
        ]
    }

    pub fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }
}

// ── Target synthesis ──────────────────────────────────────────────────────────

#[cfg(test)]
mod targets {
    use super::helpers::{close, fixed_features};
    use crate::{synthesize_target, FeatureVector};

    #[test]
    fn formulas() {
        let t: Vec<_> = fixed_features().iter().map(synthesize_target).collect();
        assert!(close(t[0].predicted_flow, 0.38));
        assert!(close(t[0].optimal_eta, 0.70));
        assert!(close(t[0].fleet_allocation_score, 0.40));
        assert!(close(t[1].predicted_flow, 0.23));
        assert!(close(t[1].optimal_eta, 0.80));
        assert!(close(t[2].optimal_eta, 0.20));
    }

    #[test]
    fn monotone_in_demand_inverse_in_speed() {
        let base = FeatureVector {
            population_density: 0.5,
            traffic_volume:     0.5,
            normalized_speed:   0.5,
            is_motorway_hub:    0.0,
            pending_requests:   2.5,
        };
        let busier = FeatureVector { traffic_volume: 0.9, pending_requests: 4.0, ..base };
        let faster = FeatureVector { normalized_speed: 0.8, ..base };

        let (t, tb, tf) = (synthesize_target(&base), synthesize_target(&busier), synthesize_target(&faster));
        assert!(tb.predicted_flow > t.predicted_flow);
        assert!(tb.optimal_eta > t.optimal_eta);
        assert!(tb.fleet_allocation_score > t.fleet_allocation_score);
        assert!(tf.predicted_flow < t.predicted_flow);
        assert!(tf.optimal_eta < t.optimal_eta);
    }
}

// ── Smoothing ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod smoothing {
    use super::helpers::{chain_network, close, fixed_features};
    use crate::{smooth_targets, synthesize_target};

    #[test]
    fn single_pass_uses_unsmoothed_sources() {
        let net = chain_network();
        let mut t: Vec<_> = fixed_features().iter().map(synthesize_target).collect();
        smooth_targets(&net, &mut t);

        // Node 0 has no predecessor.
        assert!(close(t[0].predicted_flow, 0.38));
        assert!(close(t[0].optimal_eta, 0.70));
        assert!(close(t[0].fleet_allocation_score, 0.40));

        // Node 1 += 0.1 × node 0.
        assert!(close(t[1].predicted_flow, 0.23 + 0.038));
        assert!(close(t[1].optimal_eta, 0.80 + 0.070));
        assert!(close(t[1].fleet_allocation_score, 0.20 + 0.040));

        // Node 2 += 0.1 × *unsmoothed* node 1 (0.0268 would mean node 0 leaked two hops).
        assert!(close(t[2].predicted_flow, 0.023));
        assert!(close(t[2].optimal_eta, 0.20 + 0.080));
        assert!(close(t[2].fleet_allocation_score, 0.020));
    }

    #[test]
    fn edge_order_does_not_matter() {
        use maas_core::GeoPoint;
        use maas_graph::{EdgeAttrs, NodeAttrs, RoadNetworkBuilder};

        // Same chain, edges inserted in reverse order.
        let mut b = RoadNetworkBuilder::new();
        for _ in 0..3 {
            b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        }
        b.add_edge(maas_core::NodeId(1), maas_core::NodeId(2), EdgeAttrs::new(250.0, 80.0));
        b.add_edge(maas_core::NodeId(0), maas_core::NodeId(1), EdgeAttrs::new(100.0, 50.0));
        let reversed = b.build().unwrap();

        let base: Vec<_> = fixed_features().iter().map(synthesize_target).collect();
        let mut a = base.clone();
        let mut c = base;
        smooth_targets(&chain_network(), &mut a);
        smooth_targets(&reversed, &mut c);
        assert_eq!(a, c);
    }
}

// ── Training set assembly ─────────────────────────────────────────────────────

#[cfg(test)]
mod training_set {
    use std::io::Write;

    use maas_core::SimRng;
    use maas_graph::RoadNetworkBuilder;

    use super::helpers::chain_network;
    use crate::{build_training_set, load, sample_training_features, FeatureError, NODE_FEATURES, TARGETS};

    #[test]
    fn shapes() {
        let set = build_training_set(&chain_network(), &mut SimRng::new(3)).unwrap();
        assert_eq!(set.tensors.features.dim(), (3, NODE_FEATURES));
        assert_eq!(set.targets.dim(), (3, TARGETS));
        // Two stored edges, both directions.
        assert_eq!(set.tensors.edge_index.dim(), (2, 4));
        assert_eq!(set.tensors.edge_attr.dim(), (4, 2));
    }

    #[test]
    fn edge_attributes_are_length_and_scaled_speed() {
        let set = build_training_set(&chain_network(), &mut SimRng::new(3)).unwrap();
        assert_eq!(set.tensors.edge_attr.row(0).to_vec(), vec![100.0, 0.5]);
        assert_eq!(set.tensors.edge_attr.row(1).to_vec(), vec![100.0, 0.5]);
        assert_eq!(set.tensors.edge_attr.row(2).to_vec(), vec![250.0, 0.8]);
    }

    #[test]
    fn sampled_features_respect_bounds() {
        let net = chain_network();
        let mut rng = SimRng::new(9);
        for _ in 0..50 {
            for f in sample_training_features(&net, &mut rng) {
                assert_eq!(f.population_density, 0.5);
                assert!((0.05..=0.5).contains(&f.traffic_volume));
                assert!([0.3, 0.5, 0.8].contains(&f.normalized_speed));
                assert_eq!(f.is_motorway_hub, 0.0);
                assert!((0.0..=2.5).contains(&f.pending_requests));
            }
        }
    }

    #[test]
    fn seeded_sets_are_identical() {
        let a = build_training_set(&chain_network(), &mut SimRng::new(42)).unwrap();
        let b = build_training_set(&chain_network(), &mut SimRng::new(42)).unwrap();
        assert_eq!(a.tensors.features, b.tensors.features);
        assert_eq!(a.targets, b.targets);
    }

    #[test]
    fn empty_network_rejected() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        let err = build_training_set(&net, &mut SimRng::new(0)).unwrap_err();
        assert!(matches!(err, FeatureError::EmptyNetwork));
    }

    #[test]
    fn primary_nodes_are_hubs() {
        let json = r#"{ "nodes": [ { "id": 0, "highway": "primary", "population_density": 0.9 },
                                   { "id": 1, "population_density": 0.2 } ],
                        "edges": [ { "source": 0, "target": 1, "length": 50.0, "maxspeed": "30" } ] }"#;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();

        let set = load(f.path(), &mut SimRng::new(1)).unwrap();
        assert_eq!(set.tensors.features[[0, 3]], 1.0);
        assert_eq!(set.tensors.features[[1, 3]], 0.0);
        assert_eq!(set.tensors.features[[0, 0]], 0.9);
    }

    #[test]
    fn missing_dataset_reported_as_unavailable() {
        let err = load(std::path::Path::new("/missing/net.json"), &mut SimRng::new(1)).unwrap_err();
        assert!(err.is_dataset_unavailable());
    }
}
