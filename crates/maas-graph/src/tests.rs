//! Unit tests for maas-graph.
//!
//! All tests use hand-crafted networks or inline JSON documents.

#[cfg(test)]
mod helpers {
    use maas_core::GeoPoint;

    use crate::{EdgeAttrs, NodeAttrs, RoadNetwork, RoadNetworkBuilder};

    /// Four nodes, three stored roads:
    ///
    /// ```text
    ///   0 -> 1,  1 -> 2,  0 -> 3
    /// ```
    pub fn star_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let n: Vec<_> = (0..4)
            .map(|i| b.add_node(NodeAttrs::with_density(GeoPoint::new(18.9 + i as f64 * 0.01, 72.8), 0.5)))
            .collect();
        b.add_edge(n[0], n[1], EdgeAttrs::new(100.0, 50.0));
        b.add_edge(n[1], n[2], EdgeAttrs::new(200.0, 30.0));
        b.add_edge(n[0], n[3], EdgeAttrs::new(300.0, 80.0));
        b.build().unwrap()
    }

    pub const SAMPLE_JSON: &str = r#"{
        "metadata": { "source": "test", "nodes_count": 3, "edges_count": 3 },
        "nodes": [
            { "id": 1, "y": 18.95, "x": 72.83, "highway": "standard", "population_density": 0.43, "ward_name": "Ward B" },
            { "id": 0, "y": 18.93, "x": 72.82, "highway": "primary",  "population_density": 1.0,  "ward_name": "Ward C" },
            { "id": 2, "y": 18.97, "x": 72.81 }
        ],
        "edges": [
            { "source": 0, "target": 1, "length": 87.5, "highway": "primary", "maxspeed": "40 mph", "name": "Marine Drive" },
            { "source": 1, "target": 2, "highway": ["secondary", "tertiary"], "maxspeed": ["60", "30"] },
            { "source": 2, "target": 0, "length": 12.0, "maxspeed": "none", "name": ["A", "B"] }
        ]
    }"#;
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use maas_core::{GeoPoint, NodeId};

    use crate::{EdgeAttrs, GraphError, NodeAttrs, RoadNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn stored_direction_only() {
        let net = super::helpers::star_network();
        assert_eq!(net.edge_count(), 3);
        assert_eq!(net.out_degree(NodeId(0)), 2);
        assert_eq!(net.out_degree(NodeId(1)), 1);
        assert_eq!(net.out_degree(NodeId(2)), 0);
        assert_eq!(net.out_degree(NodeId(3)), 0);
    }

    #[test]
    fn out_edges_keep_source_and_dataset_order() {
        let net = super::helpers::star_network();
        let targets: Vec<NodeId> = net
            .out_edges(NodeId(0))
            .map(|e| {
                assert_eq!(net.edge_from[e.index()], NodeId(0));
                net.edge_to[e.index()]
            })
            .collect();
        assert_eq!(targets, vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn edge_out_of_range_rejected() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        b.add_edge(a, NodeId(9), EdgeAttrs::new(10.0, 30.0));
        let err = b.build().unwrap_err();
        assert!(matches!(err, GraphError::EdgeOutOfRange { node_count: 1, .. }));
    }

    #[test]
    fn density_clamped() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(NodeAttrs::with_density(GeoPoint::default(), 1.7));
        b.add_node(NodeAttrs::with_density(GeoPoint::default(), -0.2));
        b.add_node(NodeAttrs::with_density(GeoPoint::default(), f64::NAN));
        let net = b.build().unwrap();
        assert_eq!(net.node_density, vec![1.0, 0.0, 0.0]);
    }
}

// ── Dataset loading ───────────────────────────────────────────────────────────

#[cfg(test)]
mod dataset {
    use std::io::Write;
    use std::path::Path;

    use maas_core::NodeId;

    use crate::dataset::{parse_speed, SpeedValue, DEFAULT_LENGTH_M, DEFAULT_POPULATION_DENSITY, DEFAULT_SPEED_KPH};
    use crate::{load_network, read_dataset, write_dataset, GraphError, RawDataset};

    fn sample() -> RawDataset {
        serde_json::from_str(super::helpers::SAMPLE_JSON).unwrap()
    }

    #[test]
    fn speed_strings_normalised() {
        assert_eq!(parse_speed("50"), Some(50.0));
        assert_eq!(parse_speed("30 mph"), Some(30.0));
        assert_eq!(parse_speed("60km/h"), Some(60.0));
        assert_eq!(parse_speed(" 40 KM/H "), Some(40.0));
        assert_eq!(parse_speed("50;30"), Some(50.0));
        assert_eq!(parse_speed("none"), None);
        assert_eq!(parse_speed(""), None);
    }

    #[test]
    fn speed_lists_take_first() {
        let v = SpeedValue::Many(vec![SpeedValue::Text("70".into()), SpeedValue::Number(30.0)]);
        assert_eq!(v.numeric(), Some(70.0));
        assert_eq!(SpeedValue::Many(vec![]).numeric(), None);
    }

    #[test]
    fn nodes_sorted_by_id() {
        let net = sample().to_network().unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.node_highway[0], "primary");
        assert_eq!(net.node_ward[1], "Ward B");
        assert!((net.node_pos[0].lat - 18.93).abs() < 1e-12);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let net = sample().to_network().unwrap();
        // Node 2 has no density, tag, or ward.
        assert_eq!(net.node_density[2], DEFAULT_POPULATION_DENSITY);
        assert_eq!(net.node_highway[2], "standard");
        assert_eq!(net.node_ward[2], "");

        let e12 = net.out_edges(NodeId(1)).next().unwrap().index();
        assert_eq!(net.edge_length_m[e12], DEFAULT_LENGTH_M);
        assert_eq!(net.edge_speed_kph[e12], 60.0);
        assert_eq!(net.edge_highway[e12], "secondary");
        assert_eq!(net.edge_name[e12], "Unnamed Road");

        let e20 = net.out_edges(NodeId(2)).next().unwrap().index();
        assert_eq!(net.edge_speed_kph[e20], DEFAULT_SPEED_KPH);
        assert_eq!(net.edge_name[e20], "A");

        let e01 = net.out_edges(NodeId(0)).next().unwrap().index();
        assert_eq!(net.edge_speed_kph[e01], 40.0);
        assert_eq!(net.edge_length_m[e01], 87.5);
    }

    #[test]
    fn numeric_maxspeed_accepted() {
        let json = r#"{ "nodes": [ { "id": 0 }, { "id": 1 } ],
                        "edges": [ { "source": 0, "target": 1, "maxspeed": 80 } ] }"#;
        let raw: RawDataset = serde_json::from_str(json).unwrap();
        let net = raw.to_network().unwrap();
        assert_eq!(net.edge_speed_kph[0], 80.0);
    }

    #[test]
    fn sparse_ids_rejected() {
        let json = r#"{ "nodes": [ { "id": 0 }, { "id": 2 } ], "edges": [] }"#;
        let raw: RawDataset = serde_json::from_str(json).unwrap();
        let err = raw.to_network().unwrap_err();
        assert!(matches!(err, GraphError::NonContiguousIds { expected: 1, found: 2 }));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_network(Path::new("/no/such/dataset.json")).unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(err, GraphError::Unavailable { .. }));
    }

    #[test]
    fn malformed_file_is_unavailable() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{ \"nodes\": 12 }}").unwrap();
        let err = read_dataset(f.path()).unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(err, GraphError::Malformed { .. }));
    }

    #[test]
    fn structural_errors_are_not_unavailable() {
        let err = GraphError::NonContiguousIds { expected: 0, found: 3 };
        assert!(!err.is_unavailable());
    }

    #[test]
    fn write_then_load_preserves_network() {
        let net = sample().to_network().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        write_dataset(&path, &RawDataset::from_network(&net, "roundtrip")).unwrap();

        let raw = read_dataset(&path).unwrap();
        assert_eq!(raw.metadata.source, "roundtrip");
        assert_eq!(raw.metadata.nodes_count, 3);
        assert_eq!(raw.metadata.edges_count, 3);

        let back = load_network(&path).unwrap();
        assert_eq!(back.edge_from, net.edge_from);
        assert_eq!(back.edge_to, net.edge_to);
        assert_eq!(back.edge_speed_kph, net.edge_speed_kph);
        assert_eq!(back.edge_length_m, net.edge_length_m);
        assert_eq!(back.node_density, net.node_density);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_is_reported() {
        let net = sample().to_network().unwrap();
        let result = write_dataset(Path::new("/dev/full"), &RawDataset::from_network(&net, "full"));
        assert!(result.is_err());
    }
}

// ── Undirected expansion & tensors ────────────────────────────────────────────

#[cfg(test)]
mod expand {
    use maas_core::{EdgeId, GeoPoint};
    use ndarray::{array, Array2};

    use crate::{expand_undirected, EdgeAttrs, GraphError, GraphTensors, NodeAttrs, RoadNetworkBuilder};

    #[test]
    fn both_directions_with_identical_attributes() {
        let net = super::helpers::star_network();
        let (index, attr) = expand_undirected(&net, |e| [net.edge_length_m[e.index()], 1.0]);

        assert_eq!(index.dim(), (2, 6));
        assert_eq!(attr.dim(), (6, 2));
        for pair in 0..3 {
            let (f, r) = (2 * pair, 2 * pair + 1);
            assert_eq!(index[[0, f]], index[[1, r]]);
            assert_eq!(index[[1, f]], index[[0, r]]);
            assert_eq!(attr.row(f), attr.row(r));
        }
        assert_eq!(index.row(0).to_vec(), vec![0, 1, 0, 3, 1, 2]);
    }

    #[test]
    fn attribute_fn_called_once_per_stored_edge() {
        let net = super::helpers::star_network();
        let mut calls: Vec<EdgeId> = Vec::new();
        let (_, attr) = expand_undirected(&net, |e| {
            calls.push(e);
            [calls.len() as f64, 0.0]
        });
        assert_eq!(calls, vec![EdgeId(0), EdgeId(1), EdgeId(2)]);
        assert_eq!(attr.column(0).to_vec(), vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn self_loop_emitted_once() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(NodeAttrs::with_density(GeoPoint::default(), 0.5));
        b.add_edge(a, a, EdgeAttrs::new(10.0, 30.0));
        let net = b.build().unwrap();
        let (index, _) = expand_undirected(&net, |_| [0.0, 0.0]);
        assert_eq!(index.ncols(), 1);
    }

    #[test]
    fn tensors_validate_shapes() {
        let x = Array2::<f64>::zeros((3, 5));
        let idx = array![[0usize, 1], [1, 2]];
        assert!(GraphTensors::new(x.clone(), idx.clone(), Array2::zeros((2, 2))).is_ok());

        let err = GraphTensors::new(x.clone(), idx.clone(), Array2::zeros((3, 2))).unwrap_err();
        assert!(matches!(err, GraphError::ShapeMismatch { what: "edge attributes", .. }));

        let bad_idx = array![[0usize, 7], [1, 2]];
        let err = GraphTensors::new(x, bad_idx, Array2::zeros((2, 2))).unwrap_err();
        assert!(matches!(err, GraphError::EdgeOutOfRange { node_count: 3, .. }));
    }

    #[test]
    fn edge_pairs_iterate_columns() {
        let t = GraphTensors::new(
            Array2::zeros((3, 5)),
            array![[0usize, 2], [1, 0]],
            Array2::zeros((2, 2)),
        )
        .unwrap();
        assert_eq!(t.edge_pairs().collect::<Vec<_>>(), vec![(0, 1), (2, 0)]);
        assert_eq!(t.num_nodes(), 3);
        assert_eq!(t.num_edges(), 2);
    }
}

// ── Synthetic networks ────────────────────────────────────────────────────────

#[cfg(test)]
mod synthetic {
    use maas_core::SimRng;

    use crate::SyntheticSpec;

    #[test]
    fn seeded_generation_is_reproducible() {
        let spec = SyntheticSpec { num_nodes: 40, edge_probability: 0.1, ..Default::default() };
        let a = spec.generate(&mut SimRng::new(5)).unwrap();
        let b = spec.generate(&mut SimRng::new(5)).unwrap();
        assert_eq!(a.edge_from, b.edge_from);
        assert_eq!(a.edge_to, b.edge_to);
        assert_eq!(a.node_density, b.node_density);
    }

    #[test]
    fn attributes_within_bounds() {
        let spec = SyntheticSpec { num_nodes: 60, edge_probability: 0.2, ..Default::default() };
        let net = spec.generate(&mut SimRng::new(17)).unwrap();
        assert_eq!(net.node_count(), 60);
        assert!(net.edge_count() > 0);
        for &d in &net.node_density {
            assert!((0.25..=1.0).contains(&d));
        }
        for p in &net.node_pos {
            assert!((spec.south_west.lat..=spec.north_east.lat).contains(&p.lat));
            assert!((spec.south_west.lon..=spec.north_east.lon).contains(&p.lon));
        }
        for e in net.edges() {
            let (u, v) = net.endpoints(e);
            assert!(u < v, "pairs are stored low -> high");
        }
    }

    #[test]
    fn zero_probability_has_no_edges() {
        let spec = SyntheticSpec { num_nodes: 10, edge_probability: 0.0, ..Default::default() };
        let net = spec.generate(&mut SimRng::new(1)).unwrap();
        assert_eq!(net.edge_count(), 0);
    }
}
