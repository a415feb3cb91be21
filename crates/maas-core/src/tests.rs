//! Unit tests for maas-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(EdgeId(3).to_string(), "EdgeId(3)");
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        let xs: Vec<u64> = (0..4).map(|_| a.random()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.random()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn gen_bool_clamps_probability() {
        let mut rng = SimRng::new(3);
        assert!(rng.gen_bool(1.5));
        assert!(!rng.gen_bool(-0.5));
    }

    #[test]
    fn gen_range_stays_in_bounds() {
        let mut rng = SimRng::new(11);
        for _ in 0..1_000 {
            let v: f64 = rng.gen_range(0.7..1.0);
            assert!((0.7..1.0).contains(&v));
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}

#[cfg(test)]
mod config {
    use std::io::Write;
    use std::path::Path;

    use serde::Deserialize;

    use crate::config::parse_toml;
    use crate::{load_toml, MaasError};

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        epochs: usize,
        name:   String,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self { epochs: 500, name: "default".into() }
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Sample = parse_toml("epochs = 20\n", Path::new("inline")).unwrap();
        assert_eq!(s, Sample { epochs: 20, name: "default".into() });
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = parse_toml::<Sample>("epochs = [", Path::new("bad.toml")).unwrap_err();
        match err {
            MaasError::Toml { path, .. } => assert_eq!(path, Path::new("bad.toml")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "name = \"mumbai\"").unwrap();
        let s: Sample = load_toml(f.path()).unwrap();
        assert_eq!(s.name, "mumbai");
        assert_eq!(s.epochs, 500);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_toml::<Sample>(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, MaasError::Io(_)));
    }
}
