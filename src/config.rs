use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{classify::Classifier, dedup::Dedup};

pub const DEFAULT_PATH: &str = "courses.yaml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dedup: Dedup,
    pub classifier: Classifier,
    /// Downloaded extracts and their candidate caches.
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dedup: Dedup::default(),
            classifier: Classifier::default(),
            cache_dir: PathBuf::from(".cache/osm"),
            output_dir: PathBuf::from("data/courses"),
        }
    }
}

impl Config {
    /// Reads `path`, or `courses.yaml` if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(x) => x,
            None if Path::new(DEFAULT_PATH).exists() => Path::new(DEFAULT_PATH),
            None => return Ok(Self::default()),
        };
        debug!("reading config from {}", path.display());
        let yaml =
            read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&yaml).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.dedup.validate().context("invalid dedup settings")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::Policy;

    #[test]
    fn partial() {
        let config = Config::parse(
            "
dedup:
  policy: proximity
  proximity_radius_m: 200.0
output_dir: out
",
        )
        .unwrap();
        assert_eq!(config.dedup.policy, Policy::Proximity);
        assert_eq!(config.dedup.proximity_radius_m, 200.0);
        assert_eq!(config.dedup.similarity_threshold, 0.88);
        assert_eq!(config.classifier, Classifier::default());
        assert_eq!(config.cache_dir, PathBuf::from(".cache/osm"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn unknown_policy() {
        assert!(Config::parse("dedup:\n  policy: fuzzy\n").is_err());
    }

    #[test]
    fn unusable_dedup_settings() {
        for yaml in [
            "dedup:\n  cell_size_deg: 0.0\n",
            "dedup:\n  cell_size_deg: -0.002\n",
            "dedup:\n  cell_size_deg: .nan\n",
            "dedup:\n  cell_size_deg: 1.0e-12\n",
            "dedup:\n  proximity_radius_m: -1.0\n",
            "dedup:\n  cluster_radius_m: .inf\n",
            "dedup:\n  similarity_threshold: 1.5\n",
            "dedup:\n  similarity_threshold: .nan\n",
        ] {
            assert!(Config::parse(yaml).is_err(), "{yaml}");
        }
        assert!(Config::parse("dedup:\n  proximity_radius_m: 0.0\n").is_ok());
        assert!(Config::parse("dedup:\n  similarity_threshold: 1.0\n").is_ok());
    }
}
