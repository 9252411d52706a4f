use crate::generator::profile::GeneratorConfig;
use anyhow::{ensure, Context};
use ridercore::{SessionConfig, LAST_HOUR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// JSON dataset to load; when absent a dataset is synthesized.
    pub dataset: Option<PathBuf>,
    pub bind: SocketAddr,
    pub report_path: PathBuf,
    pub generator: GeneratorConfig,
    pub session: SessionConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            report_path: PathBuf::from("tools/data/offline_summary.log"),
            generator: GeneratorConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        ensure!(
            config.session.fallback_hour <= LAST_HOUR,
            "workflow config {}: fallback_hour {} is outside 0-{LAST_HOUR}",
            path_ref.display(),
            config.session.fallback_hour
        );
        Ok(config)
    }

    pub fn from_args(dataset: Option<PathBuf>, stations: usize, seed: u64) -> Self {
        Self {
            dataset,
            generator: GeneratorConfig {
                stations,
                seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridercore::TransportType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_fills_generator() {
        let cfg = WorkflowConfig::from_args(None, 40, 7);
        assert_eq!(cfg.generator.stations, 40);
        assert_eq!(cfg.generator.seed, 7);
        assert_eq!(cfg.bind.port(), 9000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"dataset: data/aggregated_data.json\n\
              bind: 127.0.0.1:9100\n\
              session:\n  fallback_hour: 8\n  line_types: [Metro]\n  scale:\n    hourly_floor: 500\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.bind.port(), 9100);
        assert_eq!(cfg.session.fallback_hour, 8);
        assert_eq!(cfg.session.line_types, vec![TransportType::Metro]);
        assert_eq!(cfg.session.scale.hourly_floor, 500);
        assert_eq!(cfg.session.scale.whole_day_floor, 20_000);
        assert_eq!(
            cfg.dataset.as_deref(),
            Some(Path::new("data/aggregated_data.json"))
        );
    }

    #[test]
    fn config_load_rejects_impossible_fallback_hour() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"session:\n  fallback_hour: 24\n").unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("fallback_hour 24"));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
