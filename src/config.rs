//! Engine attach parameters and value rendering options.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Parameters handed to a [`Backend`](crate::engine::Backend) when attaching a
/// database. Defaults match what a domain controller's directory database
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub instance_name: String,
    pub page_size: u32,
    pub base_name: String,
    pub db_extension_size: u32,
    pub cache_size: u32,
    pub circular_log: bool,
    pub create_path_if_missing: bool,
    /// Transaction log directory. `None` means the database file's directory.
    pub log_path: Option<PathBuf>,
    /// Checkpoint/system directory. `None` means the database file's directory.
    pub system_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            instance_name: "msADDS".to_string(),
            page_size: 8192,
            base_name: "edb".to_string(),
            db_extension_size: 256,
            cache_size: 10,
            circular_log: true,
            create_path_if_missing: true,
            log_path: None,
            system_path: None,
        }
    }
}

impl EngineConfig {
    pub fn log_dir_for(&self, db_path: &Path) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| database_dir(db_path))
    }

    pub fn system_dir_for(&self, db_path: &Path) -> PathBuf {
        self.system_path
            .clone()
            .unwrap_or_else(|| database_dir(db_path))
    }
}

fn database_dir(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Which clock file-time attributes are rendered in. Directory tooling shows
/// them in the host's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    Utc,
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub timestamp_zone: TimestampZone,
    /// `chrono` strftime pattern.
    pub timestamp_format: String,
}

impl DecodeOptions {
    pub const DEFAULT_TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            timestamp_zone: TimestampZone::Local,
            timestamp_format: Self::DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_and_system_paths_default_to_database_directory() {
        let cfg = EngineConfig::default();
        let db = Path::new("/evidence/dc01/ntds.dit");
        assert_eq!(cfg.log_dir_for(db), PathBuf::from("/evidence/dc01"));
        assert_eq!(cfg.system_dir_for(db), PathBuf::from("/evidence/dc01"));
        assert_eq!(cfg.log_dir_for(Path::new("ntds.dit")), PathBuf::from("."));
    }

    #[test]
    fn explicit_paths_win() {
        let cfg = EngineConfig {
            log_path: Some(PathBuf::from("/tmp/logs")),
            ..EngineConfig::default()
        };
        let db = Path::new("/evidence/ntds.dit");
        assert_eq!(cfg.log_dir_for(db), PathBuf::from("/tmp/logs"));
        assert_eq!(cfg.system_dir_for(db), PathBuf::from("/evidence"));
    }

    #[test]
    fn defaults_describe_a_directory_database() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.instance_name, "msADDS");
        assert_eq!(cfg.page_size, 8192);
        assert_eq!(cfg.base_name, "edb");
        assert!(cfg.circular_log);
        let opts = DecodeOptions::default();
        assert_eq!(opts.timestamp_zone, TimestampZone::Local);
        assert_eq!(opts.timestamp_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"instance_name": "triage", "log_path": "/tmp/logs"}"#)
                .unwrap();
        assert_eq!(cfg.instance_name, "triage");
        assert_eq!(cfg.log_path, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(cfg.page_size, 8192);
        assert_eq!(cfg.system_path, None);

        let opts: DecodeOptions = serde_json::from_str(r#"{"timestamp_zone": "utc"}"#).unwrap();
        assert_eq!(opts.timestamp_zone, TimestampZone::Utc);
        assert_eq!(opts.timestamp_format, DecodeOptions::DEFAULT_TIMESTAMP_FORMAT);

        let back: EngineConfig =
            serde_json::from_str(&serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
