//! TOML configuration file parsing
//!
//! A config file is a flat table of [`BenchConfig`] fields:
//!
//! ```toml
//! target = "/dev/nvme0n1"
//! block_size = 65536
//! operation = "write"
//! access = "random"
//! durability = "direct"
//! workers = 8
//! duration_secs = 60
//! ```

use super::BenchConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<BenchConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<BenchConfig> {
    let config: BenchConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            target = "/dev/nvme0n1"
            block_size = 65536
            operation = "write"
            access = "random"
            durability = "synchronous_direct"
            io_count = 1000
            workers = 8
            duration_secs = 60
            report_interval_secs = 5
            log_file = "/var/log/iotest.log"
            format = "json"
        "#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.target, PathBuf::from("/dev/nvme0n1"));
        assert_eq!(config.block_size, 65536);
        assert_eq!(config.operation, OperationKind::Write);
        assert_eq!(config.access, AccessPattern::Random);
        assert_eq!(config.durability, Durability::SynchronousDirect);
        assert_eq!(config.io_count, 1000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.duration_secs, Some(60));
        assert_eq!(config.report_interval_secs, 5);
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/iotest.log")));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_minimal_config_fills_defaults() {
        let config = parse_toml_string(r#"target = "data.bin""#).unwrap();
        assert_eq!(
            config,
            BenchConfig {
                target: PathBuf::from("data.bin"),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_enum_value() {
        assert!(parse_toml_string(r#"operation = "trim""#).is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "block_size = 512").unwrap();
        writeln!(file, "access = \"random\"").unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.block_size, 512);
        assert_eq!(config.access, AccessPattern::Random);
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_toml_file(Path::new("/nonexistent/iotest.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
