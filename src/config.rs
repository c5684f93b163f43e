// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::classify::FolderPolicy;
use crate::logging::LogSettings;
use crate::pipeline::PipelineOptions;
use crate::store::{TempStore, WriteDurability};
use crate::validator::PackageMaker;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--folder-timeout-secs must be greater than zero")]
    ZeroFolderTimeout,
    #[error("--file-timeout-secs must be greater than zero when set")]
    ZeroFileTimeout,
    #[error("--log-max-bytes must be greater than zero")]
    ZeroLogSize,
    #[error("--max-walk-depth must be greater than zero")]
    ZeroWalkDepth,
    #[error("--admin-key must not be empty")]
    EmptyAdminKey,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "xpm-portal")]
#[command(about = "Web front end for the xml_package_maker validator")]
#[command(version)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "XPM_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on
    #[arg(long, env = "XPM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding session workspaces and report files
    #[arg(long, env = "XPM_TEMP_DIR", default_value = "temp")]
    pub temp_dir: PathBuf,

    /// Directory holding the rotating log file
    #[arg(long, env = "XPM_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Size at which the log file is rotated
    #[arg(long, env = "XPM_LOG_MAX_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub log_max_bytes: u64,

    /// Number of rotated log files to keep
    #[arg(long, env = "XPM_LOG_BACKUPS", default_value_t = 5)]
    pub log_backups: usize,

    /// Interpreter used to run the validator script
    #[arg(long, env = "XPM_PYTHON", default_value = "python")]
    pub python: PathBuf,

    /// Path to xml_package_maker
    #[arg(long, env = "XPM_PACKAGE_MAKER", default_value = "xml_package_maker.py")]
    pub package_maker: PathBuf,

    /// Pass --validate to the validator for single-file uploads
    #[arg(long, env = "XPM_VALIDATE_FLAG")]
    pub validate_flag: bool,

    /// Time limit for single-file runs (no limit when unset)
    #[arg(long, env = "XPM_FILE_TIMEOUT_SECS")]
    pub file_timeout_secs: Option<u64>,

    /// Time limit for folder runs
    #[arg(long, env = "XPM_FOLDER_TIMEOUT_SECS", default_value_t = 120)]
    pub folder_timeout_secs: u64,

    /// Pause after a single-file run before looking for reports
    #[arg(long, env = "XPM_REPORT_SETTLE_MS", default_value_t = 2000)]
    pub report_settle_ms: u64,

    /// Success policy for folder uploads
    #[arg(long, env = "XPM_FOLDER_POLICY", value_enum, default_value_t = FolderPolicy::FontFamilyTolerant)]
    pub folder_policy: FolderPolicy,

    /// Shared secret for /view_logs (log viewer disabled when unset)
    #[arg(long, env = "XPM_ADMIN_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Largest accepted request body
    #[arg(long, env = "XPM_MAX_UPLOAD_BYTES", default_value_t = 256 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Age after which the startup janitor deletes temp items
    #[arg(long, env = "XPM_JANITOR_MAX_AGE_SECS", default_value_t = 24 * 60 * 60)]
    pub janitor_max_age_secs: u64,

    /// Deepest directory level searched for generated reports
    #[arg(long, env = "XPM_MAX_WALK_DEPTH", default_value_t = 32)]
    pub max_walk_depth: usize,

    /// Sync report files to disk before they are renamed into place
    #[arg(long, env = "XPM_DURABLE_WRITES")]
    pub durable_writes: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folder_timeout_secs == 0 {
            return Err(ConfigError::ZeroFolderTimeout);
        }
        if self.file_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroFileTimeout);
        }
        if self.log_max_bytes == 0 {
            return Err(ConfigError::ZeroLogSize);
        }
        if self.max_walk_depth == 0 {
            return Err(ConfigError::ZeroWalkDepth);
        }
        if self.admin_key.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::EmptyAdminKey);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    pub fn package_maker(&self) -> PackageMaker {
        PackageMaker::new(&self.python, &self.package_maker).with_validate_flag(self.validate_flag)
    }

    pub fn temp_store(&self) -> TempStore {
        let durability = if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        TempStore::new(&self.temp_dir).with_durability(durability)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            file_timeout: self.file_timeout_secs.map(Duration::from_secs),
            folder_timeout: Some(Duration::from_secs(self.folder_timeout_secs)),
            report_settle: Duration::from_millis(self.report_settle_ms),
            max_walk_depth: self.max_walk_depth,
            folder_classifier: self.folder_policy.classifier(),
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            dir: self.log_dir.clone(),
            max_bytes: self.log_max_bytes,
            backups: self.log_backups,
        }
    }

    pub fn janitor_max_age(&self) -> Duration {
        Duration::from_secs(self.janitor_max_age_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use rstest::rstest;

    use super::{Config, ConfigError};
    use crate::classify::FolderPolicy;
    use crate::store::WriteDurability;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("xpm-portal").chain(args.iter().copied()))
            .expect("parse config")
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = parse(&[]);
        assert_eq!(config.bind_addr(), ("0.0.0.0", 8080));
        assert_eq!(config.log_max_bytes, 10_485_760);
        assert_eq!(config.log_backups, 5);
        assert_eq!(config.folder_policy, FolderPolicy::FontFamilyTolerant);
        assert_eq!(config.admin_key, None);
        assert_eq!(config.janitor_max_age(), Duration::from_secs(86_400));
        assert_eq!(config.temp_store().durability(), WriteDurability::BestEffort);
        assert_eq!(config.validate(), Ok(()));

        let options = config.pipeline_options();
        assert_eq!(options.file_timeout, None);
        assert_eq!(options.folder_timeout, Some(Duration::from_secs(120)));
        assert_eq!(options.report_settle, Duration::from_secs(2));
        assert_eq!(options.folder_classifier.name(), "font-family-tolerant");
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--port",
            "9000",
            "--folder-policy",
            "strict",
            "--file-timeout-secs",
            "30",
            "--validate-flag",
            "--durable-writes",
            "--python",
            "python3",
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.folder_policy, FolderPolicy::Strict);
        assert_eq!(config.pipeline_options().file_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.temp_store().durability(), WriteDurability::Durable);
        assert_eq!(
            config.package_maker().command_line(
                std::path::Path::new("a.xml"),
                crate::model::UploadMode::SingleFile
            ),
            "python3 xml_package_maker.py --validate a.xml"
        );
    }

    #[rstest]
    #[case(&["--folder-timeout-secs", "0"], ConfigError::ZeroFolderTimeout)]
    #[case(&["--file-timeout-secs", "0"], ConfigError::ZeroFileTimeout)]
    #[case(&["--log-max-bytes", "0"], ConfigError::ZeroLogSize)]
    #[case(&["--max-walk-depth", "0"], ConfigError::ZeroWalkDepth)]
    #[case(&["--admin-key", ""], ConfigError::EmptyAdminKey)]
    fn validate_rejects(#[case] args: &[&str], #[case] expected: ConfigError) {
        assert_eq!(parse(args).validate(), Err(expected));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        Config::try_parse_from(["xpm-portal", "--folder-policy", "lenient"]).unwrap_err();
    }
}
