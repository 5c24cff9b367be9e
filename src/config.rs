//! Settings for netvisor-ztp.
//!
//! Defaults cover the stock Netvisor install; a TOML file or environment
//! variables (`NVZTP_*`) can override the cli binary location and the quiet
//! flag.

use crate::error::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the Netvisor cli binary on a switch.
pub const DEFAULT_CLI_PATH: &str = "/usr/bin/cli";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the cli binary.
    pub cli_path: String,
    /// Whether commands default to `--quiet` (suppresses bootup banners).
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cli_path: DEFAULT_CLI_PATH.to_string(),
            quiet: true,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then an optional file, then `NVZTP_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("cli_path", DEFAULT_CLI_PATH)?
            .set_default("quiet", true)?;

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let settings = builder
            .add_source(Environment::with_prefix("NVZTP"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_stock_cli() {
        let settings = Settings::default();
        assert_eq!(settings.cli_path, "/usr/bin/cli");
        assert!(settings.quiet);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "cli_path = \"/opt/nvos/bin/cli\"\nquiet = false").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.cli_path, "/opt/nvos/bin/cli");
        assert!(!settings.quiet);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/nvztp.toml"))).is_err());
    }
}
