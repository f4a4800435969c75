//! Configuration file loading
//!
//! A settings file is TOML with two optional tables:
//!
//! ```toml
//! [intercept]
//! tile_size = 1000
//! target_prefix = "https://backend.wplace.live/s0/pixel/"
//!
//! [http]
//! timeout_secs = 30
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;
use tilesplit_core::{InterceptConfig, TileAddress};

/// Everything the binary reads from its settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interception rules
    pub intercept: InterceptConfig,
    /// Outgoing HTTP client options
    pub http: HttpSettings,
}

/// HTTP client options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("tilesplit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSettings {
    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given
    ///
    /// # Errors
    /// Fails if the file cannot be read, is not valid TOML, or describes an
    /// invalid interception config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings from {}", path.display()))?;
                toml::from_str::<Self>(&raw)
                    .with_context(|| format!("parsing settings in {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.intercept.validate().context("invalid intercept settings")?;
        tracing::debug!(?path, tile_size = settings.intercept.tile_size.get(), "settings loaded");
        Ok(settings)
    }

    /// Override the tile size from the command line
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: Option<NonZeroU32>) -> Self {
        if let Some(tile_size) = tile_size {
            self.intercept = self.intercept.with_tile_size(tile_size);
        }
        self
    }
}

/// Parse a tile address written as `X/Y`
///
/// # Errors
/// Fails unless both halves are non-negative integers.
pub fn parse_tile_address(raw: &str) -> Result<TileAddress> {
    let Some((x, y)) = raw.trim().split_once('/') else {
        bail!("tile address must look like X/Y, got {raw:?}");
    };
    let x = x.parse().with_context(|| format!("invalid tile x in {raw:?}"))?;
    let y = y.parse().with_context(|| format!("invalid tile y in {raw:?}"))?;
    Ok(TileAddress::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.intercept.tile_size.get(), 1000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = settings_file("[intercept]\ntile_size = 256\n\n[http]\ntimeout_secs = 5\n");
        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.intercept.tile_size.get(), 256);
        assert_eq!(settings.intercept.write_method, "POST");
        assert_eq!(settings.http.timeout(), Duration::from_secs(5));
        assert!(settings.http.user_agent.starts_with("tilesplit/"));
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        let file = settings_file("[intercept]\ntile_size = 0\n");
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let file = settings_file("[intercept]\ntarget_prefix = \"\"\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("invalid intercept settings"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }

    #[test]
    fn test_tile_size_override() {
        let settings = Settings::default().with_tile_size(NonZeroU32::new(64));
        assert_eq!(settings.intercept.tile_size.get(), 64);

        let unchanged = Settings::default().with_tile_size(None);
        assert_eq!(unchanged, Settings::default());
    }

    #[test]
    fn test_parse_tile_address() {
        assert_eq!(parse_tile_address("5/10").unwrap(), TileAddress::new(5, 10));
        assert_eq!(parse_tile_address(" 0/0 ").unwrap(), TileAddress::new(0, 0));
        assert!(parse_tile_address("5").is_err());
        assert!(parse_tile_address("-1/2").is_err());
        assert!(parse_tile_address("a/b").is_err());
    }
}
