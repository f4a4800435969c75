//! Interception configuration
//!
//! Endpoint prefix, write method, required body fields and tile geometry.
//! Defaults match the live pixel backend.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Default endpoint prefix that triggers interception
pub const DEFAULT_TARGET_PREFIX: &str = "https://backend.wplace.live/s0/pixel/";

/// Default path segment preceding the tile address
pub const DEFAULT_PATH_SEGMENT: &str = "s0/pixel";

/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: u32 = 1000;

/// Interception configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptConfig {
    /// URL prefix of eligible requests
    pub target_prefix: String,
    /// HTTP method of eligible requests (exact match)
    pub write_method: String,
    /// Body fields that must all be present before prompting
    pub required_fields: Vec<String>,
    /// Path segment preceding `<x>/<y>` in request URLs
    pub path_segment: String,
    /// Tile edge length
    pub tile_size: NonZeroU32,
    /// Prompt shown to the operator; `{size}` and `{max}` are filled in
    pub prompt_message: String,
    /// Alert shown when operator input is not JSON
    pub invalid_json_alert: String,
    /// Alert shown when operator input has the wrong shape
    pub invalid_shape_alert: String,
}

impl InterceptConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With target prefix
    #[inline]
    #[must_use]
    pub fn with_target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = prefix.into();
        self
    }

    /// With write method
    #[inline]
    #[must_use]
    pub fn with_write_method(mut self, method: impl Into<String>) -> Self {
        self.write_method = method.into();
        self
    }

    /// With required body fields
    #[inline]
    #[must_use]
    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// With path segment
    #[inline]
    #[must_use]
    pub fn with_path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segment = segment.into();
        self
    }

    /// With tile size
    #[inline]
    #[must_use]
    pub fn with_tile_size(mut self, tile_size: NonZeroU32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Check that the configuration can drive interception
    ///
    /// # Errors
    /// - `ConfigError::EmptySetting` if prefix, method or segment is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_prefix.is_empty() {
            return Err(ConfigError::EmptySetting("target_prefix"));
        }
        if self.write_method.is_empty() {
            return Err(ConfigError::EmptySetting("write_method"));
        }
        if self.path_segment.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptySetting("path_segment"));
        }
        Ok(())
    }

    /// Prompt with `{size}` and `{max}` filled in from the tile size
    #[must_use]
    pub fn prompt_text(&self) -> String {
        let size = self.tile_size.get();
        self.prompt_message
            .replace("{size}", &size.to_string())
            .replace("{max}", &(size - 1).to_string())
    }

    /// Whether a call with this method and URL should be intercepted
    #[inline]
    #[must_use]
    pub fn is_eligible(&self, method: &str, url: &str) -> bool {
        method == self.write_method && url.starts_with(&self.target_prefix)
    }
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            write_method: "POST".to_string(),
            required_fields: vec!["t".to_string(), "coords".to_string(), "colors".to_string()],
            path_segment: DEFAULT_PATH_SEGMENT.to_string(),
            tile_size: NonZeroU32::new(DEFAULT_TILE_SIZE).unwrap_or(NonZeroU32::MIN),
            prompt_message: "Please enter JSON with coords and colors to replace original values:\n\n\
                             Tiles are {size}x{size} pixels (0-{max}). \
                             Coords >={size} will be split to other tiles.\n\
                             Example: {\"coords\": [10,20,1100,300], \"colors\": [1,2]}"
                .to_string(),
            invalid_json_alert: "Invalid JSON format. Request will proceed with original values."
                .to_string(),
            invalid_shape_alert: "Invalid data structure. coords and colors must be non-empty \
                                  arrays and coords count must be exactly double the colors count."
                .to_string(),
        }
    }
}
