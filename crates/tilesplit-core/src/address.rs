//! Tile address extraction from request URLs
//!
//! URLs carry their tile as `/<segment>/<x>/<y>`, e.g.
//! `https://backend.wplace.live/s0/pixel/5/10`.

use crate::error::ConfigError;
use crate::types::TileAddress;
use regex::Regex;
use std::borrow::Cow;

/// Finds and rewrites the tile address embedded in a URL
#[derive(Debug, Clone)]
pub struct TileAddressExtractor {
    segment: String,
    pattern: Regex,
}

impl TileAddressExtractor {
    /// Create extractor for URLs of the form `/<segment>/<x>/<y>`
    ///
    /// Leading and trailing slashes in `segment` are ignored.
    ///
    /// # Errors
    /// - `ConfigError::EmptySetting` if `segment` is empty
    /// - `ConfigError::InvalidPattern` if the pattern fails to compile
    pub fn new(segment: &str) -> Result<Self, ConfigError> {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            return Err(ConfigError::EmptySetting("path_segment"));
        }

        let pattern = Regex::new(&format!(r"/{}/(\d+)/(\d+)", regex::escape(segment)))
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            segment: segment.to_string(),
            pattern,
        })
    }

    /// Tile address of the first match in `url`
    ///
    /// Returns `None` when the URL has no address or a digit group does
    /// not fit in `u64`.
    #[must_use]
    pub fn extract(&self, url: &str) -> Option<TileAddress> {
        let captures = self.pattern.captures(url)?;
        let x = captures.get(1)?.as_str().parse().ok()?;
        let y = captures.get(2)?.as_str().parse().ok()?;
        Some(TileAddress::new(x, y))
    }

    /// Replace the first embedded address in `url` with `address`
    ///
    /// URLs without an address are returned unchanged.
    #[must_use]
    pub fn rewrite<'a>(&self, url: &'a str, address: TileAddress) -> Cow<'a, str> {
        let replacement = format!("/{}/{}/{}", self.segment, address.x, address.y);
        self.pattern
            .replacen(url, 1, regex::NoExpand(&replacement))
    }
}
