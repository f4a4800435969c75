//! Core types for tilesplit
//!
//! Tile addressing, partition groups and the request descriptors handed
//! back to the transport shims.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Address of a fixed-size tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    /// Tile column
    pub x: u64,
    /// Tile row
    pub y: u64,
}

impl TileAddress {
    /// Create new tile address
    #[inline]
    #[must_use]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }

    /// Address of the tile `dx` columns right and `dy` rows down
    #[inline]
    #[must_use]
    pub fn offset(self, dx: u64, dy: u64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// Operator-supplied replacement for an outgoing request's coords/colors
///
/// Construct through [`crate::PayloadValidator::parse`], which enforces
/// `coords.len() == 2 * colors.len()` with both non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutePayload {
    /// Flat (x, y) pairs relative to the base tile origin
    pub coords: Vec<u64>,
    /// One value per coordinate pair
    pub colors: Vec<Value>,
}

impl SubstitutePayload {
    /// Number of (x, y, value) entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the payload holds no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Coordinates and values that fall on a single tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGroup {
    /// Tile the group is addressed to
    pub address: TileAddress,
    /// Flat tile-local (x, y) pairs
    pub coords: Vec<u64>,
    /// Values aligned with `coords` pairs
    pub colors: Vec<Value>,
}

impl TileGroup {
    /// Create empty group for a tile
    #[inline]
    #[must_use]
    pub fn new(address: TileAddress) -> Self {
        Self {
            address,
            coords: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Append one local pixel
    #[inline]
    pub fn push(&mut self, x: u64, y: u64, color: Value) {
        self.coords.push(x);
        self.coords.push(y);
        self.colors.push(color);
    }

    /// Iterate `(x, y, value)` triples
    pub fn pixels(&self) -> impl Iterator<Item = (u64, u64, &Value)> + '_ {
        self.coords
            .chunks_exact(2)
            .zip(&self.colors)
            .map(|(pair, color)| (pair[0], pair[1], color))
    }
}

/// A fully formed, independently sendable request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Target URL
    pub url: String,
    /// Serialized body
    pub body: String,
}

impl RequestDescriptor {
    /// Create new descriptor
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Result of processing one request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Whether substitute data was applied
    pub success: bool,
    /// Requests to dispatch, in order
    pub requests: Vec<RequestDescriptor>,
}

impl ProcessOutcome {
    /// Outcome carrying a single unmodified request
    #[inline]
    #[must_use]
    pub fn fallback(request: RequestDescriptor) -> Self {
        Self {
            success: false,
            requests: vec![request],
        }
    }

    /// Outcome carrying substituted requests
    #[inline]
    #[must_use]
    pub fn substituted(requests: Vec<RequestDescriptor>) -> Self {
        Self {
            success: true,
            requests,
        }
    }

    /// Whether the outcome fans out into several requests
    #[inline]
    #[must_use]
    pub fn is_split(&self) -> bool {
        self.success && self.requests.len() > 1
    }
}

/// Transport the body arrived through; diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Promise-based transport
    Fetch,
    /// Stateful open/send transport
    Xhr,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Xhr => f.write_str("XHR"),
        }
    }
}
