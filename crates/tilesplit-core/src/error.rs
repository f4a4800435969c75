//! Error types for tilesplit core
//!
//! Provides error handling for:
//! - Fallback decisions taken while processing a request body
//! - Structural problems in operator-supplied payloads
//! - Internal faults (configuration, serialization)

/// Reason the processor fell back to the original request
///
/// Every variant is recoverable: the caller always ends up with a sendable
/// request, at minimum the unmodified original.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackReason {
    /// Original body is not valid JSON
    #[error("original body is not valid JSON: {0}")]
    MalformedOriginalBody(String),

    /// Original body lacks one of the required fields
    #[error("original body is missing required field '{0}'")]
    MissingRequiredFields(String),

    /// Operator cancelled the prompt or entered nothing
    #[error("operator supplied no input")]
    OperatorCancelled,

    /// Operator input is not valid JSON
    #[error("operator input is not valid JSON: {0}")]
    MalformedOperatorInput(String),

    /// Operator input has the wrong structure
    #[error("invalid substitute payload: {0}")]
    InvalidSubstituteShape(#[from] ShapeError),

    /// URL carries no tile address
    #[error("no tile address in url: {0}")]
    UnresolvableTileAddress(String),
}

impl FallbackReason {
    /// Whether the operator should see an alert for this fallback
    ///
    /// Only failures caused by data the operator actively typed are surfaced;
    /// everything else degrades silently.
    #[inline]
    #[must_use]
    pub fn is_operator_visible(&self) -> bool {
        matches!(
            self,
            Self::MalformedOperatorInput(_) | Self::InvalidSubstituteShape(_)
        )
    }

    /// Whether the fallback must reuse the original body string verbatim
    ///
    /// Only possible when the body could not be parsed at all; every other
    /// fallback re-serializes the parsed body.
    #[inline]
    #[must_use]
    pub fn keeps_raw_body(&self) -> bool {
        matches!(self, Self::MalformedOriginalBody(_))
    }
}

/// Structural problems in a candidate substitute payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Payload is not a JSON object
    #[error("payload must be an object")]
    NotAnObject,

    /// A field is absent or not an array
    #[error("'{0}' must be an array")]
    NotAnArray(&'static str),

    /// A field is an empty array
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    /// coords is not exactly twice as long as colors
    #[error("coords length {coords} must be double colors length {colors}")]
    LengthMismatch {
        /// Number of coordinate entries
        coords: usize,
        /// Number of value entries
        colors: usize,
    },

    /// coords holds an incomplete pair
    #[error("coords length {0} is odd")]
    OddCoordinates(usize),

    /// A coordinate is not a non-negative integer
    #[error("coordinate at index {index} is not a non-negative integer")]
    InvalidCoordinate {
        /// Position in the flat coordinate list
        index: usize,
    },
}

/// Internal faults the shims must absorb
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A body could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is empty
    #[error("'{0}' must not be empty")]
    EmptySetting(&'static str),

    /// The address pattern could not be compiled
    #[error("invalid address pattern: {0}")]
    InvalidPattern(String),
}
