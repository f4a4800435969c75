//! Substitute payload validation
//!
//! Structural checks only. Values in `colors` are never interpreted.

use crate::error::ShapeError;
use crate::types::SubstitutePayload;
use serde_json::Value;

/// Validator for operator-supplied payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadValidator;

impl PayloadValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether `candidate` is a well-formed substitute payload
    #[inline]
    #[must_use]
    pub fn is_valid(&self, candidate: &Value) -> bool {
        self.check(candidate).is_ok()
    }

    /// Check every structural rule, reporting the first that fails
    ///
    /// # Errors
    /// - `ShapeError::NotAnObject` if `candidate` is not an object
    /// - `ShapeError::NotAnArray` if `coords` or `colors` is absent or not an array
    /// - `ShapeError::Empty` if either array is empty
    /// - `ShapeError::LengthMismatch` if `coords` is not twice as long as `colors`
    /// - `ShapeError::OddCoordinates` if `coords` has odd length
    pub fn check(&self, candidate: &Value) -> Result<(), ShapeError> {
        let object = candidate.as_object().ok_or(ShapeError::NotAnObject)?;

        let coords = object
            .get("coords")
            .and_then(Value::as_array)
            .ok_or(ShapeError::NotAnArray("coords"))?;
        let colors = object
            .get("colors")
            .and_then(Value::as_array)
            .ok_or(ShapeError::NotAnArray("colors"))?;

        if coords.is_empty() {
            return Err(ShapeError::Empty("coords"));
        }
        if colors.is_empty() {
            return Err(ShapeError::Empty("colors"));
        }
        if colors.len().checked_mul(2) != Some(coords.len()) {
            return Err(ShapeError::LengthMismatch {
                coords: coords.len(),
                colors: colors.len(),
            });
        }
        // Implied by the length check; kept as its own rule
        if coords.len() % 2 != 0 {
            return Err(ShapeError::OddCoordinates(coords.len()));
        }

        Ok(())
    }

    /// Check `candidate` and convert it into a typed payload
    ///
    /// Coordinates must additionally be non-negative integers.
    ///
    /// # Errors
    /// Any error from [`Self::check`], or `ShapeError::InvalidCoordinate`.
    pub fn parse(&self, candidate: &Value) -> Result<SubstitutePayload, ShapeError> {
        self.check(candidate)?;

        let empty = Vec::new();
        let coords = candidate["coords"].as_array().unwrap_or(&empty);
        let colors = candidate["colors"].as_array().unwrap_or(&empty);

        let coords = coords
            .iter()
            .enumerate()
            .map(|(index, c)| c.as_u64().ok_or(ShapeError::InvalidCoordinate { index }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubstitutePayload {
            coords,
            colors: colors.clone(),
        })
    }
}
