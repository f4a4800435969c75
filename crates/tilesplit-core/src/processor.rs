//! Request body processing
//!
//! Turns one intercepted write request into the ordered list of requests
//! that should actually be sent:
//! - Parses the original body
//! - Prompts the operator for substitute coords/colors
//! - Validates the substitute and resolves the base tile from the URL
//! - Partitions the substitute and builds one request per tile
//!
//! Every failure along the way degrades to the original request.

use crate::address::TileAddressExtractor;
use crate::config::InterceptConfig;
use crate::error::{ConfigError, FallbackReason, InterceptError};
use crate::operator::OperatorConsole;
use crate::partition::TilePartitioner;
use crate::types::{ProcessOutcome, RequestDescriptor, TileGroup, TransportKind};
use crate::validation::PayloadValidator;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Substitute data resolved against one original body
struct Substitution<'a> {
    fields: &'a Map<String, Value>,
    groups: Vec<TileGroup>,
}

/// Orchestrates prompting, validation and partitioning for one request
///
/// Holds no per-request state; share it behind an `Arc` between shims.
pub struct RequestBodyProcessor {
    config: InterceptConfig,
    extractor: TileAddressExtractor,
    partitioner: TilePartitioner,
    validator: PayloadValidator,
    console: Arc<dyn OperatorConsole>,
}

impl RequestBodyProcessor {
    /// Create processor
    ///
    /// # Errors
    /// - `ConfigError` if `config` fails validation
    pub fn new(
        config: InterceptConfig,
        console: Arc<dyn OperatorConsole>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let extractor = TileAddressExtractor::new(&config.path_segment)?;
        let partitioner = TilePartitioner::new(config.tile_size);

        Ok(Self {
            config,
            extractor,
            partitioner,
            validator: PayloadValidator::new(),
            console,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }

    /// Whether a call with this method and URL should be intercepted
    #[inline]
    #[must_use]
    pub fn is_eligible(&self, method: &str, url: &str) -> bool {
        self.config.is_eligible(method, url)
    }

    /// Process one original request body
    ///
    /// `kind` only labels log output.
    ///
    /// # Returns
    /// - `success: true` with one request per tile when substitution applied
    /// - `success: false` with the original request otherwise
    ///
    /// # Errors
    /// - `InterceptError::Serialization` if a body cannot be re-serialized;
    ///   callers fall back to sending their original arguments
    pub fn process(
        &self,
        body: &str,
        kind: TransportKind,
        url: &str,
    ) -> Result<ProcessOutcome, InterceptError> {
        tracing::debug!(transport = %kind, body, "original body");

        let original = serde_json::from_str::<Value>(body)
            .map_err(|e| FallbackReason::MalformedOriginalBody(e.to_string()));

        let substitution = original
            .as_ref()
            .map_err(|reason| reason.clone())
            .and_then(|original| self.substitute(original, url));

        match substitution {
            Ok(Substitution { fields, groups }) => {
                tracing::info!(
                    transport = %kind,
                    groups = groups.len(),
                    "split substitute into tile groups"
                );
                let requests = groups
                    .iter()
                    .map(|group| self.describe(fields, url, group))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ProcessOutcome::substituted(requests))
            }
            Err(reason) => {
                self.report(kind, &reason);
                let body = match &original {
                    Ok(original) if !reason.keeps_raw_body() => serde_json::to_string(original)?,
                    _ => body.to_string(),
                };
                Ok(ProcessOutcome::fallback(RequestDescriptor::new(url, body)))
            }
        }
    }

    fn substitute<'a>(
        &self,
        original: &'a Value,
        url: &str,
    ) -> Result<Substitution<'a>, FallbackReason> {
        let fields = original.as_object().ok_or_else(|| {
            FallbackReason::MissingRequiredFields(self.config.required_fields.join(", "))
        })?;

        if let Some(missing) = self
            .config
            .required_fields
            .iter()
            .find(|field| !fields.contains_key(field.as_str()))
        {
            return Err(FallbackReason::MissingRequiredFields(missing.clone()));
        }
        tracing::info!(
            fields = %self.config.required_fields.join(", "),
            "found required parameters"
        );

        let input = self
            .console
            .prompt(&self.config.prompt_text())
            .filter(|input| !input.is_empty())
            .ok_or(FallbackReason::OperatorCancelled)?;

        let candidate: Value = serde_json::from_str(&input)
            .map_err(|e| FallbackReason::MalformedOperatorInput(e.to_string()))?;
        let payload = self.validator.parse(&candidate)?;

        let base = self
            .extractor
            .extract(url)
            .ok_or_else(|| FallbackReason::UnresolvableTileAddress(url.to_string()))?;

        Ok(Substitution {
            fields,
            groups: self.partitioner.partition(&payload, base),
        })
    }

    /// Build the request for one tile group
    ///
    /// The original fields are kept in place; only `coords` and `colors`
    /// are replaced.
    fn describe(
        &self,
        fields: &Map<String, Value>,
        url: &str,
        group: &TileGroup,
    ) -> Result<RequestDescriptor, InterceptError> {
        let mut merged = fields.clone();
        merged.insert(
            "coords".to_string(),
            Value::Array(group.coords.iter().copied().map(Value::from).collect()),
        );
        merged.insert("colors".to_string(), Value::Array(group.colors.clone()));

        let url = self.extractor.rewrite(url, group.address).into_owned();
        let body = serde_json::to_string(&Value::Object(merged))?;
        tracing::debug!(tile = %group.address, pixels = group.colors.len(), %url, "tile request");

        Ok(RequestDescriptor::new(url, body))
    }

    fn report(&self, kind: TransportKind, reason: &FallbackReason) {
        match reason {
            FallbackReason::MissingRequiredFields(_) => {
                tracing::debug!(transport = %kind, %reason, "skipping substitution");
            }
            FallbackReason::OperatorCancelled => {
                tracing::info!(transport = %kind, "operator cancelled, using original values");
            }
            FallbackReason::MalformedOperatorInput(_) => {
                tracing::error!(transport = %kind, %reason, "invalid operator input");
                self.console.alert(&self.config.invalid_json_alert);
            }
            FallbackReason::InvalidSubstituteShape(_) => {
                tracing::error!(transport = %kind, %reason, "invalid replacement data structure");
                self.console.alert(&self.config.invalid_shape_alert);
            }
            FallbackReason::MalformedOriginalBody(_) | FallbackReason::UnresolvableTileAddress(_) => {
                tracing::error!(transport = %kind, %reason, "falling back to original request");
            }
        }
    }
}

impl fmt::Debug for RequestBodyProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBodyProcessor")
            .field("config", &self.config)
            .field("partitioner", &self.partitioner)
            .finish_non_exhaustive()
    }
}
