//! tilesplit Core
//!
//! Transport-independent logic for intercepting pixel write requests:
//! - Partitions absolute coordinates into tile-local groups
//! - Validates operator-supplied substitute payloads
//! - Extracts and rewrites tile addresses in request URLs
//! - Processes an original request body into the requests to send
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tilesplit_core::{InterceptConfig, RequestBodyProcessor, StaticConsole, TransportKind};
//!
//! let console = StaticConsole::answering(r#"{"coords": [10,20,1100,300], "colors": [1,2]}"#);
//! let processor = RequestBodyProcessor::new(InterceptConfig::new(), Arc::new(console))?;
//!
//! let outcome = processor.process(
//!     r#"{"t":"token","coords":[0,0],"colors":[0]}"#,
//!     TransportKind::Fetch,
//!     "https://backend.wplace.live/s0/pixel/5/10",
//! )?;
//! assert_eq!(outcome.requests.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod address;
pub mod config;
pub mod error;
pub mod operator;
pub mod partition;
pub mod processor;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use address::TileAddressExtractor;
pub use config::{InterceptConfig, DEFAULT_TARGET_PREFIX, DEFAULT_TILE_SIZE};
pub use error::{ConfigError, FallbackReason, InterceptError, ShapeError};
pub use operator::{OperatorConsole, StaticConsole};
pub use partition::TilePartitioner;
pub use processor::RequestBodyProcessor;
pub use types::{
    ProcessOutcome, RequestDescriptor, SubstitutePayload, TileAddress, TileGroup, TransportKind,
};
pub use validation::PayloadValidator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with tilesplit core
    pub use crate::{
        InterceptConfig, OperatorConsole, ProcessOutcome, RequestBodyProcessor,
        RequestDescriptor, TileAddress, TransportKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
