//! tilesplit CLI support
//!
//! Pieces the `tilesplit` binary is assembled from:
//! - [`settings`]: TOML configuration file loading
//! - [`console`]: operator prompts over a terminal
//! - [`http`]: fetch transport backed by `reqwest`

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod console;
pub mod http;
pub mod settings;

pub use console::LineConsole;
pub use http::ReqwestTransport;
pub use settings::{parse_tile_address, HttpSettings, Settings};
