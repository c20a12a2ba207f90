//! Configuration module for dbspy
//!
//! Every section is optional; an empty file yields the defaults.
//!
//! ```yaml
//! logging:
//!   level: "info"
//! sql:
//!   max_line_length: 90
//!   dump:
//!     select: true
//!     insert: false
//! timing:
//!   warn_threshold_ms: 500
//!   error_threshold_ms: 2000
//! result_set:
//!   collect: true
//!   fill_in_unread: false
//! ```

mod loader;
mod types;

pub use loader::{apply_env_overrides, apply_overrides_from, load_config, load_config_from_str};
pub use types::*;
