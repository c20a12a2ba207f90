//! Logging macros that set target to "dbspy" for the crate's own diagnostics.
//!
//! Spy events (returned calls, SQL, timing, collected tables) are emitted by
//! [`crate::log::TracingSpyLog`] under their own `dbspy::*` targets so they can
//! be filtered independently. Everything else the crate has to say about
//! itself goes through these macros, keeping a single "dbspy" target instead of
//! the full module path.

macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!(target: "dbspy", $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!(target: "dbspy", $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => { ::tracing::info!(target: "dbspy", $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { ::tracing::warn!(target: "dbspy", $($arg)*) };
}
