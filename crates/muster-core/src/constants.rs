/// Muster engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum length of a stored `last_error` message on a pending mutation.
pub const MAX_STORED_ERROR_LEN: usize = 1_024;
