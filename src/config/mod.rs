/// Centralized attachment limits
pub mod policy;

/// Signed-in session context
pub mod session;

/// `config.toml` loading
pub mod settings;
