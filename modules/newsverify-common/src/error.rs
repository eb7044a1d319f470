use thiserror::Error;

/// Startup configuration failure. Fatal: binaries exit before serving anything.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set. Please add it to your environment or .env file.")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
