/// Errors raised while configuring or installing the system.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// A component that exists once per process was constructed again.
    #[error("{0} is already installed; use the existing instance")]
    InstantiationNotAllowed(&'static str),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
