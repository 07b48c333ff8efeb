/// Error type for this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TicklimitError {
    /// A rate, burst or warm-up setting was rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A permit count outside the accepted range.
    #[error("invalid permits: {0}")]
    InvalidPermits(String),
}
