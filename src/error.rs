//! Error taxonomy for the map engine.
//!
//! Failures never escape to the host as panics. Terminal bootstrap failures
//! are reported through [`crate::lifecycle::LifecycleEvent::Failed`]; the rest
//! are logged at the call site and the engine state is left untouched.

/// Errors produced by the map engine and its bootstrap.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The boundary dataset could not be fetched or parsed.
    #[error("failed to load boundary dataset: {0}")]
    DataLoadFailure(String),

    /// The container never reported a nonzero size within the retry budget.
    #[error("container had no size after {attempts} attempts")]
    SizingTimeout { attempts: u32 },

    /// A navigation or mode call carried out-of-domain values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The engine has not finished its first draw yet.
    #[error("engine is not ready")]
    NotReady,

    /// The engine was disposed and can no longer accept calls.
    #[error("engine has been disposed")]
    Disposed,
}
