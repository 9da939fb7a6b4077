use thiserror::Error;

pub const PREDICT_FAILED_NOTICE: &'static str = "Prediction failed. Check console for details.";

/// Anything that went wrong with one predict round trip.
///
/// The widget treats every variant the same way (log, notify, restore the
/// control); the variants only exist so the log line says what happened.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("failed to send predict request: {0}")]
    Transport(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("failed to read predict response body: {0}")]
    Body(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to read {name}: {reason}")]
pub struct ReadError {
    pub name: String,
    pub reason: String,
}
