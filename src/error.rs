//! Error types.
//!
//! - `ForecastError` is the library taxonomy returned by the pipeline.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Errors surfaced by the forecasting pipeline.
///
/// Non-finite projected values are not part of this enum: they are recovered
/// where they occur and only logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Too few usable history rows after cleaning.
    #[error("Insufficient historical data for {commodity}: {found} usable rows, need at least {required}.")]
    InsufficientData {
        commodity: String,
        found: usize,
        required: usize,
    },

    /// The statistical model could not be fitted.
    #[error("Model fit failed for {model}: {reason}")]
    ForecastFit { model: String, reason: String },

    /// Malformed request (empty commodity name, unknown commodity in strict mode, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid profile table or runtime configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ForecastError {
    pub fn fit(model: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::ForecastFit {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::Validation(_) | ForecastError::Config(_) => 2,
            ForecastError::InsufficientData { .. } => 3,
            ForecastError::ForecastFit { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_errors_map_to_exit_codes() {
        let err = ForecastError::InsufficientData {
            commodity: "Onion".to_string(),
            found: 4,
            required: 12,
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("Onion"));
        assert!(app.to_string().contains("need at least 12"));

        let app: AppError = ForecastError::fit("SARIMA(1,1,1)(1,1,0)[12]", "constant series").into();
        assert_eq!(app.exit_code(), 4);

        let app: AppError = ForecastError::Validation("empty commodity".to_string()).into();
        assert_eq!(app.exit_code(), 2);
    }
}
