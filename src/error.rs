//! Application-level error.
//!
//! Components return their own typed errors (`FitError`, `EvalError`,
//! `ProjectionError`); they are folded into `AppError` at the application
//! boundary, where each one is given a process exit code:
//!
//! - `2`: bad input or configuration
//! - `3`: no usable data
//! - `4`: runtime or remote failure

use crate::analysis::evaluate::EvalError;
use crate::analysis::price::ProjectionError;
use crate::models::FitError;

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_NO_DATA: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

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

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_DATA, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
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

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::EmptyHistory | FitError::InsufficientData { .. } => EXIT_NO_DATA,
            FitError::Singular(_) | FitError::NonFinite | FitError::ForecastLength { .. } => EXIT_RUNTIME,
        };
        Self::new(code, format!("Model fit failed: {err}"))
    }
}

impl From<EvalError> for AppError {
    fn from(err: EvalError) -> Self {
        Self::no_data(format!("Evaluation failed: {err}"))
    }
}

impl From<ProjectionError> for AppError {
    fn from(err: ProjectionError) -> Self {
        Self::input(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_errors_map_to_exit_codes() {
        let e: AppError = FitError::EmptyHistory.into();
        assert_eq!(e.exit_code(), EXIT_NO_DATA);
        let e: AppError = FitError::Singular("AR(5) design").into();
        assert_eq!(e.exit_code(), EXIT_RUNTIME);
        let e: AppError = ProjectionError::YearOutOfRange { year: 2031, min: 2014, max: 2030 }.into();
        assert_eq!(e.exit_code(), EXIT_INPUT);
        assert!(e.message().contains("2031"));
    }
}
