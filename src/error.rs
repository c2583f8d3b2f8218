/// Process-wide error type.
///
/// The exit code doubles as the failure taxonomy:
///
/// - `2`: input/configuration (missing or unreadable log, invalid anchor
///   regex, unwritable output path)
/// - `3`: validation (mismatched or undersized series, nothing extracted)
/// - `4`: fit (the optimizer failed to converge)
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

    /// Input/configuration error (exit 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Validation error (exit 3).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Fit-convergence error (exit 4).
    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
