/// Validation errors raised before a request leaves the client
use thiserror::Error;

/// Result type alias using `ValidationError`
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Input rejected by client-side validation.
///
/// The `Display` text is shown to the user as-is, so it reads as a sentence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left blank
    #[error("{0} is required")]
    Required(&'static str),

    /// Product name shorter than the minimum
    #[error("Name must be at least {min} characters")]
    NameTooShort { min: usize },

    /// Price is not a finite number
    #[error("Price must be a number")]
    PriceNotNumeric,

    /// Price below zero
    #[error("Price must be >= 0")]
    NegativePrice,

    /// Password shorter than the minimum
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// Email without an `@`
    #[error("Email address is not valid")]
    InvalidEmail,
}
