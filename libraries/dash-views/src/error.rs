/// Error types for page views
use dash_client::ClientError;
use dash_core::ValidationError;
use thiserror::Error;

/// Result type alias using `ViewError`
pub type Result<T> = std::result::Result<T, ViewError>;

/// Why a page action did not complete.
///
/// Except for [`ViewError::Busy`], the same text is also left on the page as
/// an error notice.
#[derive(Error, Debug)]
pub enum ViewError {
    /// Protected action attempted without a session token
    #[error("You must log in to {action}")]
    LoginRequired { action: &'static str },

    /// The profile page was opened without a session token
    #[error("Token not found. Please log in.")]
    TokenNotFound,

    /// Another create/update/delete on the same page is still running
    #[error("Another request is still in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
