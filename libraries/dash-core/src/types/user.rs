/// User domain type
use serde::{Deserialize, Serialize};

use super::UserId;

/// User account, as reported by `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// Account creation timestamp (ISO string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
