use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::require_text;
use crate::{AccountId, DomainError};

/// An authenticated owner of zero or more users.
///
/// Users hang off the account through `(User)-[:BELONGS_TO]->(Account)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    /// Identifier issued by the external auth provider. Unique per account.
    pub external_auth_id: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        external_auth_id: &str,
        email: &str,
        username: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: AccountId::new(),
            email: email.trim().to_string(),
            username: require_text(username, "username")?,
            external_auth_id: require_text(external_auth_id, "externalAuthId")?,
            created_at,
        })
    }
}
