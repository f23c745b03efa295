//! Accounts and the users that belong to them.
//!
//! Credential verification happens upstream; an account is keyed by the
//! external auth id it was created with.

use std::sync::Arc;

use serde::Serialize;
use worldgraph_domain::{Account, AccountId, User};

use crate::infrastructure::ports::{AccountRepo, ClockPort};

use super::ManagementError;

/// Result of [`AccountCrud::find_or_create`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSession {
    pub account: Account,
    pub users: Vec<User>,
    pub created: bool,
}

pub struct AccountCrud {
    account: Arc<dyn AccountRepo>,
    clock: Arc<dyn ClockPort>,
}

impl AccountCrud {
    pub fn new(account: Arc<dyn AccountRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { account, clock }
    }

    /// Return the account for `external_auth_id`, creating it with a default
    /// user (introduced by the username) when it does not exist yet.
    pub async fn find_or_create(
        &self,
        external_auth_id: &str,
        email: &str,
        username: &str,
    ) -> Result<AccountSession, ManagementError> {
        if let Some(account) = self
            .account
            .find_by_external_auth_id(external_auth_id.trim())
            .await?
        {
            let users = self.account.list_users(account.id).await?;
            return Ok(AccountSession {
                account,
                users,
                created: false,
            });
        }

        let now = self.clock.now();
        let account = Account::new(external_auth_id, email, username, now)?;
        let user = User::new(&account.username, None, None, now)?;
        self.account.create_with_user(&account, &user).await?;
        tracing::info!(account_id = %account.id, user_id = %user.id, "Registered account");

        Ok(AccountSession {
            account,
            users: vec![user],
            created: true,
        })
    }

    pub async fn add_user(
        &self,
        account_id: AccountId,
        introduction: &str,
    ) -> Result<User, ManagementError> {
        let user = User::new(introduction, None, None, self.clock.now())?;
        self.account.add_user(account_id, &user).await?;
        Ok(user)
    }

    pub async fn list_users(&self, account_id: AccountId) -> Result<Vec<User>, ManagementError> {
        if self.account.get(account_id).await?.is_none() {
            return Err(ManagementError::not_found("Account", account_id));
        }
        Ok(self.account.list_users(account_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockAccountRepo, RepoError};
    use chrono::Utc;
    use mockall::predicate::*;

    fn crud(repo: MockAccountRepo) -> AccountCrud {
        AccountCrud::new(Arc::new(repo), Arc::new(FixedClock(Utc::now())))
    }

    #[tokio::test]
    async fn new_account_gets_a_default_user_named_after_it() {
        let mut repo = MockAccountRepo::new();
        repo.expect_find_by_external_auth_id()
            .with(eq("auth|42"))
            .returning(|_| Ok(None));
        repo.expect_create_with_user()
            .withf(|account, user| {
                account.external_auth_id == "auth|42" && user.introduction == "mira"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let session = crud(repo)
            .find_or_create("auth|42", "mira@example.com", "mira")
            .await
            .unwrap();
        assert!(session.created);
        assert_eq!(session.users.len(), 1);
    }

    #[tokio::test]
    async fn existing_account_is_returned_unchanged() {
        let existing = Account::new("auth|42", "mira@example.com", "mira", Utc::now()).unwrap();
        let account_id = existing.id;
        let mut repo = MockAccountRepo::new();
        repo.expect_find_by_external_auth_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_list_users()
            .with(eq(account_id))
            .returning(|_| Ok(vec![]));
        repo.expect_create_with_user().never();

        let session = crud(repo)
            .find_or_create("auth|42", "other@example.com", "someone")
            .await
            .unwrap();
        assert!(!session.created);
        assert_eq!(session.account.id, account_id);
    }

    #[tokio::test]
    async fn adding_user_to_missing_account_fails() {
        let mut repo = MockAccountRepo::new();
        repo.expect_add_user()
            .returning(|id, _| Err(RepoError::not_found("Account", id)));

        let err = crud(repo)
            .add_user(AccountId::new(), "second character")
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::Repo(e) if e.is_not_found()));
    }
}
