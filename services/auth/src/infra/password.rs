use anyhow::Context as _;

use crate::domain::repository::PasswordHasher;
use crate::error::AuthServiceError;

/// bcrypt hasher. Hashing runs on the blocking pool so request tasks are not
/// stalled by the work factor.
#[derive(Clone)]
pub struct BcryptPasswordHasher {
    pub cost: u32,
}

impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("join bcrypt task")?
            .context("hash password")?;
        Ok(hash)
    }
}
