//! Identity operations: password-reset request and confirmation.
//!
//! Authentication itself is per-request (HTTP Basic, verified by the
//! server middleware); the engine only manages the reset-code lifecycle.

use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, users};

use super::{Engine, with_tx};

const MIN_PASSWORD_LEN: usize = 8;

impl Engine {
    /// Stores a fresh reset code for the user matching `account` (username
    /// or email).
    ///
    /// Returns `None` when no user matches; callers must not reveal the
    /// difference to the requester.
    pub async fn request_password_reset(&self, account: &str) -> ResultEngine<Option<String>> {
        let account = account.trim();
        if account.is_empty() {
            return Err(EngineError::InvalidField(
                "account must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let user = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Username.eq(account))
                        .add(users::Column::Email.eq(account)),
                )
                .one(&db_tx)
                .await?;

            let Some(user) = user else {
                return Ok(None);
            };

            let code = Uuid::new_v4().to_string();
            let mut active: users::ActiveModel = user.into();
            active.reset_code = ActiveValue::Set(Some(code.clone()));
            active.update(&db_tx).await?;

            Ok(Some(code))
        })
    }

    /// Consumes a reset code and sets the new password.
    pub async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> ResultEngine<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidField(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        with_tx!(self, |db_tx| {
            let user = users::Entity::find()
                .filter(users::Column::ResetCode.eq(code.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("reset code".to_string()))?;

            let mut active: users::ActiveModel = user.into();
            active.password = ActiveValue::Set(new_password.to_string());
            active.reset_code = ActiveValue::Set(None);
            active.update(&db_tx).await?;

            Ok(())
        })
    }
}
