use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swapmeet_store::BarterStore;
use swapmeet_types::{ExchangeError, User};
use tracing::info;

use crate::now_unix;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub user_id: String,
    pub phone_number: String,
}

/// User record operations. Engines never consult this; they only carry
/// opaque user ids.
pub struct UserDirectory<S: BarterStore> {
    store: Arc<S>,
}

impl<S: BarterStore> UserDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, ExchangeError> {
        if new_user.user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        if new_user.phone_number.is_empty() {
            return Err(ExchangeError::invalid_argument("phone_number is required"));
        }

        let user = User::new(new_user.user_id, new_user.phone_number, now_unix());
        self.store.put_user(&user).await?;
        info!(user_id = %user.user_id, "user created");
        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<User, ExchangeError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("user {user_id}")))
    }

    pub async fn find_by_phone(&self, phone_number: &str) -> Result<User, ExchangeError> {
        self.store
            .find_user_by_phone(phone_number)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("user with phone {phone_number}")))
    }

    pub async fn update_phone(
        &self,
        user_id: &str,
        phone_number: &str,
    ) -> Result<User, ExchangeError> {
        if phone_number.is_empty() {
            return Err(ExchangeError::invalid_argument("phone_number is required"));
        }
        let mut user = self.get(user_id).await?;
        user.phone_number = phone_number.to_string();
        self.store.put_user(&user).await?;
        Ok(user)
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), ExchangeError> {
        let _ = self.get(user_id).await?;
        self.store.delete_user(user_id).await?;
        info!(user_id, "user deleted");
        Ok(())
    }
}
