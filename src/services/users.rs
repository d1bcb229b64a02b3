use super::{new_id, validate_title};
use crate::cache::keys::user_key;
use crate::cache::{CacheLayer, Cached};
use crate::error::{GoaltrackError, Result};
use crate::logging::log_write_operation;
use crate::models::{NewUser, ProfileUpdate, User, UserProfile};
use crate::store::DocumentStore;
use chrono::Utc;
use std::sync::Arc;

/// Profile reads and account writes
///
/// Password hashing belongs to the auth collaborator; this service only
/// stores the hash it is given and never caches or returns it.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    cache: CacheLayer,
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_ascii_lowercase())
        }
        _ => Err(GoaltrackError::validation(format!(
            "invalid email address '{email}'"
        ))),
    }
}

fn validate_password_hash(hash: &str) -> Result<()> {
    if hash.is_empty() {
        return Err(GoaltrackError::validation("password hash must not be empty"));
    }
    Ok(())
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    pub async fn register(&self, input: NewUser) -> Result<UserProfile> {
        let name = validate_title("name", &input.name)?;
        let email = validate_email(&input.email)?;
        validate_password_hash(&input.password_hash)?;

        let now = Utc::now();
        let user = self
            .store
            .create_user(User {
                id: new_id(),
                name,
                email,
                bio: None,
                avatar_url: None,
                password_hash: input.password_hash,
                created_at: now,
                updated_at: now,
            })
            .await?;

        log_write_operation("user", "register", &user.id, &user.id);
        self.cache.invalidate(&user.id, &[user_key(&user.id)]).await;
        Ok(UserProfile::from(&user))
    }

    pub async fn profile(&self, user_id: &str) -> Result<Cached<UserProfile>> {
        self.cache
            .read_through(
                &user_key(user_id),
                self.cache.ttl().user_profile(),
                None,
                || async {
                    self.store
                        .find_user(user_id)
                        .await?
                        .map(|user| UserProfile::from(&user))
                        .ok_or_else(|| GoaltrackError::not_found("user", user_id))
                },
            )
            .await
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let mut user = self.existing_user(user_id).await?;
        if let Some(name) = update.name {
            user.name = validate_title("name", &name)?;
        }
        if let Some(email) = update.email {
            user.email = validate_email(&email)?;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        user.updated_at = Utc::now();
        let user = self.store.update_user(user).await?;

        log_write_operation("user", "update_profile", user_id, user_id);
        self.cache.invalidate(user_id, &[user_key(user_id)]).await;
        Ok(UserProfile::from(&user))
    }

    pub async fn change_password(&self, user_id: &str, new_password_hash: String) -> Result<()> {
        validate_password_hash(&new_password_hash)?;
        let mut user = self.existing_user(user_id).await?;
        user.password_hash = new_password_hash;
        user.updated_at = Utc::now();
        self.store.update_user(user).await?;

        log_write_operation("user", "change_password", user_id, user_id);
        self.cache.invalidate(user_id, &[user_key(user_id)]).await;
        Ok(())
    }

    async fn existing_user(&self, user_id: &str) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| GoaltrackError::not_found("user", user_id))
    }
}
