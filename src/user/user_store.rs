use super::permissions::UserRole;
use super::user_models::{NewUser, ProfileUpdate, User};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns its id.
    fn create_user(&self, user: &NewUser) -> Result<i64>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns Ok(None) if the user does not exist.
    fn get_password_hash(&self, user_id: i64) -> Result<Option<String>>;

    fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()>;

    /// Applies the given changes, bumping `updated_at`. Returns false if the user does not exist.
    fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<bool>;

    /// Ids of every user, ordered by id.
    fn list_user_ids(&self) -> Result<Vec<i64>>;

    fn list_user_ids_with_role(&self, role: UserRole) -> Result<Vec<i64>>;
}

pub trait RefreshTokenStore: Send + Sync {
    fn blacklist_refresh_token(&self, jti: &str, user_id: i64, expires_at: i64) -> Result<()>;

    fn is_refresh_token_blacklisted(&self, jti: &str) -> Result<bool>;

    /// Drops entries whose token expired before `now`. Returns how many were removed.
    fn prune_expired_blacklist(&self, now: i64) -> Result<usize>;
}
