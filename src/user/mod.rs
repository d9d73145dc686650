pub mod auth;
pub mod permissions;
pub mod tokens;
mod user_manager;
mod user_models;
mod user_store;

pub use permissions::{Permission, UserRole};
pub use tokens::{TokenIssuer, TokenType, REFRESH_TOKEN_LIFETIME_DAYS};
pub use user_manager::{UserManager, MIN_PASSWORD_LENGTH};
pub use user_models::{NewUser, ProfileUpdate, Registration, SessionTokens, User};
pub use user_store::{RefreshTokenStore, UserStore};
