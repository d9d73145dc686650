use super::auth::{hash_password, verify_password};
use super::tokens::{TokenIssuer, TokenType};
use super::user_models::{NewUser, ProfileUpdate, Registration, SessionTokens, User};
use crate::authorization::Subject;
use crate::error::{AppError, AppResult};
use crate::store::FullStore;
use crate::tasks::{TaskIntent, TaskQueue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_TOKEN: &str = "Invalid or expired token";

/// Collects per-field problems so that a single response can report all of them.
#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    fn into_result(self) -> AppResult<()> {
        let Some(detail) = self.0.values().next().cloned() else {
            return Ok(());
        };
        Err(AppError::Validation {
            detail,
            fields: self.0,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

pub struct UserManager {
    store: Arc<dyn FullStore>,
    tokens: TokenIssuer,
    tasks: TaskQueue,
}

impl UserManager {
    pub fn new(store: Arc<dyn FullStore>, tokens: TokenIssuer, tasks: TaskQueue) -> Self {
        Self {
            store,
            tokens,
            tasks,
        }
    }

    fn issue_session(&self, user: User) -> AppResult<SessionTokens> {
        let access = self.tokens.issue_access(user.id)?;
        let refresh = self.tokens.issue_refresh(user.id)?;
        Ok(SessionTokens {
            access: access.token,
            refresh: refresh.token,
            user,
        })
    }

    fn load_user(&self, user_id: i64) -> AppResult<User> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Checks that `username` and `email` are well formed and not taken by
    /// anybody other than `owner`.
    fn check_identity(
        &self,
        errors: &mut FieldErrors,
        username: Option<&str>,
        email: Option<&str>,
        owner: Option<i64>,
    ) -> AppResult<()> {
        if let Some(username) = username {
            if username.trim().is_empty() {
                errors.add("username", "This field may not be blank.");
            } else if let Some(existing) = self.store.get_user_by_username(username)? {
                if Some(existing.id) != owner {
                    errors.add("username", "A user with that username already exists.");
                }
            }
        }
        if let Some(email) = email {
            if !looks_like_email(email) {
                errors.add("email", "Enter a valid email address.");
            } else if let Some(existing) = self.store.get_user_by_email(email)? {
                if Some(existing.id) != owner {
                    errors.add("email", "A user with this email already exists.");
                }
            }
        }
        Ok(())
    }

    pub fn register(&self, registration: Registration) -> AppResult<SessionTokens> {
        let mut errors = FieldErrors::default();
        self.check_identity(
            &mut errors,
            Some(&registration.username),
            Some(&registration.email),
            None,
        )?;
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {} characters long.", MIN_PASSWORD_LENGTH),
            );
        }
        if registration.password != registration.password_confirm {
            errors.add("password_confirm", "Passwords don't match");
        }
        errors.into_result()?;

        let password_hash = hash_password(&registration.password)?;
        let user_id = self.store.create_user(&NewUser {
            username: registration.username.trim().to_string(),
            email: registration.email,
            password_hash,
            first_name: registration.first_name,
            last_name: registration.last_name,
            role: registration.role,
        })?;
        let user = self.load_user(user_id)?;
        info!("Registered user {} ({}) as {}", user.username, user.id, user.role.as_str());

        self.tasks.submit(TaskIntent::SendWelcomeEmail { user_id });
        self.tasks.submit(TaskIntent::WelcomeNotification { user_id });

        self.issue_session(user)
    }

    pub fn login(&self, email: &str, password: &str) -> AppResult<SessionTokens> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Must include email and password"));
        }
        let Some(user) = self.store.get_user_by_email(email)? else {
            debug!("Login attempt for unknown email");
            return Err(AppError::validation(INVALID_CREDENTIALS));
        };
        let Some(hash) = self.store.get_password_hash(user.id)? else {
            return Err(AppError::validation(INVALID_CREDENTIALS));
        };
        if !verify_password(password, &hash)? {
            debug!("Wrong password for user {}", user.id);
            return Err(AppError::validation(INVALID_CREDENTIALS));
        }
        self.issue_session(user)
    }

    /// Exchanges a refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;
        if self.store.is_refresh_token_blacklisted(&claims.jti)? {
            return Err(AppError::unauthorized("Token is blacklisted"));
        }
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;
        if self.store.get_user(user_id)?.is_none() {
            return Err(AppError::unauthorized(INVALID_TOKEN));
        }
        Ok(self.tokens.issue_access(user_id)?.token)
    }

    /// Invalidates the caller's refresh token, if one is given and valid.
    /// Tokens of other users are left alone.
    pub fn logout(&self, subject: &Subject, refresh_token: Option<&str>) -> AppResult<()> {
        let now = chrono::Utc::now().timestamp();
        if let Some(claims) = refresh_token.and_then(|t| self.tokens.verify(t, TokenType::Refresh)) {
            if claims.user_id() == Some(subject.user_id) {
                self.store
                    .blacklist_refresh_token(&claims.jti, subject.user_id, claims.exp)?;
                debug!("Blacklisted refresh token {}", claims.jti);
            }
        }
        let pruned = self.store.prune_expired_blacklist(now)?;
        if pruned > 0 {
            debug!("Pruned {} expired blacklist entries", pruned);
        }
        Ok(())
    }

    /// Resolves a bearer access token to its user.
    pub fn authenticate_access(&self, access_token: &str) -> AppResult<User> {
        let user_id = self
            .tokens
            .verify(access_token, TokenType::Access)
            .and_then(|claims| claims.user_id())
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))?;
        self.store
            .get_user(user_id)?
            .ok_or_else(|| AppError::unauthorized(INVALID_TOKEN))
    }

    pub fn get_profile(&self, subject: &Subject) -> AppResult<User> {
        self.load_user(subject.user_id)
    }

    pub fn update_profile(&self, subject: &Subject, update: ProfileUpdate) -> AppResult<User> {
        let mut errors = FieldErrors::default();
        self.check_identity(
            &mut errors,
            update.username.as_deref(),
            update.email.as_deref(),
            Some(subject.user_id),
        )?;
        errors.into_result()?;

        let update = ProfileUpdate {
            username: update.username.map(|u| u.trim().to_string()),
            ..update
        };
        if !self.store.update_profile(subject.user_id, &update)? {
            return Err(AppError::not_found("User not found"));
        }
        self.load_user(subject.user_id)
    }

    pub fn change_password(
        &self,
        subject: &Subject,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let hash = self
            .store
            .get_password_hash(subject.user_id)?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if !verify_password(current_password, &hash)? {
            return Err(AppError::invalid_field(
                "current_password",
                "Current password is incorrect",
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_field(
                "new_password",
                format!("Password must be at least {} characters long.", MIN_PASSWORD_LENGTH),
            ));
        }
        self.store
            .set_password_hash(subject.user_id, &hash_password(new_password)?)?;
        info!("User {} changed password", subject.user_id);
        Ok(())
    }
}
