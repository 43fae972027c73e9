use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use common::types::FieldError;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use models::validate;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, ProfileUpdate, RegisterInput};
use super::errors::AuthError;
use super::repository::{AuthRepository, NewPassword, NewUser};

const PASSWORD_RULE: &str = "one uppercase letter, one lowercase letter, one number, and one special character";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: Duration::hours(token_ttl_hours), password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn check_password_strength(errors: &mut Vec<FieldError>, field: &str, label: &str, password: &str) {
    if password.chars().count() < 8 {
        errors.push(FieldError::new(field, format!("{label} must be at least 8 characters long")));
    } else if !validate::is_strong_password(password) {
        errors.push(FieldError::new(field, format!("{label} must contain at least {PASSWORD_RULE}")));
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password and return a signed-in session.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 24));
    /// let input = RegisterInput { name: "Test User".into(), email: "User@Example.com".into(), password: "Secret123!".into(), phone: "5551234567".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let phone = input.phone.trim().to_string();

        let mut errors = Vec::new();
        if !(2..=50).contains(&name.chars().count()) {
            errors.push(FieldError::new("name", "Name must be between 2 and 50 characters"));
        } else if !validate::is_valid_name(&name) {
            errors.push(FieldError::new("name", "Name can only contain letters and spaces"));
        }
        if email.len() > 100 {
            errors.push(FieldError::new("email", "Email cannot exceed 100 characters"));
        } else if !validate::is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please provide a valid email address"));
        }
        check_password_strength(&mut errors, "password", "Password", &input.password);
        if !validate::is_valid_phone(&phone) {
            errors.push(FieldError::new("phone", "Please provide a valid phone number"));
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict("User with this email already exists".into()));
        }

        let hash = hash_password(&input.password)?;
        let user = self.repo
            .create_user_with_password(NewUser { name, email, phone }, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 24));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { name: "Nia Test".into(), email: "u@e.com".into(), password: "Passw0rd!".into(), phone: "5551234567".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// let user = tokio_test::block_on(svc.verify_token(&session.token)).unwrap();
    /// assert_eq!(user.id, session.user.id);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_lowercase();
        let mut errors = Vec::new();
        if !validate::is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please provide a valid email address"));
        }
        if input.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::invalid_credentials());
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Sign an HS256 token for `user`, valid for the configured lifetime.
    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.cfg.token_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&JwtHeader::default(), claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Decode `token` and load the user it names.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken("Invalid token".into()),
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken("Invalid token".into()))?;
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Invalid token - user not found".into()))
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    /// Apply name/phone changes and an optional password change.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<AuthUser, AuthError> {
        let name = update.name.as_deref().map(str::trim);
        let phone = update.phone.as_deref().map(str::trim);

        let mut errors = Vec::new();
        if let Some(name) = name {
            if !(2..=50).contains(&name.chars().count()) {
                errors.push(FieldError::new("name", "Name must be between 2 and 50 characters"));
            } else if !validate::is_valid_name(name) {
                errors.push(FieldError::new("name", "Name can only contain letters and spaces"));
            }
        }
        if let Some(phone) = phone {
            if !validate::is_valid_phone(phone) {
                errors.push(FieldError::new("phone", "Please provide a valid phone number"));
            }
        }
        if let Some(new_password) = update.new_password.as_deref().filter(|p| !p.is_empty()) {
            check_password_strength(&mut errors, "newPassword", "New password", new_password);
            if let Some(confirm) = update.confirm_password.as_deref() {
                if confirm != new_password {
                    errors.push(FieldError::new("confirmPassword", "Password confirmation does not match"));
                }
            }
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self.profile(user_id).await?;

        // Checked before anything is written.
        let password = match update.new_password.as_deref().filter(|p| !p.is_empty()) {
            Some(new_password) => {
                let current = update
                    .current_password
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| AuthError::BadRequest("Current password is required to change password".into()))?;
                let cred = self.repo.get_credentials(user.id).await?.ok_or(AuthError::NotFound)?;
                if !verify_password(current, &cred.password_hash)? {
                    return Err(AuthError::BadRequest("Current password is incorrect".into()));
                }
                Some(NewPassword { hash: hash_password(new_password)?, algorithm: self.cfg.password_algorithm.clone() })
            }
            None => None,
        };

        if name.is_none() && phone.is_none() && password.is_none() {
            return Ok(user);
        }
        let password_changed = password.is_some();
        let updated = self.repo.update_profile(user.id, name, phone, password).await?;
        if password_changed {
            info!(user_id = %updated.id, "password_changed");
        }
        info!(user_id = %updated.id, "profile_updated");
        Ok(updated)
    }
}
