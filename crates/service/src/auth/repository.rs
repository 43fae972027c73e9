use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Fields of a user row as written at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A replacement password hash and the algorithm that produced it.
#[derive(Debug, Clone)]
pub struct NewPassword {
    pub hash: String,
    pub algorithm: String,
}

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Insert the user and its credentials as one unit; neither exists on failure.
    async fn create_user_with_password(&self, user: NewUser, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError>;
    /// Contact changes and an optional new password, committed together or not at all.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        phone: Option<&str>,
        password: Option<NewPassword>,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,    // key: user id
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, AuthError> {
        m.lock().map_err(|_| AuthError::Repository("mock repository lock poisoned".into()))
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = lock(&self.users)?;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(lock(&self.users)?.get(&id).cloned())
        }

        async fn create_user_with_password(&self, user: NewUser, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            if users.values().any(|u| u.email == user.email) {
                return Err(AuthError::Conflict("User with this email already exists".into()));
            }
            let now = Utc::now();
            let created = AuthUser { id: Uuid::new_v4(), name: user.name, email: user.email, phone: user.phone, created_at: now, updated_at: now };
            users.insert(created.id, created.clone());
            lock(&self.creds)?.insert(created.id, Credentials { user_id: created.id, password_hash, password_algorithm });
            Ok(created)
        }

        async fn update_profile(
            &self,
            id: Uuid,
            name: Option<&str>,
            phone: Option<&str>,
            password: Option<NewPassword>,
        ) -> Result<AuthUser, AuthError> {
            let mut users = lock(&self.users)?;
            let mut creds = lock(&self.creds)?;
            let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            if let Some(p) = password {
                if p.hash.trim().is_empty() {
                    return Err(AuthError::Repository("password hash required".into()));
                }
                creds.insert(id, Credentials { user_id: id, password_hash: p.hash, password_algorithm: p.algorithm });
            }
            if let Some(name) = name {
                user.name = name.trim().to_string();
            }
            if let Some(phone) = phone {
                user.phone = phone.trim().to_string();
            }
            user.updated_at = Utc::now();
            Ok(user.clone())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            Ok(lock(&self.creds)?.get(&user_id).cloned())
        }
    }
}
