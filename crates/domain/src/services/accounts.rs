//! User account service: sign-up, login and admin user management.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::storage::{load_json, save_json, KeyValueStore, USERS_KEY};
use crate::error::DomainError;
use crate::models::{LoginRequest, SignUpRequest, User, UserRole, UserSummary};
use shared::password::{hash_password, verify_password};
use shared::validation::emails_match;

/// Account operations over the user list stored under [`USERS_KEY`].
pub struct AccountService<S> {
    store: S,
}

impl<S: KeyValueStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(load_json(&self.store, USERS_KEY)?.unwrap_or_default())
    }

    fn save_users(&self, users: &[User]) -> Result<(), DomainError> {
        save_json(&self.store, USERS_KEY, users)?;
        Ok(())
    }

    /// Creates an account. Email addresses are unique, ignoring case.
    pub fn sign_up(&self, request: SignUpRequest) -> Result<UserSummary, DomainError> {
        let request = SignUpRequest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            ..request
        };
        request.validate()?;

        let mut users = self.load_users()?;
        if users.iter().any(|u| emails_match(&u.email, &request.email)) {
            return Err(DomainError::Conflict("Email already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            role: request.role(),
            password_hash: hash_password(&request.password)?,
            name: request.name,
            email: request.email,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        self.save_users(&users)?;

        info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user.into())
    }

    /// Checks credentials and returns the matching account.
    pub fn login(&self, request: LoginRequest) -> Result<UserSummary, DomainError> {
        request.validate()?;

        let user = self
            .load_users()?
            .into_iter()
            .find(|u| emails_match(&u.email, &request.email));

        match user {
            Some(user) if verify_password(&request.password, &user.password_hash)? => {
                info!(user_id = %user.id, "User logged in");
                Ok(user.into())
            }
            _ => {
                warn!("Failed login attempt");
                Err(DomainError::InvalidCredentials)
            }
        }
    }

    pub fn list_users(&self) -> Result<Vec<UserSummary>, DomainError> {
        Ok(self.load_users()?.into_iter().map(UserSummary::from).collect())
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<UserSummary>, DomainError> {
        Ok(self
            .load_users()?
            .into_iter()
            .find(|u| u.id == id)
            .map(UserSummary::from))
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        let mut users = self.load_users()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(DomainError::NotFound(format!("User {} not found", id)));
        }
        self.save_users(&users)?;

        info!(user_id = %id, "Account deleted");
        Ok(())
    }

    pub fn set_role(&self, id: Uuid, role: UserRole) -> Result<UserSummary, DomainError> {
        let mut users = self.load_users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;
        user.role = role;
        let updated = user.clone();
        self.save_users(&users)?;

        info!(user_id = %id, role = %role, "Account role changed");
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use std::sync::Arc;

    fn sign_up_request(email: &str, is_admin: bool) -> SignUpRequest {
        SignUpRequest {
            name: Name().fake(),
            email: email.to_string(),
            password: "s3cret".to_string(),
            confirm_password: "s3cret".to_string(),
            is_admin,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn service() -> AccountService<Arc<MemoryStore>> {
        AccountService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_sign_up_and_login() {
        let accounts = service();
        let email: String = SafeEmail().fake();
        let created = accounts.sign_up(sign_up_request(&email, false)).unwrap();
        assert_eq!(created.role, UserRole::User);

        let logged_in = accounts
            .login(login_request(&email.to_uppercase(), "s3cret"))
            .unwrap();
        assert_eq!(logged_in.id, created.id);
    }

    #[test]
    fn test_sign_up_admin_role() {
        let accounts = service();
        let admin = accounts
            .sign_up(sign_up_request("root@x.com", true))
            .unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn test_sign_up_duplicate_email_conflicts() {
        let accounts = service();
        accounts.sign_up(sign_up_request("ada@x.com", false)).unwrap();
        let result = accounts.sign_up(sign_up_request("ADA@x.com", false));
        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(accounts.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let accounts = service();
        let mut req = sign_up_request("ada@x.com", false);
        req.confirm_password = "different".to_string();
        assert!(matches!(
            accounts.sign_up(req),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(Arc::clone(&store));
        accounts.sign_up(sign_up_request("ada@x.com", false)).unwrap();

        let raw = store.load(USERS_KEY).unwrap().unwrap();
        assert!(!raw.contains("s3cret"));
        assert!(raw.contains("$argon2id$"));
    }

    #[test]
    fn test_login_wrong_password_or_unknown_email() {
        let accounts = service();
        accounts.sign_up(sign_up_request("ada@x.com", false)).unwrap();

        assert!(matches!(
            accounts.login(login_request("ada@x.com", "nope")),
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login(login_request("bob@x.com", "s3cret")),
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_set_role_and_delete() {
        let accounts = service();
        let user = accounts.sign_up(sign_up_request("ada@x.com", false)).unwrap();

        let promoted = accounts.set_role(user.id, UserRole::Admin).unwrap();
        assert!(promoted.is_admin());
        assert!(accounts.find_by_id(user.id).unwrap().unwrap().is_admin());

        accounts.delete_user(user.id).unwrap();
        assert!(accounts.find_by_id(user.id).unwrap().is_none());
        assert!(matches!(
            accounts.delete_user(user.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            accounts.set_role(user.id, UserRole::User),
            Err(DomainError::NotFound(_))
        ));
    }
}
