use super::{
    auth::{AuthToken, AuthTokenValue, HubHasher, UserPasswordCredentials},
    user_models::{NewUser, RoleProfile, User, UserRole},
    validation::{self, FieldError},
    FullUserStore,
};
use anyhow::{bail, Result};
use std::{sync::Arc, time::SystemTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("invalid registration fields")]
    Invalid(Vec<FieldError>),
    #[error("{0} already taken")]
    Taken(&'static str),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct UserManager {
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn FullUserStore>) -> Self {
        Self { user_store }
    }

    /// Registers a new user. The role profile arrives already parsed and
    /// postal-autofilled, so what is left here is field validation, the
    /// taken checks and the actual write.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
        profile: RoleProfile,
    ) -> Result<usize, RegistrationError> {
        let mut errors = Vec::new();
        if let Some(error) = validation::validate_name("userName", username) {
            errors.push(error);
        }
        if let Some(error) = validation::validate_email(email) {
            errors.push(error);
        }
        if let Some(error) = validation::validate_password(password) {
            errors.push(error);
        }
        if let RoleProfile::Institution { location, .. }
        | RoleProfile::ServiceProvider { location, .. } = &profile
        {
            errors.extend(validation::validate_location_complete(location));
        }
        if !errors.is_empty() {
            return Err(RegistrationError::Invalid(errors));
        }

        if self.user_store.get_user_id(username)?.is_some() {
            return Err(RegistrationError::Taken("userName"));
        }
        if self.user_store.email_exists(email)? {
            return Err(RegistrationError::Taken("email"));
        }

        let credentials = Self::create_hashed_password(password)?;
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role,
        };
        Ok(self
            .user_store
            .create_user_with_profile(&new_user, &profile, &credentials)?)
    }

    fn create_hashed_password(password: &str) -> Result<UserPasswordCredentials> {
        let hasher = HubHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(UserPasswordCredentials {
            user_id: 0,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
            last_tried: None,
            last_used: None,
        })
    }

    /// Checks a username/password pair. Returns the user on success,
    /// Ok(None) when either the user is unknown or the password is wrong.
    pub fn verify_login(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(mut credentials) = self.user_store.get_user_password_credentials(username)?
        else {
            return Ok(None);
        };

        credentials.last_tried = Some(SystemTime::now());
        let verified = credentials.hasher.verify(password, &credentials.hash)?;
        if verified {
            credentials.last_used = Some(SystemTime::now());
        }
        self.user_store
            .update_user_password_credentials(credentials.clone())?;

        if verified {
            self.user_store.get_user(credentials.user_id)
        } else {
            Ok(None)
        }
    }

    pub fn generate_auth_token(&self, user_id: usize) -> Result<AuthToken> {
        let token = AuthToken {
            user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        self.user_store.get_user_auth_token(value)
    }

    pub fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        self.user_store
            .update_user_auth_token_last_used_timestamp(value)
    }

    pub fn delete_auth_token(&self, user_id: usize, token_value: &AuthTokenValue) -> Result<()> {
        let removed = self.user_store.delete_user_auth_token(token_value)?;
        match removed {
            Some(removed) => {
                if removed.user_id == user_id {
                    Ok(())
                } else {
                    // Not the owner, put the token back.
                    let _ = self.user_store.add_user_auth_token(removed.clone());
                    bail!(
                        "Tried to delete auth token {}, but the authenticated user {} was not the owner {} of the token.",
                        token_value.0,
                        user_id,
                        removed.user_id
                    )
                }
            }
            None => bail!("Did not find auth token {}", token_value.0),
        }
    }

    pub fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize> {
        self.user_store.prune_unused_auth_tokens(unused_for_days)
    }
}
