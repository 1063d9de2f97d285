use super::auth::{AuthToken, AuthTokenValue, UserPasswordCredentials};
use super::user_models::{NewUser, RoleProfile, User, UserRole};
use anyhow::Result;

pub trait UserPasswordCredentialsStore: Send + Sync {
    /// Returns the user's password credentials given the username.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_password_credentials(&self, username: &str)
        -> Result<Option<UserPasswordCredentials>>;

    /// Updates the timestamps of the user's password credentials.
    fn update_user_password_credentials(&self, credentials: UserPasswordCredentials) -> Result<()>;
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    /// Returns Err if there is a database error.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    /// Returns None if the token does not exist.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token.
    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Prunes unused auth tokens that haven't been used for the specified duration.
    /// Returns the number of tokens that were deleted.
    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize>;
}

pub trait UserStore: UserAuthTokenStore + UserPasswordCredentialsStore + Send + Sync {
    /// Creates a new user together with their password credentials and
    /// role profile in a single transaction. Returns the user id.
    /// Returns Err if the username or email is already taken.
    fn create_user_with_profile(
        &self,
        new_user: &NewUser,
        profile: &RoleProfile,
        credentials: &UserPasswordCredentials,
    ) -> Result<usize>;

    /// Returns a full user object for the given user id.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns a full user object for the given username.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Returns a user's id given the username.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, username: &str) -> Result<Option<usize>>;

    /// Returns true if a user is already registered with this email.
    fn email_exists(&self, email: &str) -> Result<bool>;

    /// Returns the role profile for the given user, read out of the table
    /// matching the role. Returns Ok(None) if no profile row exists.
    fn get_role_profile(&self, user_id: usize, role: UserRole) -> Result<Option<RoleProfile>>;
}

/// Combined trait for the full user storage surface.
pub trait FullUserStore: UserStore {}

impl<T: UserStore> FullUserStore for T {}
