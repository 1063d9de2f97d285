mod auth;
mod sqlite_user_store;
mod user_manager;
mod user_models;
mod user_store;
pub mod validation;

pub use auth::{AuthToken, AuthTokenValue, HubHasher, UserPasswordCredentials};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::{RegistrationError, UserManager};
pub use user_models::{Location, NewUser, RoleProfile, User, UserRole};
pub use user_store::{
    FullUserStore, UserAuthTokenStore, UserPasswordCredentialsStore, UserStore,
};
