use axum::extract::FromRef;

use crate::postal::PostalLookup;
use crate::social::SocialStore;
use crate::user::{FullUserStore, UserManager};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<Mutex<UserManager>>;
pub type GuardedUserStore = Arc<dyn FullUserStore>;
pub type GuardedSocialStore = Arc<dyn SocialStore>;
pub type GuardedPostalLookup = Arc<dyn PostalLookup>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub user_store: GuardedUserStore,
    pub social_store: GuardedSocialStore,
    pub postal: GuardedPostalLookup,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.user_store.clone()
    }
}

impl FromRef<ServerState> for GuardedSocialStore {
    fn from_ref(input: &ServerState) -> Self {
        input.social_store.clone()
    }
}

impl FromRef<ServerState> for GuardedPostalLookup {
    fn from_ref(input: &ServerState) -> Self {
        input.postal.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
