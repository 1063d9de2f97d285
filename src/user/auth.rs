//! Authentication primitives: opaque session tokens and password hashing.

use anyhow::{bail, Result};

use rand::Rng;
use rand_distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use std::str::FromStr;
use std::time::SystemTime;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct AuthTokenValue(pub String);

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AuthToken {
    pub user_id: usize,
    pub created: SystemTime,
    pub last_used: Option<SystemTime>,
    pub value: AuthTokenValue,
}

impl AuthTokenValue {
    pub fn generate() -> AuthTokenValue {
        let rng = rand::rng();
        let random_string: String = rng
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        AuthTokenValue(random_string)
    }
}

mod hub_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

/// Tag stored next to each hash so the algorithm can be swapped later
/// without invalidating existing credentials.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum HubHasher {
    Argon2,
}

impl FromStr for HubHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(HubHasher::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for HubHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubHasher::Argon2 => write!(f, "argon2"),
        }
    }
}

impl HubHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            HubHasher::Argon2 => hub_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            HubHasher::Argon2 => hub_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T) -> Result<bool> {
        match self {
            HubHasher::Argon2 => hub_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct UserPasswordCredentials {
    pub user_id: usize,
    pub salt: String,
    pub hash: String,
    pub hasher: HubHasher,

    pub created: SystemTime,
    pub last_tried: Option<SystemTime>,
    pub last_used: Option<SystemTime>,
}
