//! Test fixture creation for the user and social databases
//!
//! Users are inserted directly through the store, bypassing the HTTP
//! validation layer, so each test starts with a known set of accounts.

use super::constants::*;
use anyhow::Result;
use artistry_hub_server::user::{
    HubHasher, Location, NewUser, RoleProfile, SqliteUserStore, UserPasswordCredentials, UserRole,
    UserStore,
};
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::TempDir;

fn fixture_location() -> Location {
    Location {
        address: Some("12 Test Street".to_string()),
        postal_code: FIXTURE_POSTAL_CODE.to_string(),
        district: Some("Bangalore".to_string()),
        state: Some("Karnataka".to_string()),
        country: Some("India".to_string()),
    }
}

/// Creates a temporary user database seeded with one user per role.
/// Returns (temp_dir, user_db_path, social_db_path). The social database
/// file does not exist yet, the store creates it on open.
pub fn create_test_dbs_with_users() -> Result<(TempDir, PathBuf, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let user_db_path = temp_dir.path().join("user.db");
    let social_db_path = temp_dir.path().join("social.db");

    {
        let store = SqliteUserStore::new(&user_db_path)?;

        create_user_with_password_and_profile(
            &store,
            ARTIST_USER,
            ARTIST_EMAIL,
            ARTIST_PASS,
            RoleProfile::Artist {
                art_form: ARTIST_ART_FORM.to_string(),
                specialisation: ARTIST_SPECIALISATION.to_string(),
            },
        )?;

        create_user_with_password_and_profile(
            &store,
            STUDENT_USER,
            STUDENT_EMAIL,
            STUDENT_PASS,
            RoleProfile::ViewerStudent {
                art_form: ARTIST_ART_FORM.to_string(),
            },
        )?;

        create_user_with_password_and_profile(
            &store,
            INSTITUTION_USER,
            INSTITUTION_EMAIL,
            INSTITUTION_PASS,
            RoleProfile::Institution {
                university_affiliation: INSTITUTION_AFFILIATION.to_string(),
                registration_id: INSTITUTION_REGISTRATION_ID.to_string(),
                location: fixture_location(),
            },
        )?;

        create_user_with_password_and_profile(
            &store,
            PROVIDER_USER,
            PROVIDER_EMAIL,
            PROVIDER_PASS,
            RoleProfile::ServiceProvider {
                owner_name: PROVIDER_OWNER_NAME.to_string(),
                expertise: vec!["Framing".to_string(), "Restoration".to_string()],
                location: fixture_location(),
            },
        )?;
    }

    Ok((temp_dir, user_db_path, social_db_path))
}

/// Creates a user with the given credentials and role profile
pub fn create_user_with_password_and_profile(
    store: &SqliteUserStore,
    username: &str,
    email: &str,
    password: &str,
    profile: RoleProfile,
) -> Result<usize> {
    let hasher = HubHasher::Argon2;
    let salt = hasher.generate_b64_salt();
    let hash = hasher.hash(password.as_bytes(), &salt)?;

    let credentials = UserPasswordCredentials {
        user_id: 0,
        salt,
        hash,
        hasher,
        created: SystemTime::now(),
        last_tried: None,
        last_used: None,
    };

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        role: profile.role(),
    };

    let user_id = store.create_user_with_profile(&new_user, &profile, &credentials)?;
    eprintln!("Created test user {} with id {}", username, user_id);
    Ok(user_id)
}
