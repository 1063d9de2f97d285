use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
use crate::user::auth::{AuthToken, AuthTokenValue, HubHasher, UserPasswordCredentials};
use crate::user::user_models::{Location, NewUser, RoleProfile, User, UserRole};
use crate::user::user_store::{UserAuthTokenStore, UserPasswordCredentialsStore, UserStore};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tracing::info;

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("username", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!("profile_picture", &SqlType::Text),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_username", "username")],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};
const USER_PASSWORD_CREDENTIALS_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};
const ARTIST_PROFILE_TABLE_V_0: Table = Table {
    name: "artist_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("art_form", &SqlType::Text, non_null = true),
        sqlite_column!("specialisation", &SqlType::Text, non_null = true),
    ],
    unique_constraints: &[],
    indices: &[],
};
const STUDENT_PROFILE_TABLE_V_0: Table = Table {
    name: "student_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("art_form", &SqlType::Text, non_null = true),
    ],
    unique_constraints: &[],
    indices: &[],
};
const INSTITUTION_PROFILE_TABLE_V_0: Table = Table {
    name: "institution_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("university_affiliation", &SqlType::Text, non_null = true),
        sqlite_column!("registration_id", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text),
        sqlite_column!("postal_code", &SqlType::Text, non_null = true),
        sqlite_column!("city", &SqlType::Text),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
    ],
    unique_constraints: &[],
    indices: &[],
};
const SERVICE_PROVIDER_PROFILE_TABLE_V_0: Table = Table {
    name: "service_provider_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("owner_name", &SqlType::Text, non_null = true),
        sqlite_column!("expertise", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text, non_null = true),
        sqlite_column!("postal_code", &SqlType::Text, non_null = true),
        sqlite_column!("city", &SqlType::Text),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
    ],
    unique_constraints: &[],
    indices: &[],
};

/// V 1, "city" becomes "district" to match what the postal lookup returns.
const INSTITUTION_PROFILE_TABLE_V_1: Table = Table {
    name: "institution_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("university_affiliation", &SqlType::Text, non_null = true),
        sqlite_column!("registration_id", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text),
        sqlite_column!("postal_code", &SqlType::Text, non_null = true),
        sqlite_column!("district", &SqlType::Text),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
    ],
    unique_constraints: &[],
    indices: &[],
};
const SERVICE_PROVIDER_PROFILE_TABLE_V_1: Table = Table {
    name: "service_provider_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("owner_name", &SqlType::Text, non_null = true),
        sqlite_column!("expertise", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text, non_null = true),
        sqlite_column!("postal_code", &SqlType::Text, non_null = true),
        sqlite_column!("district", &SqlType::Text),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
    ],
    unique_constraints: &[],
    indices: &[],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_V_0,
            ARTIST_PROFILE_TABLE_V_0,
            STUDENT_PROFILE_TABLE_V_0,
            INSTITUTION_PROFILE_TABLE_V_0,
            SERVICE_PROVIDER_PROFILE_TABLE_V_0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_V_0,
            ARTIST_PROFILE_TABLE_V_0,
            STUDENT_PROFILE_TABLE_V_0,
            INSTITUTION_PROFILE_TABLE_V_1,
            SERVICE_PROVIDER_PROFILE_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            conn.execute(
                "ALTER TABLE institution_profile RENAME COLUMN city TO district",
                [],
            )?;
            conn.execute(
                "ALTER TABLE service_provider_profile RENAME COLUMN city TO district",
                [],
            )?;
            Ok(())
        }),
    },
];

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(value as u64)
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema versions defined")?
                .create(&conn)?;
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        } else {
            VERSIONED_SCHEMAS
                .get(version)
                .context("Failed to get schema")?
                .validate(&conn)?;
        }

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating user db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let role_str: String = row.get(3)?;
        let role = UserRole::from_str(&role_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(3, role_str.clone(), rusqlite::types::Type::Text)
        })?;
        Ok(User {
            id: row.get::<usize, i64>(0)? as usize,
            username: row.get(1)?,
            email: row.get(2)?,
            role,
            profile_picture: row.get(4)?,
            description: row.get(5)?,
            created: system_time_from_column_result(row.get(6)?),
        })
    }

    fn row_to_location(row: &rusqlite::Row, first_col: usize) -> rusqlite::Result<Location> {
        Ok(Location {
            address: row.get(first_col)?,
            postal_code: row.get(first_col + 1)?,
            district: row.get(first_col + 2)?,
            state: row.get(first_col + 3)?,
            country: row.get(first_col + 4)?,
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user_with_profile(
        &self,
        new_user: &NewUser,
        profile: &RoleProfile,
        credentials: &UserPasswordCredentials,
    ) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO {} (username, email, role) VALUES (?1, ?2, ?3)",
                USER_TABLE_V_0.name
            ),
            params![new_user.username, new_user.email, new_user.role.as_str()],
        )
        .with_context(|| format!("Failed to create user {}", new_user.username))?;
        let user_id = tx.last_insert_rowid() as usize;

        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)",
                USER_PASSWORD_CREDENTIALS_V_0.name
            ),
            params![
                user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string()
            ],
        )?;

        match profile {
            RoleProfile::Artist {
                art_form,
                specialisation,
            } => {
                tx.execute(
                    &format!(
                        "INSERT INTO {} (user_id, art_form, specialisation) VALUES (?1, ?2, ?3)",
                        ARTIST_PROFILE_TABLE_V_0.name
                    ),
                    params![user_id, art_form, specialisation],
                )?;
            }
            RoleProfile::ViewerStudent { art_form } => {
                tx.execute(
                    &format!(
                        "INSERT INTO {} (user_id, art_form) VALUES (?1, ?2)",
                        STUDENT_PROFILE_TABLE_V_0.name
                    ),
                    params![user_id, art_form],
                )?;
            }
            RoleProfile::Institution {
                university_affiliation,
                registration_id,
                location,
            } => {
                tx.execute(
                    &format!(
                        "INSERT INTO {} (user_id, university_affiliation, registration_id, \
                         address, postal_code, district, state, country) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        INSTITUTION_PROFILE_TABLE_V_1.name
                    ),
                    params![
                        user_id,
                        university_affiliation,
                        registration_id,
                        location.address,
                        location.postal_code,
                        location.district,
                        location.state,
                        location.country
                    ],
                )?;
            }
            RoleProfile::ServiceProvider {
                owner_name,
                expertise,
                location,
            } => {
                let expertise_json = serde_json::to_string(expertise)?;
                tx.execute(
                    &format!(
                        "INSERT INTO {} (user_id, owner_name, expertise, \
                         address, postal_code, district, state, country) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        SERVICE_PROVIDER_PROFILE_TABLE_V_1.name
                    ),
                    params![
                        user_id,
                        owner_name,
                        expertise_json,
                        location.address,
                        location.postal_code,
                        location.district,
                        location.state,
                        location.country
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(user_id)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, username, email, role, profile_picture, description, created \
             FROM {} WHERE id = ?1",
            USER_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![user_id], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, username, email, role, profile_picture, description, created \
             FROM {} WHERE username = ?1",
            USER_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![username], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn get_user_id(&self, username: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id FROM {} WHERE username = ?1",
            USER_TABLE_V_0.name
        ))?;
        match stmt.query_row(params![username], |row| row.get::<usize, i64>(0)) {
            Ok(id) => Ok(Some(id as usize)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE email = ?1", USER_TABLE_V_0.name),
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_role_profile(&self, user_id: usize, role: UserRole) -> Result<Option<RoleProfile>> {
        let conn = self.conn.lock().unwrap();
        let result = match role {
            UserRole::Artist => conn
                .query_row(
                    &format!(
                        "SELECT art_form, specialisation FROM {} WHERE user_id = ?1",
                        ARTIST_PROFILE_TABLE_V_0.name
                    ),
                    params![user_id],
                    |row| {
                        Ok(RoleProfile::Artist {
                            art_form: row.get(0)?,
                            specialisation: row.get(1)?,
                        })
                    },
                ),
            UserRole::ViewerStudent => conn
                .query_row(
                    &format!(
                        "SELECT art_form FROM {} WHERE user_id = ?1",
                        STUDENT_PROFILE_TABLE_V_0.name
                    ),
                    params![user_id],
                    |row| {
                        Ok(RoleProfile::ViewerStudent {
                            art_form: row.get(0)?,
                        })
                    },
                ),
            UserRole::Institution => conn
                .query_row(
                    &format!(
                        "SELECT university_affiliation, registration_id, address, postal_code, \
                         district, state, country FROM {} WHERE user_id = ?1",
                        INSTITUTION_PROFILE_TABLE_V_1.name
                    ),
                    params![user_id],
                    |row| {
                        Ok(RoleProfile::Institution {
                            university_affiliation: row.get(0)?,
                            registration_id: row.get(1)?,
                            location: Self::row_to_location(row, 2)?,
                        })
                    },
                ),
            UserRole::ServiceProvider => conn
                .query_row(
                    &format!(
                        "SELECT owner_name, expertise, address, postal_code, \
                         district, state, country FROM {} WHERE user_id = ?1",
                        SERVICE_PROVIDER_PROFILE_TABLE_V_1.name
                    ),
                    params![user_id],
                    |row| {
                        let expertise_json: String = row.get(1)?;
                        let expertise = serde_json::from_str(&expertise_json).map_err(|_| {
                            rusqlite::Error::InvalidColumnType(
                                1,
                                expertise_json,
                                rusqlite::types::Type::Text,
                            )
                        })?;
                        Ok(RoleProfile::ServiceProvider {
                            owner_name: row.get(0)?,
                            expertise,
                            location: Self::row_to_location(row, 2)?,
                        })
                    },
                ),
        };
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, value, created, last_used FROM {} WHERE value = ?1",
            AUTH_TOKEN_TABLE_V_0.name
        ))?;
        let result = stmt.query_row(params![value.0], |row| {
            Ok(AuthToken {
                user_id: row.get::<usize, i64>(0)? as usize,
                value: AuthTokenValue(row.get(1)?),
                created: system_time_from_column_result(row.get(2)?),
                last_used: row
                    .get::<usize, Option<i64>>(3)?
                    .map(system_time_from_column_result),
            })
        });
        match result {
            Ok(token) => Ok(Some(token)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let Some(stored) = self.get_user_auth_token(token)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE value = ?1", AUTH_TOKEN_TABLE_V_0.name),
            params![stored.value.0],
        )?;
        Ok(Some(stored))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE {} SET last_used = {} WHERE value = ?1",
                AUTH_TOKEN_TABLE_V_0.name, DEFAULT_TIMESTAMP
            ),
            params![token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (value, user_id) VALUES (?1, ?2)",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![token.value.0, token.user_id],
        )?;
        Ok(())
    }

    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let cutoff = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)?
            .as_secs() as i64
            - (unused_for_days * 24 * 60 * 60) as i64;
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE COALESCE(last_used, created) < ?1",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

impl UserPasswordCredentialsStore for SqliteUserStore {
    fn get_user_password_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserPasswordCredentials>> {
        let Some(user_id) = self.get_user_id(username)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id, salt, hash, hasher, created, last_tried, last_used \
             FROM {} WHERE user_id = ?1",
            USER_PASSWORD_CREDENTIALS_V_0.name
        ))?;
        let result = stmt.query_row(params![user_id], |row| {
            let hasher_str: String = row.get(3)?;
            let hasher = HubHasher::from_str(&hasher_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(3, hasher_str, rusqlite::types::Type::Text)
            })?;
            Ok(UserPasswordCredentials {
                user_id: row.get::<usize, i64>(0)? as usize,
                salt: row.get(1)?,
                hash: row.get(2)?,
                hasher,
                created: system_time_from_column_result(row.get(4)?),
                last_tried: row
                    .get::<usize, Option<i64>>(5)?
                    .map(system_time_from_column_result),
                last_used: row
                    .get::<usize, Option<i64>>(6)?
                    .map(system_time_from_column_result),
            })
        });
        match result {
            Ok(credentials) => Ok(Some(credentials)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn update_user_password_credentials(
        &self,
        credentials: UserPasswordCredentials,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let last_tried = credentials
            .last_tried
            .map(|t| t.duration_since(SystemTime::UNIX_EPOCH))
            .transpose()?
            .map(|d| d.as_secs() as i64);
        let last_used = credentials
            .last_used
            .map(|t| t.duration_since(SystemTime::UNIX_EPOCH))
            .transpose()?
            .map(|d| d.as_secs() as i64);
        conn.execute(
            &format!(
                "UPDATE {} SET last_tried = ?1, last_used = ?2 WHERE user_id = ?3",
                USER_PASSWORD_CREDENTIALS_V_0.name
            ),
            params![last_tried, last_used, credentials.user_id],
        )?;
        Ok(())
    }
}
