use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
    DEFAULT_TIMESTAMP,
};
use crate::social::models::{MediaKind, NewPost, Post};
use crate::social::social_store::{LikeToggle, SocialStore};
use anyhow::{bail, Context, Result};
use rand::{rng, Rng};
use rand_distr::Alphanumeric;
use rusqlite::{params, Connection};
use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tracing::info;

/// V 0. User ids reference rows in the separate user database, so there
/// is no foreign key on them here.
const POST_TABLE_V_0: Table = Table {
    name: "post",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!("content", &SqlType::Text),
        sqlite_column!("media_url", &SqlType::Text),
        sqlite_column!("media_kind", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_post_user_id", "user_id")],
};
const POST_LIKE_TABLE_V_0: Table = Table {
    name: "post_like",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "post_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "post",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["post_id", "user_id"]],
    indices: &[("idx_post_like_post_id", "post_id")],
};
const FOLLOW_TABLE_V_0: Table = Table {
    name: "follow",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("follower_id", &SqlType::Integer, non_null = true),
        sqlite_column!("followed_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["follower_id", "followed_id"]],
    indices: &[("idx_follow_followed_id", "followed_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[POST_TABLE_V_0, POST_LIKE_TABLE_V_0, FOLLOW_TABLE_V_0],
    migration: None,
}];

/// A random A-z0-9 string
fn random_string(len: usize) -> String {
    let bytes = rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect::<Vec<u8>>();
    String::from_utf8_lossy(&bytes).to_string()
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(value as u64)
}

#[derive(Clone)]
pub struct SqliteSocialStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSocialStore {
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

        Ok(SqliteSocialStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating social db from version {} to {}",
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

    fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
        let media_kind: Option<String> = row.get(4)?;
        Ok(Post {
            id: row.get(0)?,
            user_id: row.get::<usize, i64>(1)? as usize,
            content: row.get(2)?,
            media_url: row.get(3)?,
            media_kind: media_kind.as_deref().and_then(MediaKind::from_str),
            created: system_time_from_column_result(row.get(5)?),
            liked_by: vec![],
        })
    }

    fn liked_by(conn: &Connection, post_id: &str) -> Result<Vec<usize>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT user_id FROM {} WHERE post_id = ?1",
            POST_LIKE_TABLE_V_0.name
        ))?;
        let user_ids = stmt
            .query_map(params![post_id], |row| row.get::<usize, i64>(0))?
            .map(|r| r.map(|id| id as usize))
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(user_ids)
    }

    fn query_posts(&self, where_clause: &str, args: &[&dyn rusqlite::ToSql], limit: Option<usize>) -> Result<Vec<Post>> {
        let conn = self.conn.lock().unwrap();
        let limit_clause = limit
            .map(|l| format!(" LIMIT {}", l))
            .unwrap_or_default();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, content, media_url, media_kind, created FROM {} {} \
             ORDER BY created DESC, id DESC{}",
            POST_TABLE_V_0.name, where_clause, limit_clause
        ))?;
        let mut posts = stmt
            .query_map(args, Self::row_to_post)?
            .collect::<Result<Vec<Post>, _>>()?;
        for post in posts.iter_mut() {
            post.liked_by = Self::liked_by(&conn, &post.id)?;
        }
        Ok(posts)
    }
}

impl SocialStore for SqliteSocialStore {
    fn create_post(&self, post: &NewPost) -> Result<String> {
        if post.content.is_none() && post.media_url.is_none() {
            bail!("A post needs either content or media");
        }
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        // Generate a random 16 A-z0-9 string that's not already a post id
        let mut post_id = random_string(16);
        while tx.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", POST_TABLE_V_0.name),
            params![post_id],
            |row| row.get::<usize, i64>(0),
        )? > 0
        {
            post_id = random_string(16);
        }

        tx.execute(
            &format!(
                "INSERT INTO {} (id, user_id, content, media_url, media_kind) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                POST_TABLE_V_0.name
            ),
            params![
                post_id,
                post.user_id,
                post.content,
                post.media_url,
                post.media_kind.map(|k| k.as_str())
            ],
        )
        .context("Could not create post")?;

        tx.commit()?;
        Ok(post_id)
    }

    fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, content, media_url, media_kind, created FROM {} WHERE id = ?1",
            POST_TABLE_V_0.name
        ))?;
        let mut post = match stmt.query_row(params![post_id], Self::row_to_post) {
            Ok(post) => post,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        post.liked_by = Self::liked_by(&conn, &post.id)?;
        Ok(Some(post))
    }

    fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        self.query_posts("", &[], Some(limit))
    }

    fn posts_by_user(&self, user_id: usize) -> Result<Vec<Post>> {
        self.query_posts("WHERE user_id = ?1", &[&(user_id as i64)], None)
    }

    fn toggle_like(&self, post_id: &str, user_id: usize) -> Result<Option<LikeToggle>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let post_exists = tx.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", POST_TABLE_V_0.name),
            params![post_id],
            |row| row.get::<usize, i64>(0),
        )? > 0;
        if !post_exists {
            return Ok(None);
        }

        let deleted = tx.execute(
            &format!(
                "DELETE FROM {} WHERE post_id = ?1 AND user_id = ?2",
                POST_LIKE_TABLE_V_0.name
            ),
            params![post_id, user_id],
        )?;
        let liked = deleted == 0;
        if liked {
            tx.execute(
                &format!(
                    "INSERT INTO {} (post_id, user_id) VALUES (?1, ?2)",
                    POST_LIKE_TABLE_V_0.name
                ),
                params![post_id, user_id],
            )?;
        }

        let count: i64 = tx.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE post_id = ?1",
                POST_LIKE_TABLE_V_0.name
            ),
            params![post_id],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(Some(LikeToggle {
            likes: count as usize,
            liked,
        }))
    }

    fn toggle_follow(&self, follower_id: usize, followed_id: usize) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            &format!(
                "DELETE FROM {} WHERE follower_id = ?1 AND followed_id = ?2",
                FOLLOW_TABLE_V_0.name
            ),
            params![follower_id, followed_id],
        )?;
        let following = if deleted == 0 {
            tx.execute(
                &format!(
                    "INSERT INTO {} (follower_id, followed_id) VALUES (?1, ?2)",
                    FOLLOW_TABLE_V_0.name
                ),
                params![follower_id, followed_id],
            )?;
            true
        } else {
            false
        };

        tx.commit()?;
        Ok(following)
    }

    fn is_following(&self, follower_id: usize, followed_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE follower_id = ?1 AND followed_id = ?2",
                FOLLOW_TABLE_V_0.name
            ),
            params![follower_id, followed_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn follower_count(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE followed_id = ?1",
                FOLLOW_TABLE_V_0.name
            ),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn post_count(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE user_id = ?1",
                POST_TABLE_V_0.name
            ),
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
