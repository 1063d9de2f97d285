use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

/// Schema versions are stored in PRAGMA user_version on top of this base,
/// so that a database created by an unrelated tool fails validation early.
pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // unused_mut fires when no optional field assignment is passed
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }

    fn from_sql_name(name: &str) -> Option<&'static SqlType> {
        match name {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            "BLOB" => Some(&SqlType::Blob),
            _ => None,
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl ForeignKeyOnChange {
    fn sql_name(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::SetDefault => "SET DEFAULT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut column_defs = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let mut def = format!("{} {}", column.name, column.sql_type.sql_name());
            if column.is_primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                def.push_str(" NOT NULL");
            }
            if column.is_unique {
                def.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                def.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(fk) = column.foreign_key {
                def.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    fk.foreign_table,
                    fk.foreign_column,
                    fk.on_delete.sql_name()
                ));
            }
            column_defs.push(def);
        }
        for unique_constraint in self.unique_constraints {
            column_defs.push(format!("UNIQUE ({})", unique_constraint.join(", ")));
        }
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, column_defs.join(", ")),
            params![],
        )?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    fn validate_columns(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns: Vec<Column<'_, String>> = stmt
            .query_map(params![], |row| {
                let sql_type = SqlType::from_sql_name(&row.get::<_, String>(2)?).ok_or(
                    rusqlite::Error::InvalidColumnType(2, "type".to_string(), Type::Text),
                )?;
                Ok(Column {
                    name: row.get::<usize, String>(1)?,
                    sql_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get::<_, Option<String>>(4)?,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                    is_unique: false,
                    foreign_key: None,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has columns [{}], expected [{}]",
                self.name,
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type != expected.sql_type {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}",
                    self.name,
                    expected.name,
                    expected.non_null
                );
            }
            // Stored defaults may come back wrapped in parentheses
            let actual_default = actual.default_value.as_deref().map(strip_outer_parens);
            let expected_default = expected.default_value.map(strip_outer_parens);
            if actual_default != expected_default {
                bail!(
                    "Table {} column {} default value mismatch: expected {:?}, got {:?}",
                    self.name,
                    expected.name,
                    expected.default_value,
                    actual.default_value
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key
                );
            }
        }
        Ok(())
    }

    fn validate_indices(&self, conn: &Connection) -> Result<()> {
        for (index_name, _) in self.indices {
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }
        Ok(())
    }

    /// SQLite reports table-level UNIQUE constraints as unique indices.
    fn validate_unique_constraints(&self, conn: &Connection) -> Result<()> {
        if self.unique_constraints.is_empty() {
            return Ok(());
        }

        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", self.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?))
            })?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
        for index_name in &unique_indices {
            let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut cols: Vec<String> = idx_stmt
                .query_map([], |row| row.get::<_, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            cols.sort();
            unique_index_columns.push(cols);
        }

        for expected_columns in self.unique_constraints {
            let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
            expected_sorted.sort_unstable();
            let found = unique_index_columns.iter().any(|actual| {
                actual.iter().map(|s| s.as_str()).collect::<Vec<_>>() == expected_sorted
            });
            if !found {
                bail!(
                    "Table {} is missing unique constraint on columns ({})",
                    self.name,
                    expected_columns.join(", ")
                );
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, conn: &Connection) -> Result<()> {
        struct ActualFk {
            from_column: String,
            to_table: String,
            to_column: String,
            on_delete: String,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", self.name))?;
        let actual_fks: Vec<ActualFk> = stmt
            .query_map([], |row| {
                Ok(ActualFk {
                    from_column: row.get(3)?,
                    to_table: row.get(2)?,
                    to_column: row.get(4)?,
                    on_delete: row.get(6)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        for column in self.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let found = actual_fks.iter().any(|actual| {
                actual.from_column == column.name
                    && actual.to_table == expected.foreign_table
                    && actual.to_column == expected.foreign_column
                    && actual.on_delete == expected.on_delete.sql_name()
            });
            if !found {
                bail!(
                    "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    expected.on_delete.sql_name()
                );
            }
        }
        Ok(())
    }
}

fn strip_outer_parens(s: &str) -> String {
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate_columns(conn)?;
            table.validate_indices(conn)?;
            table.validate_unique_constraints(conn)?;
            table.validate_foreign_keys(conn)?;
        }
        Ok(())
    }
}
