use sqlx::sqlite::SqlitePool;
use sqlx::Executor;

use crate::error::ApiError;
use crate::materialize::materialize;
use crate::models::RecordSet;

mod cursor;

pub use cursor::SqliteCursor;

/// Opens the pool and makes sure the database answers before we serve.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePool::connect(database_url).await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// The two tables the ETL job loads, one row per squad per season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RegularSeason,
    Ratings,
}

impl Table {
    pub fn query(self) -> &'static str {
        match self {
            Table::RegularSeason => r#"SELECT * FROM regular_season WHERE lower(squad) = ?"#,
            Table::Ratings => r#"SELECT * FROM ratings WHERE lower(squad) = ?"#,
        }
    }
}

/// Squads are matched case-insensitively over ASCII only, the same folding
/// SQLite's `lower()` applies to the stored column.
pub fn fold_squad(squad: &str) -> String {
    squad.trim().to_ascii_lowercase()
}

/// All rows of `table` for `squad`, whatever columns the table has
pub async fn fetch_squad(pool: &SqlitePool, table: Table, squad: &str) -> Result<RecordSet, ApiError> {
    let mut conn = pool.acquire().await?;
    let statement = (&mut *conn).prepare(table.query()).await?;

    let cursor = SqliteCursor::open(&statement, &mut *conn, fold_squad(squad));

    Ok(materialize(cursor).await?)
}
