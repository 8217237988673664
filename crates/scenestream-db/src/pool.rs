//! Database connection pool management.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use scenestream_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Open (or create) the database at `db_path` and run pending migrations.
///
/// Every connection has foreign key enforcement switched on.
///
/// ```no_run
/// use scenestream_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/scenestream/db.sqlite").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;"));

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

/// In-memory database for tests and offline tooling.
///
/// Each SQLite in-memory connection is its own database, so the pool holds
/// exactly one connection. Never hold a connection across a second `get`.
///
/// ```
/// use scenestream_db::pool::{get_conn, init_memory_pool};
///
/// let pool = init_memory_pool().unwrap();
/// let conn = get_conn(&pool).unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create in-memory pool: {}", e)))?;

    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DbPool) -> Result<()> {
    let conn = get_conn(pool)?;
    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
    Ok(())
}

/// Get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
