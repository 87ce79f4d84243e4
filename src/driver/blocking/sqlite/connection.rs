/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */

//!
//! r2d2 glue for SQLite databases named by a `sqlite:` url.
//!

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use r2d2::{ManageConnection, Pool, PooledConnection};
use rusqlite::Connection;
use tracing::debug;
use crate::config::DataSourceConfig;
use crate::driver::DriverType;
use crate::errors::{Result, S2JdbcError};

pub type SqlitePool = Pool<SqliteManager>;
pub type SqliteConnection = PooledConnection<SqliteManager>;

const MEMORY_DATABASE: &str = ":memory:";

static MEMORY_DATABASES: AtomicUsize = AtomicUsize::new(0);

/// The database a pool connects to.
#[derive(Debug, Clone, PartialEq)]
pub enum SqliteSource {
    File(PathBuf),
    /// Shared-cache uri of an in-memory database. Every connection of the
    /// pool sees the same schema while at least one of them is open.
    Memory(String),
}

impl SqliteSource {
    pub fn from_config(cfg: &DataSourceConfig) -> Result<Self> {
        if cfg.get_platform()? != DriverType::Sqlite {
            return Err(S2JdbcError::DatabaseError(format!("not a sqlite url: {}", cfg.url().map(String::as_str).unwrap_or_default())));
        }
        let database = cfg.get_connection_string()?;
        if database == MEMORY_DATABASE {
            let id = MEMORY_DATABASES.fetch_add(1, Ordering::Relaxed);
            Ok(SqliteSource::Memory(format!("file:s2jdbc-memory-{}?mode=memory&cache=shared", id)))
        } else {
            Ok(SqliteSource::File(PathBuf::from(database)))
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        match self {
            SqliteSource::File(path) => Connection::open(path),
            SqliteSource::Memory(uri) => Connection::open(uri),
        }
    }
}

#[derive(Debug)]
pub struct SqliteManager {
    source: SqliteSource,
    busy_timeout: Duration,
}

impl SqliteManager {
    pub fn new(source: SqliteSource, busy_timeout: Duration) -> Self {
        SqliteManager { source, busy_timeout }
    }

    pub fn source(&self) -> &SqliteSource {
        &self.source
    }
}

impl ManageConnection for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> std::result::Result<Connection, rusqlite::Error> {
        let conn = self.source.open()?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch("SELECT 1")
    }

    /// A connection handed back inside a transaction is not reused.
    fn has_broken(&self, conn: &mut Connection) -> bool {
        !conn.is_autocommit()
    }
}

pub fn init_sqlite_pool(cfg: &DataSourceConfig) -> Result<SqlitePool> {
    let source = SqliteSource::from_config(cfg)?;
    // an idle connection keeps a memory database alive
    let min_idle = match (&source, cfg.min_idle()) {
        (SqliteSource::Memory(_), Some(0)) => Some(1),
        (_, min_idle) => min_idle,
    };
    debug!("opening sqlite pool for {:?}", source);
    let pool = Pool::builder()
        .max_size(cfg.max_size())
        .min_idle(min_idle)
        .connection_timeout(cfg.connection_timeout())
        .build(SqliteManager::new(source, cfg.connection_timeout()))?;
    debug!("sqlite pool ready, {:?}", pool.state());
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_url() {
        let cfg = DataSourceConfig::new("sqlite:///tmp/app.db").unwrap();
        assert_eq!(SqliteSource::from_config(&cfg).unwrap(), SqliteSource::File(PathBuf::from("/tmp/app.db")));
        let cfg = DataSourceConfig::new("mysql://localhost/app").unwrap();
        assert!(SqliteSource::from_config(&cfg).is_err());
    }

    #[test]
    fn test_memory_sources_are_distinct() {
        let cfg = DataSourceConfig::new("sqlite::memory:").unwrap();
        let first = SqliteSource::from_config(&cfg).unwrap();
        let second = SqliteSource::from_config(&cfg).unwrap();
        assert!(matches!(first, SqliteSource::Memory(_)));
        assert_ne!(first, second);
    }

    #[test]
    fn test_memory_pool_shares_one_database() {
        let cfg = DataSourceConfig::new("sqlite::memory:").unwrap().set_max_size(2);
        let pool = init_sqlite_pool(&cfg).unwrap();
        let first = pool.get().unwrap();
        first.execute_batch("CREATE TABLE t (id integer); INSERT INTO t VALUES (1);").unwrap();
        let second = pool.get().unwrap();
        let count: i64 = second.query_row("SELECT count(*) FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_connection_inside_transaction_is_broken() {
        let manager = SqliteManager::new(SqliteSource::Memory("file:s2jdbc-broken?mode=memory&cache=shared".to_string()), Duration::from_secs(1));
        let mut conn = manager.connect().unwrap();
        assert!(!manager.has_broken(&mut conn));
        conn.execute_batch("BEGIN").unwrap();
        assert!(manager.has_broken(&mut conn));
    }
}
