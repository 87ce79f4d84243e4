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

use tracing::debug;
use crate::config::DataSourceConfig;
use crate::dialect::GenDialect;
use crate::driver::blocking::{DataSource, DbExecutor};
use crate::driver::DriverType;
use crate::errors::{Result, S2JdbcError};

#[cfg(feature = "sqlite-sync")]
use crate::driver::blocking::{DbDriver, sqlite::{self, Sqlite, SqlitePool, SqliteConnection}};

/// Connection pool state
#[derive(Debug, Clone)]
pub struct PoolStatus {
    pub size: usize,
    pub available: usize,
}

#[derive(Clone)]
pub enum DBPool {
    #[cfg(feature = "sqlite-sync")]
    SqlitePool(SqlitePool),
}

pub enum PooledConnection {
    #[cfg(feature = "sqlite-sync")]
    PooledSqlite(SqliteConnection),
}

impl DBPool {
    /// get a usable database connection from
    pub fn acquire(&self) -> Result<PooledConnection> {
        match self {
            #[cfg(feature = "sqlite-sync")]
            DBPool::SqlitePool(ref pool_sqlite) => {
                let pooled_conn = pool_sqlite.get()?;
                Ok(PooledConnection::PooledSqlite(pooled_conn))
            }
            #[cfg(not(feature = "sqlite-sync"))]
            _ => Err(S2JdbcError::DatabaseError("no database driver enabled".to_string())),
        }
    }

    pub fn status(&self) -> PoolStatus {
        match self {
            #[cfg(feature = "sqlite-sync")]
            DBPool::SqlitePool(pool) => {
                let state = pool.state();
                PoolStatus { size: state.connections as usize, available: state.idle_connections as usize }
            }
            #[cfg(not(feature = "sqlite-sync"))]
            _ => PoolStatus { size: 0, available: 0 },
        }
    }
}

/// The pooled data source handed to the migration runner.
#[derive(Clone)]
pub struct DbPool {
    inner: DBPool,
    cfg: DataSourceConfig,
}

impl DbPool {
    pub fn new(cfg: DataSourceConfig) -> Result<Self> {
        let driver_type = cfg.get_platform()?;
        match driver_type {
            #[cfg(feature = "sqlite-sync")]
            DriverType::Sqlite => {
                let pool_sqlite = sqlite::init_sqlite_pool(&cfg)?;
                Ok(DbPool { inner: DBPool::SqlitePool(pool_sqlite), cfg })
            }
            _ => Err(S2JdbcError::UnknownDatabase(format!("{:?}", driver_type))),
        }
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.cfg
    }

    pub fn dialect(&self) -> GenDialect {
        self.cfg.dialect()
    }

    pub fn status(&self) -> PoolStatus {
        self.inner.status()
    }
}

impl DataSource for DbPool {
    fn acquire(&self) -> Result<Box<dyn DbExecutor>> {
        let conn = self.inner.acquire()?;
        debug!("acquired connection, pool status: {:?}", self.inner.status());
        match conn {
            #[cfg(feature = "sqlite-sync")]
            PooledConnection::PooledSqlite(pooled_sqlite) => {
                Ok(Box::new(DbDriver::SqliteDriver(Box::new(Sqlite::new(pooled_sqlite)))))
            }
            #[cfg(not(feature = "sqlite-sync"))]
            _ => Err(S2JdbcError::DatabaseError("no database driver enabled".to_string())),
        }
    }
}
