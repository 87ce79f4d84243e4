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

#[cfg(feature = "sqlite-sync")]
use std::ops::Deref;
use s2jdbc_core::Value;
use crate::errors::Result;

#[cfg(feature = "sqlite-sync")]
pub mod sqlite;
#[cfg(feature = "sqlite-sync")]
use crate::driver::blocking::sqlite::Sqlite;

/// A single database connection.
pub trait DbExecutor {
    fn start(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Runs a query and returns the first column of its first row.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Value>>;
}

/// Hands out connections.
pub trait DataSource {
    fn acquire(&self) -> Result<Box<dyn DbExecutor>>;
}

pub enum DbDriver {
    #[cfg(feature = "sqlite-sync")]
    SqliteDriver(Box<Sqlite>),
}

#[cfg(feature = "sqlite-sync")]
impl Deref for DbDriver {
    type Target = dyn DbExecutor;

    fn deref(&self) -> &Self::Target {
        match *self {
            DbDriver::SqliteDriver(ref sqlite) => sqlite.deref(),
        }
    }
}

#[cfg(feature = "sqlite-sync")]
impl DbExecutor for DbDriver {
    fn start(&self) -> Result<()> {
        self.deref().start()
    }

    fn commit(&self) -> Result<()> {
        self.deref().commit()
    }

    fn rollback(&self) -> Result<()> {
        self.deref().rollback()
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.deref().execute(sql, params)
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        self.deref().query_one(sql, params)
    }
}
