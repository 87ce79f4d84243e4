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
//! Schema version tracking and version number formatting.
//!

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use s2jdbc_core::Value;
use tracing::{debug, warn};
use crate::dialect::GenDialect;
use crate::driver::blocking::{DataSource, DbExecutor};
use crate::errors::{Result, S2JdbcError};
use crate::migration::context::run_in_transaction;

/// Reads and records the version a database currently has.
pub trait SchemaVersion {
    fn get_version(&self) -> Result<u32>;

    fn set_version(&self, version: u32) -> Result<()>;
}

/// Reads the highest version the generated artifacts describe.
pub trait DdlVersion {
    fn get_version(&self) -> Result<u32>;
}

/// Keeps the schema version in a single-row table.
pub struct SchemaInfoTable {
    data_source: Arc<dyn DataSource>,
    dialect: GenDialect,
    full_table_name: String,
    column_name: String,
}

impl SchemaInfoTable {
    pub fn new<T: Into<String>, C: Into<String>>(data_source: Arc<dyn DataSource>, dialect: GenDialect, full_table_name: T, column_name: C) -> Self {
        SchemaInfoTable { data_source, dialect, full_table_name: full_table_name.into(), column_name: column_name.into() }
    }

    fn write_version(&self, conn: &dyn DbExecutor, version: u32) -> Result<()> {
        let delete_sql = format!("DELETE FROM {}", self.full_table_name);
        if let Err(err) = conn.execute(&delete_sql, &[]) {
            if !self.dialect.is_table_not_found(&err.to_string()) {
                return Err(err);
            }
            debug!("creating {}", self.full_table_name);
            let create_sql = format!("CREATE TABLE {} ({} {})", self.full_table_name, self.column_name, self.dialect.integer_type());
            conn.execute(&create_sql, &[])?;
        }
        let insert_sql = format!("INSERT INTO {} ({}) VALUES (?)", self.full_table_name, self.column_name);
        conn.execute(&insert_sql, &[Value::Bigint(i64::from(version))])?;
        Ok(())
    }
}

impl SchemaVersion for SchemaInfoTable {
    fn get_version(&self) -> Result<u32> {
        let conn = self.data_source.acquire()?;
        let sql = format!("SELECT {} FROM {}", self.column_name, self.full_table_name);
        match conn.query_one(&sql, &[]) {
            Ok(Some(value)) => value.as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| S2JdbcError::IllegalVersionValue(value.to_string())),
            Ok(None) => {
                warn!("{} has no rows, assuming version 0", self.full_table_name);
                Ok(0)
            }
            Err(err) if self.dialect.is_table_not_found(&err.to_string()) => {
                debug!("{} does not exist, assuming version 0", self.full_table_name);
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    fn set_version(&self, version: u32) -> Result<()> {
        let conn = self.data_source.acquire()?;
        run_in_transaction(conn.as_ref(), |conn| self.write_version(conn, version))
    }
}

/// The DDL version kept in a plain text file.
#[derive(Debug, Clone)]
pub struct DdlVersionFile {
    path: PathBuf,
}

impl DdlVersionFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        DdlVersionFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DdlVersion for DdlVersionFile {
    fn get_version(&self) -> Result<u32> {
        if !self.path.exists() {
            debug!("{} not found, assuming version 0", self.path.display());
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)?;
        to_version_int(&content)
    }
}

/// Rejects patterns made of anything but `0` and `#`.
pub fn validate_version_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() || !pattern.chars().all(|c| c == '0' || c == '#') {
        return Err(S2JdbcError::ConfigError(format!("illegal version number pattern: {}", pattern)));
    }
    Ok(())
}

/// Formats `version` with at least as many digits as the pattern has `0`s.
pub fn to_version_string(version: u32, pattern: &str) -> Result<String> {
    validate_version_pattern(pattern)?;
    let width = pattern.chars().filter(|c| *c == '0').count();
    Ok(format!("{:0width$}", version, width = width))
}

pub fn to_version_int(version: &str) -> Result<u32> {
    version.trim().parse::<u32>()
        .map_err(|_| S2JdbcError::IllegalVersionValue(version.trim().to_string()))
}
