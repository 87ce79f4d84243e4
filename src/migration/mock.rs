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

//! Recording doubles for the migration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use s2jdbc_core::Value;
use crate::driver::blocking::{DataSource, DbExecutor};
use crate::errors::{Result, S2JdbcError};
use crate::migration::version::{DdlVersion, SchemaVersion};

const TX_ENTRIES: [&str; 3] = ["BEGIN", "COMMIT", "ROLLBACK"];

#[derive(Clone, Default)]
pub struct MockDataSource {
    log: Arc<Mutex<Vec<String>>>,
    fail_on: Vec<String>,
    live: Arc<AtomicUsize>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements containing `fragment` fail.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.entries().into_iter().filter(|e| !TX_ENTRIES.contains(&e.as_str())).collect()
    }

    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl DataSource for MockDataSource {
    fn acquire(&self) -> Result<Box<dyn DbExecutor>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockExecutor { source: self.clone() }))
    }
}

struct MockExecutor {
    source: MockDataSource,
}

impl MockExecutor {
    fn record(&self, entry: &str) {
        self.source.log.lock().unwrap().push(entry.to_string());
    }
}

impl Drop for MockExecutor {
    fn drop(&mut self) {
        self.source.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DbExecutor for MockExecutor {
    fn start(&self) -> Result<()> {
        self.record("BEGIN");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.record("COMMIT");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK");
        Ok(())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        if self.source.fail_on.iter().any(|f| sql.contains(f.as_str())) {
            return Err(S2JdbcError::DatabaseError(format!("rejected: {}", sql)));
        }
        if params.is_empty() {
            self.record(sql);
        } else {
            let params = params.iter().map(ToString::to_string).collect::<Vec<String>>().join(", ");
            self.record(&format!("{} [{}]", sql, params));
        }
        Ok(1)
    }

    fn query_one(&self, _sql: &str, _params: &[Value]) -> Result<Option<Value>> {
        Ok(None)
    }
}

#[derive(Clone, Default)]
pub struct MockSchemaVersion {
    from: u32,
    recorded: Arc<Mutex<Vec<u32>>>,
}

impl MockSchemaVersion {
    pub fn new(from: u32) -> Self {
        MockSchemaVersion { from, recorded: Arc::default() }
    }

    pub fn recorded(&self) -> Vec<u32> {
        self.recorded.lock().unwrap().clone()
    }
}

impl SchemaVersion for MockSchemaVersion {
    fn get_version(&self) -> Result<u32> {
        Ok(self.from)
    }

    fn set_version(&self, version: u32) -> Result<()> {
        self.recorded.lock().unwrap().push(version);
        Ok(())
    }
}

pub struct FixedDdlVersion(pub u32);

impl DdlVersion for FixedDdlVersion {
    fn get_version(&self) -> Result<u32> {
        Ok(self.0)
    }
}
