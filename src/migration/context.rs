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
use crate::driver::blocking::{DataSource, DbExecutor};
use crate::errors::{Result, S2JdbcError};

/// State shared by the handlers of one phase: a connection, the halt
/// policy and the failures captured so far. The connection goes back to
/// its pool when the context is dropped.
pub struct SqlExecutionContext {
    conn: Box<dyn DbExecutor>,
    halt_on_error: bool,
    exceptions: Vec<S2JdbcError>,
}

impl SqlExecutionContext {

    pub fn new(data_source: &dyn DataSource, halt_on_error: bool) -> Result<Self> {
        let conn = data_source.acquire()?;
        Ok(SqlExecutionContext { conn, halt_on_error, exceptions: Vec::new() })
    }

    pub fn connection(&self) -> &dyn DbExecutor {
        self.conn.as_ref()
    }

    pub fn halt_on_error(&self) -> bool {
        self.halt_on_error
    }

    /// Hands the failure back when halting, otherwise records it so the
    /// caller can carry on.
    pub fn notify_exception(&mut self, err: S2JdbcError) -> Result<()> {
        if self.halt_on_error {
            return Err(err);
        }
        debug!("captured: {}", err);
        self.exceptions.push(err);
        Ok(())
    }

    pub fn exceptions(&self) -> &[S2JdbcError] {
        &self.exceptions
    }

    pub fn take_exceptions(&mut self) -> Vec<S2JdbcError> {
        std::mem::take(&mut self.exceptions)
    }
}

impl Drop for SqlExecutionContext {
    fn drop(&mut self) {
        debug!("releasing connection ({} failures captured)", self.exceptions.len());
    }
}

/// Runs `f` as one unit of work: begin, then commit on success or roll
/// back on failure.
pub fn run_in_transaction<T, F>(conn: &dyn DbExecutor, f: F) -> Result<T>
where
    F: FnOnce(&dyn DbExecutor) -> Result<T>,
{
    conn.start()?;
    match f(conn) {
        Ok(value) => {
            conn.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.rollback() {
                debug!("rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}
