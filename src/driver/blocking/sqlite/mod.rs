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
//! SQLite modules.
//!

mod connection;

pub use connection::*;

use bigdecimal::ToPrimitive;
use rusqlite::{params_from_iter, OptionalExtension, ToSql};
use s2jdbc_core::Value;
use tracing::trace;
use crate::driver::blocking::DbExecutor;
use crate::errors::Result;

pub struct Sqlite {
    conn: SqliteConnection,
}

impl Sqlite {
    pub fn new(conn: SqliteConnection) -> Self {
        Sqlite { conn }
    }
}

impl DbExecutor for Sqlite {
    fn start(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT TRANSACTION")?;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK TRANSACTION")?;
        }
        Ok(())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        trace!("sqlite execute: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.readonly() && stmt.column_count() > 0 {
            let mut rows = stmt.query(params_from_iter(convert_to_sqlite_params(params)))?;
            while rows.next()?.is_some() {}
            return Ok(0);
        }
        let affected_rows = stmt.execute(params_from_iter(convert_to_sqlite_params(params)))?;
        Ok(affected_rows as u64)
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        trace!("sqlite query: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_row(params_from_iter(convert_to_sqlite_params(params)), |row| row.get::<_, rusqlite::types::Value>(0))
            .optional()?;
        Ok(raw.map(convert_sqlite_value))
    }
}

fn convert_to_sqlite_params(params: &[Value]) -> Vec<Box<dyn ToSql>> {
    params.iter().cloned().map(convert_value_to_to_sql).collect()
}

fn convert_value_to_to_sql(value: Value) -> Box<dyn ToSql> {
    match value {
        Value::Text(v) => Box::new(v),
        Value::Bool(v) => Box::new(if v { 1i64 } else { 0i64 }),
        Value::Tinyint(v) => Box::new(i64::from(v)),
        Value::Smallint(v) => Box::new(i64::from(v)),
        Value::Int(v) => Box::new(i64::from(v)),
        Value::Bigint(v) => Box::new(v),
        Value::Float(v) => Box::new(f64::from(v)),
        Value::Double(v) => Box::new(v),
        Value::BigDecimal(ref v) => match v.to_f64() {
            Some(v) => Box::new(v),
            None => Box::new(v.to_string()),
        },
        Value::Blob(v) => Box::new(v),
        Value::Char(v) => Box::new(v.to_string()),
        Value::Date(v) => Box::new(v.format("%Y-%m-%d").to_string()),
        Value::DateTime(v) => Box::new(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::Time(v) => Box::new(v.format("%H:%M:%S").to_string()),
        Value::Null => Box::new(rusqlite::types::Null),
    }
}

fn convert_sqlite_value(value: rusqlite::types::Value) -> Value {
    match value {
        rusqlite::types::Value::Null => Value::Null,
        rusqlite::types::Value::Integer(i) => Value::Bigint(i),
        rusqlite::types::Value::Real(f) => Value::Double(f),
        rusqlite::types::Value::Text(text) => Value::Text(text),
        rusqlite::types::Value::Blob(bytes) => Value::Blob(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSourceConfig;

    fn memory_executor() -> Sqlite {
        let cfg = DataSourceConfig::new("sqlite::memory:").unwrap().set_max_size(1);
        let pool = init_sqlite_pool(&cfg).unwrap();
        Sqlite::new(pool.get().unwrap())
    }

    #[test]
    fn test_execute_and_query_one() {
        let db = memory_executor();
        db.execute("CREATE TABLE t (id integer, name text)", &[]).unwrap();
        assert_eq!(db.execute("INSERT INTO t (id, name) VALUES (?, ?)", &[Value::Int(1), Value::from("a")]).unwrap(), 1);
        let name = db.query_one("SELECT name FROM t WHERE id = ?", &[Value::Int(1)]).unwrap();
        assert_eq!(name, Some(Value::from("a")));
        assert_eq!(db.query_one("SELECT name FROM t WHERE id = ?", &[Value::Int(2)]).unwrap(), None);
    }

    #[test]
    fn test_rollback_discards_changes() {
        let db = memory_executor();
        db.execute("CREATE TABLE t (id integer)", &[]).unwrap();
        db.start().unwrap();
        db.execute("INSERT INTO t (id) VALUES (1)", &[]).unwrap();
        db.rollback().unwrap();
        let count = db.query_one("SELECT count(*) FROM t", &[]).unwrap();
        assert_eq!(count, Some(Value::Bigint(0)));
    }

    #[test]
    fn test_missing_table_message() {
        let db = memory_executor();
        let err = db.query_one("SELECT VERSION FROM SCHEMA_INFO", &[]).unwrap_err();
        assert!(crate::dialect::GenDialect::Sqlite.is_table_not_found(&err.to_string()));
    }
}
