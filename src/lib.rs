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

//! s2jdbc - where-clause builder and schema migration runner.
//!
//! Put the desired version of the crate into the `dependencies` section of your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! s2jdbc = "0.1.0"
//! ```
//!
//! ## Feature.
//!
//! * ```sqlite-sync``` - to migrate sqlite databases (default)
//!
//! ## Where builder.
//!
//! ```rust
//! use s2jdbc::prelude::*;
//!
//! let w = SimpleWhere::new()
//!     .eq("name", "Jack")
//!     .r#in("level", vec![1, 2])
//!     .starts("code", "A_");
//! assert_eq!(w.get_criteria(), "name = ? and level IN (?, ?) and code LIKE ? ESCAPE '$'");
//! assert_eq!(w.get_params().len(), 4);
//! ```
//!
//! ## Migration.
//!
//! Generated artifacts live under `<migrate_dir>/<version>/{create,drop}`.
//! Running a migration drops the current version with its `drop` files,
//! creates the target version with its `create` files, and records the
//! target version in the `SCHEMA_INFO` table.
//!
//! ```rust,no_run
//! use s2jdbc::prelude::*;
//!
//! fn main() -> s2jdbc::errors::Result<()> {
//!     let config = MigrateConfig::new()
//!         .set_classpath_dir("target/classes")
//!         .set_config_path("s2jdbc.json")
//!         .set_env("ut");
//!     MigrateCommand::from_config(config)?.execute()
//! }
//! ```

#![deny(clippy::all)]

pub mod errors;
pub mod config;
pub mod dialect;
pub mod driver;
pub mod pool;
pub mod desc;
pub mod meta;
pub mod migration;
pub mod prelude;

pub use s2jdbc_core::{
    values, ComplexWhere, ConditionType, ConditionValue, ConversionError, Criteria, SimpleWhere, Value, Where, WhereBuilder,
};
pub use config::{DataSourceConfig, MigrateConfig};
pub use dialect::GenDialect;
pub use errors::{Result, S2JdbcError};
pub use migration::MigrateCommand;
pub use pool::DbPool;
