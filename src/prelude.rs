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

pub use s2jdbc_core::{
    values, ComplexWhere, ConditionType, ConditionValue, Criteria, SimpleWhere, Value, Where, WhereBuilder,
};
pub use crate::config::{load_data_source_config, DataSourceConfig, MigrateConfig};
pub use crate::desc::{ColumnDesc, SqlType, TableDesc, TableDescFactory};
pub use crate::dialect::GenDialect;
pub use crate::driver::blocking::{DataSource, DbExecutor};
pub use crate::errors::{Result, S2JdbcError};
pub use crate::meta::{EntityMeta, EntityMetaReader, JsonEntityMetaReader, PropertyMeta, StaticEntityMetaReader};
pub use crate::migration::{
    DdlVersion, DdlVersionFile, FileHandler, Loader, MigrateCommand, SchemaInfoTable, SchemaVersion, SqlExecutionContext,
    SqlFileExecutor,
};
pub use crate::pool::DbPool;
