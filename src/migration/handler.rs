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

use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::desc::TableDesc;
use crate::errors::Result;
use crate::migration::context::SqlExecutionContext;
use crate::migration::loader::Loader;
use crate::migration::sql_file::SqlFileExecutor;

/// Applies one migration artifact within a phase.
pub trait FileHandler {
    fn path(&self) -> &Path;

    fn handle(&self, ctx: &mut SqlExecutionContext) -> Result<()>;
}

pub struct SqlFileHandler {
    path: PathBuf,
    executor: SqlFileExecutor,
}

impl SqlFileHandler {
    pub fn new(path: PathBuf, executor: SqlFileExecutor) -> Self {
        SqlFileHandler { path, executor }
    }
}

impl FileHandler for SqlFileHandler {
    fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self, ctx: &mut SqlExecutionContext) -> Result<()> {
        self.executor.execute(ctx, &self.path)
    }
}

pub struct DumpFileHandler {
    path: PathBuf,
    loader: Loader,
    table_descs: Arc<Vec<TableDesc>>,
}

impl DumpFileHandler {
    pub fn new(path: PathBuf, loader: Loader, table_descs: Arc<Vec<TableDesc>>) -> Self {
        DumpFileHandler { path, loader, table_descs }
    }
}

impl FileHandler for DumpFileHandler {
    fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self, ctx: &mut SqlExecutionContext) -> Result<()> {
        self.loader.load(ctx, &self.path, &self.table_descs)
    }
}
