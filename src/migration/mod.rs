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
//! Applies generated DDL and dump files to a database.
//! ```ignore
//! let config = MigrateConfig::new()
//!     .set_classpath_dir("target/classes")
//!     .set_config_path("s2jdbc.json");
//! MigrateCommand::from_config(config)?.execute()?;
//! ```
//!

mod context;
mod handler;
mod loader;
mod sql_file;
mod version;
#[cfg(test)]
mod mock;

pub use context::*;
pub use handler::*;
pub use loader::*;
pub use sql_file::*;
pub use version::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use once_cell::unsync::OnceCell;
use tracing::{debug, error, info};
use crate::config::{load_data_source_config, validate_encoding, MigrateConfig};
use crate::desc::{TableDesc, TableDescFactory};
use crate::dialect::GenDialect;
use crate::driver::blocking::DataSource;
use crate::errors::{Result, S2JdbcError};
use crate::meta::{EntityMetaReader, JsonEntityMetaReader};
use crate::pool::DbPool;

const LATEST_VERSION: &str = "latest";
const EXCLUDED_NAMES: [&str; 2] = ["CVS", "_svn"];

/// Migrates a database from its recorded schema version to the target
/// version: the drop files of the current version run first, then the
/// create files of the target version.
pub struct MigrateCommand {
    config: MigrateConfig,
    data_source: Arc<dyn DataSource>,
    dialect: GenDialect,
    sql_file_executor: SqlFileExecutor,
    schema_version: Box<dyn SchemaVersion>,
    ddl_version: Box<dyn DdlVersion>,
    entity_meta_reader: Box<dyn EntityMetaReader>,
    table_desc_factory: TableDescFactory,
    loader: Loader,
    table_descs: OnceCell<Arc<Vec<TableDesc>>>,
}

impl MigrateCommand {

    pub fn new(config: MigrateConfig, data_source: Arc<dyn DataSource>, dialect: GenDialect) -> Result<Self> {
        let classpath_dir = config.classpath_dir()
            .cloned()
            .ok_or_else(|| S2JdbcError::RequiredPropertyNull("classpath_dir".to_string()))?;
        validate_encoding(config.ddl_file_encoding())?;
        validate_encoding(config.dump_file_encoding())?;
        validate_version_pattern(config.version_no_pattern())?;
        info!("dialect: {}", dialect);

        let sql_file_executor = SqlFileExecutor::new(
            dialect,
            config.ddl_file_encoding(),
            config.statement_delimiter(),
            config.block_delimiter().map(ToString::to_string),
        )?;
        let schema_version = SchemaInfoTable::new(
            data_source.clone(),
            dialect,
            config.schema_info_full_table_name(),
            config.schema_info_column_name(),
        );
        let ddl_version = DdlVersionFile::new(config.ddl_version_file());
        let entity_meta_reader = JsonEntityMetaReader::new(
            &classpath_dir,
            config.root_package_name(),
            config.entity_package_name(),
            config.entity_name_pattern(),
            config.ignore_entity_name_pattern(),
        )?;
        let loader = Loader::new(config.dump_file_encoding())?;

        Ok(MigrateCommand {
            config,
            data_source,
            dialect,
            sql_file_executor,
            schema_version: Box::new(schema_version),
            ddl_version: Box::new(ddl_version),
            entity_meta_reader: Box::new(entity_meta_reader),
            table_desc_factory: TableDescFactory::new(),
            loader,
            table_descs: OnceCell::new(),
        })
    }

    /// Builds the command against the data source named by the config's
    /// `config_path`, `env` and `manager_name`.
    pub fn from_config(config: MigrateConfig) -> Result<Self> {
        let ds_config = load_data_source_config(config.config_path(), config.env(), config.manager_name())?;
        let dialect = ds_config.dialect();
        let pool = DbPool::new(ds_config)?;
        Self::new(config, Arc::new(pool), dialect)
    }

    pub fn with_sql_file_executor(mut self, sql_file_executor: SqlFileExecutor) -> Self {
        self.sql_file_executor = sql_file_executor;
        self
    }

    pub fn with_schema_version<S: SchemaVersion + 'static>(mut self, schema_version: S) -> Self {
        self.schema_version = Box::new(schema_version);
        self
    }

    pub fn with_ddl_version<D: DdlVersion + 'static>(mut self, ddl_version: D) -> Self {
        self.ddl_version = Box::new(ddl_version);
        self
    }

    pub fn with_entity_meta_reader<R: EntityMetaReader + 'static>(mut self, entity_meta_reader: R) -> Self {
        self.entity_meta_reader = Box::new(entity_meta_reader);
        self.table_descs = OnceCell::new();
        self
    }

    pub fn with_table_desc_factory(mut self, table_desc_factory: TableDescFactory) -> Self {
        self.table_desc_factory = table_desc_factory;
        self.table_descs = OnceCell::new();
        self
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &MigrateConfig {
        &self.config
    }

    pub fn dialect(&self) -> GenDialect {
        self.dialect
    }

    pub fn execute(&self) -> Result<()> {
        let from = self.schema_version.get_version()?;
        let to = if self.config.version().eq_ignore_ascii_case(LATEST_VERSION) {
            self.ddl_version.get_version()?
        } else {
            to_version_int(self.config.version())?
        };

        self.drop_schema(from)?;
        self.create_schema(to)?;
        self.schema_version.set_version(to)?;

        let pattern = self.config.version_no_pattern();
        info!("migrated schema from version {} to {}", to_version_string(from, pattern)?, to_version_string(to, pattern)?);
        Ok(())
    }

    fn version_dir(&self, version: u32, phase_dir_name: &str) -> Result<PathBuf> {
        let version_no = to_version_string(version, self.config.version_no_pattern())?;
        Ok(self.config.migrate_dir().join(version_no).join(phase_dir_name))
    }

    fn drop_schema(&self, version: u32) -> Result<()> {
        let dir = self.version_dir(version, self.config.drop_dir_name())?;
        self.handle_dir(&dir)
    }

    fn create_schema(&self, version: u32) -> Result<()> {
        let dir = self.version_dir(version, self.config.create_dir_name())?;
        self.handle_dir(&dir)
    }

    /// Runs every handler of `dir` inside one execution context.
    fn handle_dir(&self, dir: &Path) -> Result<()> {
        let handlers = self.create_file_handler_list(dir)?;
        if handlers.is_empty() {
            return Ok(());
        }
        let mut ctx = SqlExecutionContext::new(self.data_source.as_ref(), self.config.halt_on_error())?;
        for handler in &handlers {
            debug!("handling {}", handler.path().display());
            if let Err(err) = handler.handle(&mut ctx) {
                ctx.notify_exception(err)?;
            }
        }
        let exceptions = ctx.take_exceptions();
        for err in &exceptions {
            error!("{}", err);
        }
        match S2JdbcError::aggregate(exceptions) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Lists the handlers of `dir` in execution order. Entries are sorted by
    /// name and sub-directories are expanded where they sort.
    pub fn create_file_handler_list(&self, dir: &Path) -> Result<Vec<Box<dyn FileHandler>>> {
        let mut handlers: Vec<Box<dyn FileHandler>> = Vec::new();
        if !dir.is_dir() {
            debug!("{} not found", dir.display());
            return Ok(handlers);
        }
        self.collect_handlers(dir, &mut handlers)?;
        Ok(handlers)
    }

    fn collect_handlers(&self, dir: &Path, handlers: &mut Vec<Box<dyn FileHandler>>) -> Result<()> {
        let mut entries = fs::read_dir(dir)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        entries.retain(|entry| !is_excluded(&entry.file_name().to_string_lossy()));
        entries.sort_by_key(|entry| entry.file_name());
        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                self.collect_handlers(&path, handlers)?;
                continue;
            }
            let extension = path.extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            // extensions are matched as written: `EMP.SQL` is not run
            match extension.as_str() {
                "sql" | "ddl" => handlers.push(Box::new(SqlFileHandler::new(path, self.sql_file_executor.clone()))),
                "csv" => handlers.push(Box::new(DumpFileHandler::new(path, self.loader.clone(), self.get_table_descs()?))),
                _ => debug!("{} skipped", path.display()),
            }
        }
        Ok(())
    }

    /// Table descriptors of every entity plus their id tables, without
    /// duplicates. Computed once per command.
    pub fn get_table_descs(&self) -> Result<Arc<Vec<TableDesc>>> {
        self.table_descs.get_or_try_init(|| -> Result<Arc<Vec<TableDesc>>> {
            let mut table_descs: Vec<TableDesc> = Vec::new();
            for entity_meta in self.entity_meta_reader.read()? {
                let table_desc = self.table_desc_factory.get_table_desc(&entity_meta);
                let id_table_descs = table_desc.id_table_descs.clone();
                if !table_descs.contains(&table_desc) {
                    table_descs.push(table_desc);
                }
                for id_table_desc in id_table_descs {
                    if !table_descs.contains(&id_table_desc) {
                        table_descs.push(id_table_desc);
                    }
                }
            }
            Ok(Arc::new(table_descs))
        }).cloned()
    }
}

fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::*;
    use crate::meta::{EntityMeta, PropertyMeta, StaticEntityMetaReader};
    use tempfile::{tempdir, TempDir};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &TempDir) -> MigrateConfig {
        MigrateConfig::new()
            .set_classpath_dir(root.path().join("classes"))
            .set_migrate_dir(root.path().join("migrate"))
    }

    fn command(config: MigrateConfig, ds: &MockDataSource, from: u32, to: u32) -> (MigrateCommand, MockSchemaVersion) {
        let schema_version = MockSchemaVersion::new(from);
        let command = MigrateCommand::new(config, Arc::new(ds.clone()), GenDialect::Standard).unwrap()
            .with_schema_version(schema_version.clone())
            .with_ddl_version(FixedDdlVersion(to));
        (command, schema_version)
    }

    fn emp_entity() -> EntityMeta {
        let property = |name: &str, property_type: &str, id: bool| PropertyMeta {
            name: name.to_string(),
            column_name: None,
            property_type: property_type.to_string(),
            nullable: true,
            id,
            generation_type: None,
            id_table: None,
            transient: false,
        };
        EntityMeta {
            name: "Emp".to_string(),
            table_name: None,
            schema: None,
            catalog: None,
            properties: vec![property("id", "i64", true), property("empName", "String", false)],
        }
    }

    #[test]
    fn test_classpath_dir_is_required() {
        let result = MigrateCommand::new(MigrateConfig::new(), Arc::new(MockDataSource::new()), GenDialect::Standard);
        assert!(matches!(result, Err(S2JdbcError::RequiredPropertyNull(name)) if name == "classpath_dir"));
    }

    #[test]
    fn test_drop_then_create() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0003/drop/010-table/EMP.sql", "DROP TABLE EMP;");
        write(root.path(), "migrate/0003/create/010-table/EMP.sql", "CREATE TABLE OLD_EMP (ID bigint);");
        write(root.path(), "migrate/0004/create/010-table/EMP.sql", "CREATE TABLE EMP (ID bigint, EMP_NAME varchar(20));");
        write(root.path(), "migrate/0004/create/020-data/EMP.csv", "ID,EMP_NAME\n1,\"foo\"\n2,\n");
        write(root.path(), "migrate/0004/drop/010-table/EMP.sql", "DROP TABLE EMP_V4;");

        let ds = MockDataSource::new();
        let (command, schema_version) = command(config(&root), &ds, 3, 4);
        let command = command.with_entity_meta_reader(StaticEntityMetaReader(vec![emp_entity()]));
        command.execute().unwrap();

        assert_eq!(ds.statements(), vec![
            "DROP TABLE EMP",
            "CREATE TABLE EMP (ID bigint, EMP_NAME varchar(20))",
            "INSERT INTO EMP (ID, EMP_NAME) VALUES (?, ?) [1, 'foo']",
            "INSERT INTO EMP (ID, EMP_NAME) VALUES (?, ?) [2, null]",
        ]);
        assert_eq!(schema_version.recorded(), vec![4]);
        assert_eq!(ds.live_connections(), 0);
    }

    #[test]
    fn test_each_statement_is_its_own_transaction() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "CREATE TABLE A (ID int);\nCREATE TABLE B (ID int);");
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root), &ds, 0, 1);
        command.execute().unwrap();
        assert_eq!(ds.entries(), vec![
            "BEGIN", "CREATE TABLE A (ID int)", "COMMIT",
            "BEGIN", "CREATE TABLE B (ID int)", "COMMIT",
        ]);
    }

    #[test]
    fn test_missing_drop_dir_is_skipped() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "CREATE TABLE A (ID int);");
        let ds = MockDataSource::new();
        let (command, schema_version) = command(config(&root), &ds, 0, 1);
        command.execute().unwrap();
        assert_eq!(ds.statements(), vec!["CREATE TABLE A (ID int)"]);
        assert_eq!(schema_version.recorded(), vec![1]);
    }

    #[test]
    fn test_failures_are_aggregated_when_not_halting() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "CREATE TABLE BAD1 (ID int);\nCREATE TABLE BAD2 (ID int);\nCREATE TABLE GOOD (ID int);");
        let ds = MockDataSource::new().failing_on("BAD");
        let (command, schema_version) = command(config(&root), &ds, 0, 1);

        let err = command.execute().unwrap_err();
        assert!(matches!(err.primary(), S2JdbcError::SqlFailed { line: 1, .. }));
        assert_eq!(err.suppressed().len(), 1);
        assert!(matches!(&err.suppressed()[0], S2JdbcError::SqlFailed { line: 2, .. }));
        assert_eq!(ds.statements(), vec!["CREATE TABLE GOOD (ID int)"]);
        assert_eq!(ds.entries().iter().filter(|e| *e == "ROLLBACK").count(), 2);
        assert!(schema_version.recorded().is_empty());
        assert_eq!(ds.live_connections(), 0);
    }

    #[test]
    fn test_halt_on_error_stops_at_first_failure() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "CREATE TABLE BAD1 (ID int);\nCREATE TABLE GOOD (ID int);");
        write(root.path(), "migrate/0001/create/b.sql", "CREATE TABLE OTHER (ID int);");
        let ds = MockDataSource::new().failing_on("BAD");
        let (command, _) = command(config(&root).set_halt_on_error(true), &ds, 0, 1);

        let err = command.execute().unwrap_err();
        assert!(matches!(err, S2JdbcError::SqlFailed { line: 1, .. }));
        assert!(ds.statements().is_empty());
        assert_eq!(ds.live_connections(), 0);
    }

    #[test]
    fn test_directories_expand_in_sorted_position() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "SELECT 'a';");
        write(root.path(), "migrate/0001/create/b/y.sql", "SELECT 'b/y';");
        write(root.path(), "migrate/0001/create/b/x.ddl", "SELECT 'b/x';");
        write(root.path(), "migrate/0001/create/c.sql", "SELECT 'c';");
        write(root.path(), "migrate/0001/create/.hidden.sql", "SELECT 'hidden';");
        write(root.path(), "migrate/0001/create/CVS/d.sql", "SELECT 'cvs';");
        write(root.path(), "migrate/0001/create/readme.txt", "not sql");
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root), &ds, 0, 1);
        command.execute().unwrap();
        assert_eq!(ds.statements(), vec!["SELECT 'a'", "SELECT 'b/x'", "SELECT 'b/y'", "SELECT 'c'"]);
    }

    #[test]
    fn test_extensions_are_case_sensitive() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/a.sql", "SELECT 'a';");
        write(root.path(), "migrate/0001/create/b.SQL", "SELECT 'b';");
        write(root.path(), "migrate/0001/create/c.Ddl", "SELECT 'c';");
        write(root.path(), "migrate/0001/create/EMP.CSV", "ID\n1\n");
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root), &ds, 0, 1);
        assert_eq!(command.create_file_handler_list(&root.path().join("migrate/0001/create")).unwrap().len(), 1);
        command.execute().unwrap();
        assert_eq!(ds.statements(), vec!["SELECT 'a'"]);
    }

    #[test]
    fn test_explicit_version() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0002/create/a.sql", "SELECT 2;");
        write(root.path(), "migrate/0009/create/a.sql", "SELECT 9;");
        let ds = MockDataSource::new();
        let (command, schema_version) = command(config(&root).set_version("2"), &ds, 0, 9);
        command.execute().unwrap();
        assert_eq!(ds.statements(), vec!["SELECT 2"]);
        assert_eq!(schema_version.recorded(), vec![2]);
    }

    #[test]
    fn test_illegal_version() {
        let root = tempdir().unwrap();
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root).set_version("v2"), &ds, 0, 9);
        assert!(matches!(command.execute(), Err(S2JdbcError::IllegalVersionValue(v)) if v == "v2"));
    }

    #[test]
    fn test_unknown_dump_table_is_reported() {
        let root = tempdir().unwrap();
        write(root.path(), "migrate/0001/create/DEPT.csv", "ID\n1\n");
        write(root.path(), "migrate/0001/create/z.sql", "SELECT 1;");
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root), &ds, 0, 1);
        let command = command.with_entity_meta_reader(StaticEntityMetaReader(vec![emp_entity()]));
        let err = command.execute().unwrap_err();
        assert!(matches!(err.primary(), S2JdbcError::TableDescNotFound { table_name, .. } if table_name == "DEPT"));
        assert_eq!(ds.statements(), vec!["SELECT 1"]);
    }

    #[test]
    fn test_table_descs_are_deduplicated() {
        let root = tempdir().unwrap();
        let ds = MockDataSource::new();
        let (command, _) = command(config(&root), &ds, 0, 0);
        let mut with_table_id = emp_entity();
        with_table_id.name = "Dept".to_string();
        with_table_id.properties[0].generation_type = Some(crate::meta::GenerationType::Table);
        let mut other = with_table_id.clone();
        other.name = "Address".to_string();
        let command = command.with_entity_meta_reader(StaticEntityMetaReader(vec![emp_entity(), with_table_id, other, emp_entity()]));
        let names: Vec<String> = command.get_table_descs().unwrap().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["EMP", "DEPT", "ID_GENERATOR", "ADDRESS"]);
    }
}
