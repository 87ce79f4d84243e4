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

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use encoding_rs::Encoding;
use serde::Deserialize;
use url::Url;
use crate::dialect::GenDialect;
use crate::driver::DriverType;
use crate::errors::{Result, S2JdbcError};

/// Connection settings of one named data source.
#[derive(Clone, Debug)]
pub struct DataSourceConfig {
    connection_timeout: Duration,
    min_idle: Option<u32>,
    max_size: u32,
    platform: DriverType,
    url: Option<String>,
    dialect: Option<GenDialect>,
    database: Option<String>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        DataSourceConfig {
            max_size: 4,
            platform: DriverType::Unsupported,
            url: None,
            dialect: None,
            database: None,
            connection_timeout: Duration::from_secs(6),
            min_idle: None,
        }
    }
}

impl DataSourceConfig {

    pub fn new(url: &str) -> Result<Self> {
        DataSourceConfig::default().set_url(url)
    }

    /// parse the url into platform and database
    fn parse_url(mut self) -> Result<Self> {
        let raw = self.url.to_owned().unwrap_or_default();
        let url = Url::parse(&raw)?;
        let scheme = url.scheme();
        match scheme {
            "sqlite" => {
                let host = url.host_str().unwrap_or_default();
                let path = url.path();
                let path = if path == "/" { "" } else { path };
                self.database = Some(format!("{}{}", host, path));
                self.platform = DriverType::Sqlite;
            }
            _ => {
                self.platform = DriverType::Unsupported;
            }
        }
        if self.dialect.is_none() {
            self.dialect = GenDialect::from_scheme(scheme);
        }
        Ok(self)
    }

    pub fn set_url<S: Into<String>>(mut self, url: S) -> Result<Self> {
        self.url = Some(url.into());
        self.parse_url()
    }

    pub fn url(&self) -> Option<&String> {
        self.url.as_ref()
    }

    pub fn get_platform(&self) -> Result<DriverType> {
        match self.platform {
            DriverType::Unsupported => {
                let scheme = self.url.as_ref()
                    .and_then(|url| url.split(':').next())
                    .unwrap_or_default();
                Err(S2JdbcError::UnknownDatabase(scheme.to_string()))
            }
            ref platform => Ok(platform.clone()),
        }
    }

    /// The database file (or `:memory:`) the url points at.
    pub fn get_connection_string(&self) -> Result<String> {
        self.database.clone().ok_or_else(|| S2JdbcError::RequiredPropertyNull("url".to_string()))
    }

    pub fn set_dialect(mut self, dialect: GenDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn dialect(&self) -> GenDialect {
        self.dialect.unwrap_or_default()
    }

    pub fn set_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn set_connection_timeout(mut self, connection_timeout: Duration) -> Self {
        self.connection_timeout = connection_timeout;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn set_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn min_idle(&self) -> Option<u32> {
        self.min_idle
    }
}

#[derive(Debug, Deserialize)]
struct DataSourceEntry {
    url: String,
    dialect: Option<String>,
    max_size: Option<u32>,
    connection_timeout: Option<u64>,
}

/// Loads the data source named `manager_name` under `env` from a JSON
/// document shaped `{ env: { manager: { url, dialect, max_size, connection_timeout } } }`.
pub fn load_data_source_config<P: AsRef<Path>>(path: P, env: &str, manager_name: &str) -> Result<DataSourceConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| S2JdbcError::ConfigError(format!("{}: {}", path.display(), e)))?;
    let mut envs: HashMap<String, HashMap<String, DataSourceEntry>> = serde_json::from_str(&content)?;
    let entry = envs.get_mut(env)
        .and_then(|managers| managers.remove(manager_name))
        .ok_or_else(|| S2JdbcError::ConfigError(format!("no data source '{}' for env '{}' in {}", manager_name, env, path.display())))?;
    let mut cfg = DataSourceConfig::default();
    if let Some(dialect) = entry.dialect {
        cfg = cfg.set_dialect(dialect.parse()?);
    }
    if let Some(max_size) = entry.max_size {
        cfg = cfg.set_max_size(max_size);
    }
    if let Some(timeout) = entry.connection_timeout {
        cfg = cfg.set_connection_timeout(Duration::from_secs(timeout));
    }
    cfg.set_url(entry.url)
}

/// Options of a migration run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    classpath_dir: Option<PathBuf>,
    root_package_name: String,
    entity_package_name: String,
    entity_name_pattern: String,
    ignore_entity_name_pattern: String,
    statement_delimiter: char,
    block_delimiter: Option<String>,
    config_path: PathBuf,
    manager_name: String,
    env: String,
    halt_on_error: bool,
    schema_info_full_table_name: String,
    schema_info_column_name: String,
    ddl_file_encoding: String,
    migrate_dir: PathBuf,
    version_no_pattern: String,
    ddl_version_file: PathBuf,
    version: String,
    create_dir_name: String,
    drop_dir_name: String,
    dump_file_encoding: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        MigrateConfig {
            classpath_dir: None,
            root_package_name: String::new(),
            entity_package_name: "entity".to_string(),
            entity_name_pattern: ".*".to_string(),
            ignore_entity_name_pattern: String::new(),
            statement_delimiter: ';',
            block_delimiter: None,
            config_path: PathBuf::from("s2jdbc.json"),
            manager_name: "jdbcManager".to_string(),
            env: "ut".to_string(),
            halt_on_error: false,
            schema_info_full_table_name: "SCHEMA_INFO".to_string(),
            schema_info_column_name: "VERSION".to_string(),
            ddl_file_encoding: "UTF-8".to_string(),
            migrate_dir: PathBuf::from("db/migrate"),
            version_no_pattern: "0000".to_string(),
            ddl_version_file: PathBuf::from("db/ddl-version.txt"),
            version: "latest".to_string(),
            create_dir_name: "create".to_string(),
            drop_dir_name: "drop".to_string(),
            dump_file_encoding: "UTF-8".to_string(),
        }
    }
}

impl MigrateConfig {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| S2JdbcError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn set_classpath_dir<P: Into<PathBuf>>(mut self, classpath_dir: P) -> Self {
        self.classpath_dir = Some(classpath_dir.into());
        self
    }

    pub fn classpath_dir(&self) -> Option<&PathBuf> {
        self.classpath_dir.as_ref()
    }

    pub fn set_root_package_name<S: Into<String>>(mut self, root_package_name: S) -> Self {
        self.root_package_name = root_package_name.into();
        self
    }

    pub fn root_package_name(&self) -> &str {
        &self.root_package_name
    }

    pub fn set_entity_package_name<S: Into<String>>(mut self, entity_package_name: S) -> Self {
        self.entity_package_name = entity_package_name.into();
        self
    }

    pub fn entity_package_name(&self) -> &str {
        &self.entity_package_name
    }

    pub fn set_entity_name_pattern<S: Into<String>>(mut self, entity_name_pattern: S) -> Self {
        self.entity_name_pattern = entity_name_pattern.into();
        self
    }

    pub fn entity_name_pattern(&self) -> &str {
        &self.entity_name_pattern
    }

    pub fn set_ignore_entity_name_pattern<S: Into<String>>(mut self, ignore_entity_name_pattern: S) -> Self {
        self.ignore_entity_name_pattern = ignore_entity_name_pattern.into();
        self
    }

    pub fn ignore_entity_name_pattern(&self) -> &str {
        &self.ignore_entity_name_pattern
    }

    pub fn set_statement_delimiter(mut self, statement_delimiter: char) -> Self {
        self.statement_delimiter = statement_delimiter;
        self
    }

    pub fn statement_delimiter(&self) -> char {
        self.statement_delimiter
    }

    pub fn set_block_delimiter<S: Into<String>>(mut self, block_delimiter: Option<S>) -> Self {
        self.block_delimiter = block_delimiter.map(Into::into);
        self
    }

    pub fn block_delimiter(&self) -> Option<&str> {
        self.block_delimiter.as_deref()
    }

    pub fn set_config_path<P: Into<PathBuf>>(mut self, config_path: P) -> Self {
        self.config_path = config_path.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn set_manager_name<S: Into<String>>(mut self, manager_name: S) -> Self {
        self.manager_name = manager_name.into();
        self
    }

    pub fn manager_name(&self) -> &str {
        &self.manager_name
    }

    pub fn set_env<S: Into<String>>(mut self, env: S) -> Self {
        self.env = env.into();
        self
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn set_halt_on_error(mut self, halt_on_error: bool) -> Self {
        self.halt_on_error = halt_on_error;
        self
    }

    pub fn halt_on_error(&self) -> bool {
        self.halt_on_error
    }

    pub fn set_schema_info_full_table_name<S: Into<String>>(mut self, table_name: S) -> Self {
        self.schema_info_full_table_name = table_name.into();
        self
    }

    pub fn schema_info_full_table_name(&self) -> &str {
        &self.schema_info_full_table_name
    }

    pub fn set_schema_info_column_name<S: Into<String>>(mut self, column_name: S) -> Self {
        self.schema_info_column_name = column_name.into();
        self
    }

    pub fn schema_info_column_name(&self) -> &str {
        &self.schema_info_column_name
    }

    pub fn set_ddl_file_encoding<S: Into<String>>(mut self, encoding: S) -> Self {
        self.ddl_file_encoding = encoding.into();
        self
    }

    pub fn ddl_file_encoding(&self) -> &str {
        &self.ddl_file_encoding
    }

    pub fn set_migrate_dir<P: Into<PathBuf>>(mut self, migrate_dir: P) -> Self {
        self.migrate_dir = migrate_dir.into();
        self
    }

    pub fn migrate_dir(&self) -> &Path {
        &self.migrate_dir
    }

    pub fn set_version_no_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.version_no_pattern = pattern.into();
        self
    }

    pub fn version_no_pattern(&self) -> &str {
        &self.version_no_pattern
    }

    pub fn set_ddl_version_file<P: Into<PathBuf>>(mut self, ddl_version_file: P) -> Self {
        self.ddl_version_file = ddl_version_file.into();
        self
    }

    pub fn ddl_version_file(&self) -> &Path {
        &self.ddl_version_file
    }

    pub fn set_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_create_dir_name<S: Into<String>>(mut self, create_dir_name: S) -> Self {
        self.create_dir_name = create_dir_name.into();
        self
    }

    pub fn create_dir_name(&self) -> &str {
        &self.create_dir_name
    }

    pub fn set_drop_dir_name<S: Into<String>>(mut self, drop_dir_name: S) -> Self {
        self.drop_dir_name = drop_dir_name.into();
        self
    }

    pub fn drop_dir_name(&self) -> &str {
        &self.drop_dir_name
    }

    pub fn set_dump_file_encoding<S: Into<String>>(mut self, encoding: S) -> Self {
        self.dump_file_encoding = encoding.into();
        self
    }

    pub fn dump_file_encoding(&self) -> &str {
        &self.dump_file_encoding
    }
}

/// Resolves a charset label such as `UTF-8`, `Windows-31J` or `EUC-JP`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| S2JdbcError::UnsupportedEncoding(label.to_string()))
}

pub fn validate_encoding(label: &str) -> Result<()> {
    resolve_encoding(label).map(|_| ())
}

/// Reads a text file written in `encoding`. A byte order mark wins over
/// the given encoding.
pub fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(S2JdbcError::IoError(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is not valid {}", path.display(), used.name()),
        )));
    }
    Ok(text.into_owned())
}
