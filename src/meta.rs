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
//! Entity metadata and the readers that discover it.
//!

use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use crate::errors::{Result, S2JdbcError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationType {
    Auto,
    Identity,
    Sequence,
    Table,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyMeta {
    pub name: String,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default = "default_property_type")]
    pub property_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub id: bool,
    #[serde(default)]
    pub generation_type: Option<GenerationType>,
    /// Table backing a TABLE generated id.
    #[serde(default)]
    pub id_table: Option<String>,
    #[serde(default)]
    pub transient: bool,
}

fn default_property_type() -> String {
    "String".to_string()
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityMeta {
    pub name: String,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyMeta>,
}

pub trait EntityMetaReader {
    fn read(&self) -> Result<Vec<EntityMeta>>;
}

/// Reads one `EntityMeta` per `*.json` file below a package directory.
#[derive(Debug, Clone)]
pub struct JsonEntityMetaReader {
    base_dir: PathBuf,
    entity_name_pattern: Regex,
    ignore_entity_name_pattern: Option<Regex>,
}

impl JsonEntityMetaReader {

    /// `root_package_name` and `entity_package_name` are dotted and resolved
    /// below `classpath_dir`.
    pub fn new<P: AsRef<Path>>(
        classpath_dir: P,
        root_package_name: &str,
        entity_package_name: &str,
        entity_name_pattern: &str,
        ignore_entity_name_pattern: &str,
    ) -> Result<Self> {
        let mut base_dir = classpath_dir.as_ref().to_path_buf();
        for segment in root_package_name.split('.').chain(entity_package_name.split('.')) {
            if !segment.is_empty() {
                base_dir.push(segment);
            }
        }
        let ignore_entity_name_pattern = if ignore_entity_name_pattern.is_empty() {
            None
        } else {
            Some(full_match(ignore_entity_name_pattern)?)
        };
        Ok(JsonEntityMetaReader {
            base_dir,
            entity_name_pattern: full_match(entity_name_pattern)?,
            ignore_entity_name_pattern,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn is_target(&self, name: &str) -> bool {
        self.entity_name_pattern.is_match(name)
            && !self.ignore_entity_name_pattern.as_ref().map(|p| p.is_match(name)).unwrap_or(false)
    }

    fn collect(&self, dir: &Path, metas: &mut Vec<EntityMeta>) -> Result<()> {
        let mut entries = fs::read_dir(dir)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                self.collect(&path, metas)?;
            } else if path.extension().map(|e| e == "json").unwrap_or(false) {
                let content = fs::read_to_string(&path)?;
                let meta: EntityMeta = serde_json::from_str(&content)
                    .map_err(|e| S2JdbcError::ConfigError(format!("{}: {}", path.display(), e)))?;
                if self.is_target(&meta.name) {
                    metas.push(meta);
                } else {
                    debug!("entity {} skipped by name pattern", meta.name);
                }
            }
        }
        Ok(())
    }
}

impl EntityMetaReader for JsonEntityMetaReader {
    fn read(&self) -> Result<Vec<EntityMeta>> {
        let mut metas = Vec::new();
        if !self.base_dir.is_dir() {
            debug!("entity directory {} not found", self.base_dir.display());
            return Ok(metas);
        }
        self.collect(&self.base_dir, &mut metas)?;
        Ok(metas)
    }
}

/// Hands out a fixed list of entities.
#[derive(Debug, Clone, Default)]
pub struct StaticEntityMetaReader(pub Vec<EntityMeta>);

impl EntityMetaReader for StaticEntityMetaReader {
    fn read(&self) -> Result<Vec<EntityMeta>> {
        Ok(self.0.clone())
    }
}

fn full_match(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{})$", pattern))?)
}
