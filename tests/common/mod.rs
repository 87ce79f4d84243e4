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
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project layout with a sqlite database and a data-source file.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace { dir: tempfile::tempdir().unwrap() }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn database(&self) -> PathBuf {
        self.root().join("app.db")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_encoded(&self, relative: &str, content: &str, encoding: &'static encoding_rs::Encoding) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let (bytes, _, _) = encoding.encode(content);
        fs::write(&path, &bytes).unwrap();
        path
    }

    /// Writes `s2jdbc.json` pointing the `ut` env at the workspace database.
    pub fn write_data_source(&self) -> PathBuf {
        let content = format!(
            r#"{{ "ut": {{ "jdbcManager": {{ "url": "sqlite://{}", "max_size": 2, "connection_timeout": 5 }} }} }}"#,
            self.database().display()
        );
        self.write("s2jdbc.json", &content)
    }

    pub fn write_entity(&self, file: &str, content: &str) -> PathBuf {
        self.write(&format!("classes/com/example/entity/{}", file), content)
    }

    pub fn connection(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(self.database()).unwrap()
    }
}
