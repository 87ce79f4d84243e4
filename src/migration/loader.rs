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
//! Loads CSV dump files into their tables.
//!

use std::path::Path;
use s2jdbc_core::Value;
use tracing::debug;
use encoding_rs::Encoding;
use crate::config::{read_text, resolve_encoding};
use crate::desc::{ColumnDesc, TableDesc};
use crate::errors::{Result, S2JdbcError};
use crate::migration::context::{run_in_transaction, SqlExecutionContext};

const FIELD_DELIMITER: char = ',';
const QUOTE: char = '"';

/// One CSV record; `None` marks an unquoted empty field.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpRecord {
    pub line: usize,
    pub fields: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct Loader {
    encoding: &'static Encoding,
}

impl Loader {

    pub fn new<S: Into<String>>(encoding: S) -> Result<Self> {
        let encoding = resolve_encoding(&encoding.into())?;
        Ok(Loader { encoding })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Inserts every record of `path` into the table its file stem names.
    pub fn load(&self, ctx: &mut SqlExecutionContext, path: &Path, table_descs: &[TableDesc]) -> Result<()> {
        let table_name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let table_desc = table_descs.iter()
            .find(|desc| desc.matches(&table_name))
            .ok_or_else(|| S2JdbcError::TableDescNotFound { file: path.to_path_buf(), table_name: table_name.clone() })?;

        let content = read_text(path, self.encoding)?;
        let mut records = parse_csv(&content).into_iter();
        let header = match records.next() {
            Some(header) => header,
            None => {
                debug!("{} is empty", path.display());
                return Ok(());
            }
        };
        let columns = header.fields.iter()
            .map(|name| {
                let name = name.as_deref().unwrap_or_default();
                table_desc.column(name).ok_or_else(|| S2JdbcError::LoadFailed {
                    file: path.to_path_buf(),
                    line: header.line,
                    message: format!("column '{}' not found in {}", name, table_desc.full_name()),
                })
            })
            .collect::<Result<Vec<&ColumnDesc>>>()?;
        let sql = insert_sql(table_desc, &columns);

        for record in records {
            let result = bind_values(path, &columns, &record).and_then(|params| {
                run_in_transaction(ctx.connection(), |conn| conn.execute(&sql, &params))
                    .map_err(|e| S2JdbcError::LoadFailed { file: path.to_path_buf(), line: record.line, message: e.to_string() })
            });
            if let Err(err) = result {
                ctx.notify_exception(err)?;
            }
        }
        Ok(())
    }
}

fn insert_sql(table_desc: &TableDesc, columns: &[&ColumnDesc]) -> String {
    let names = columns.iter().map(|c| c.name.as_str()).collect::<Vec<&str>>().join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO {} ({}) VALUES ({})", table_desc.full_name(), names, placeholders)
}

fn bind_values(path: &Path, columns: &[&ColumnDesc], record: &DumpRecord) -> Result<Vec<Value>> {
    let load_failed = |message: String| S2JdbcError::LoadFailed { file: path.to_path_buf(), line: record.line, message };
    if record.fields.len() != columns.len() {
        return Err(load_failed(format!("expected {} fields but found {}", columns.len(), record.fields.len())));
    }
    columns.iter()
        .zip(record.fields.iter())
        .map(|(column, field)| match field {
            None => Ok(Value::Null),
            Some(text) => column.sql_type.parse_value(text)
                .map_err(|e| load_failed(format!("{}: {}", column.name, e))),
        })
        .collect()
}

/// Splits CSV text into records. Quoted fields may contain delimiters,
/// doubled quotes and line breaks. Blank lines are skipped.
pub fn parse_csv(content: &str) -> Vec<DumpRecord> {
    let mut records = Vec::new();
    let mut fields: Vec<Option<String>> = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
            continue;
        }
        match c {
            QUOTE if field.is_empty() && !quoted => {
                quoted = true;
                in_quotes = true;
            }
            FIELD_DELIMITER => {
                fields.push(take_field(&mut field, &mut quoted));
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(take_field(&mut field, &mut quoted));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            c => field.push(c),
        }
    }
    if !field.is_empty() || quoted || !fields.is_empty() {
        fields.push(take_field(&mut field, &mut quoted));
        push_record(&mut records, record_line, fields);
    }
    records
}

fn take_field(field: &mut String, quoted: &mut bool) -> Option<String> {
    let value = std::mem::take(field);
    let was_quoted = std::mem::replace(quoted, false);
    if value.is_empty() && !was_quoted {
        None
    } else {
        Some(value)
    }
}

fn push_record(records: &mut Vec<DumpRecord>, line: usize, fields: Vec<Option<String>>) {
    if fields.len() == 1 && fields[0].is_none() {
        return;
    }
    records.push(DumpRecord { line, fields });
}
