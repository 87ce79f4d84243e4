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
//! Database dialects known to the migration runner.
//!

use std::fmt;
use std::str::FromStr;
use crate::errors::S2JdbcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenDialect {
    #[default]
    Standard,
    Sqlite,
    Mysql,
    Postgres,
    Oracle,
    SqlServer,
}

impl GenDialect {

    pub fn name(&self) -> &'static str {
        match self {
            GenDialect::Standard => "standard",
            GenDialect::Sqlite => "sqlite",
            GenDialect::Mysql => "mysql",
            GenDialect::Postgres => "postgres",
            GenDialect::Oracle => "oracle",
            GenDialect::SqlServer => "mssql",
        }
    }

    /// Resolves the dialect implied by a connection url scheme.
    pub fn from_scheme(scheme: &str) -> Option<GenDialect> {
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" => Some(GenDialect::Sqlite),
            "mysql" | "mariadb" => Some(GenDialect::Mysql),
            "postgres" | "postgresql" => Some(GenDialect::Postgres),
            "oracle" => Some(GenDialect::Oracle),
            "mssql" | "sqlserver" => Some(GenDialect::SqlServer),
            _ => None,
        }
    }

    /// Object kinds whose `CREATE` statement carries a procedural body.
    fn block_object_kinds(&self) -> &'static [&'static str] {
        match self {
            GenDialect::Standard => &["PROCEDURE", "FUNCTION", "TRIGGER"],
            GenDialect::Sqlite => &["TRIGGER"],
            GenDialect::Mysql => &["PROCEDURE", "FUNCTION", "TRIGGER", "EVENT"],
            GenDialect::Postgres => &[],
            GenDialect::Oracle => &["PROCEDURE", "FUNCTION", "TRIGGER", "PACKAGE", "TYPE"],
            GenDialect::SqlServer => &["PROCEDURE", "PROC", "FUNCTION", "TRIGGER"],
        }
    }

    /// Leading words of an anonymous block.
    fn anonymous_block_words(&self) -> &'static [&'static str] {
        match self {
            GenDialect::Oracle => &["DECLARE", "BEGIN"],
            _ => &[],
        }
    }

    /// Whether a statement whose leading words are `words` (upper-cased)
    /// opens a procedural block.
    pub fn is_block_start(&self, words: &[String]) -> bool {
        let mut iter = words.iter().map(String::as_str).peekable();
        match iter.next() {
            Some("CREATE") => {
                if iter.peek() == Some(&"OR") {
                    iter.next();
                    if iter.next() != Some("REPLACE") {
                        return false;
                    }
                }
                // skip MySQL's DEFINER=... clause
                while let Some(word) = iter.peek() {
                    if word.starts_with("DEFINER") {
                        iter.next();
                    } else {
                        break;
                    }
                }
                match iter.next() {
                    Some(kind) => self.block_object_kinds().contains(&kind),
                    None => false,
                }
            }
            Some(word) => self.anonymous_block_words().contains(&word),
            None => false,
        }
    }

    /// The line that terminates a block when none is configured.
    pub fn default_block_delimiter(&self) -> Option<&'static str> {
        match self {
            GenDialect::Oracle => Some("/"),
            GenDialect::SqlServer => Some("GO"),
            _ => None,
        }
    }

    pub fn supports_dollar_quoting(&self) -> bool {
        matches!(self, GenDialect::Postgres)
    }

    /// Whether a driver error message reports a missing table.
    pub fn is_table_not_found(&self, message: &str) -> bool {
        let lower = message.to_ascii_lowercase();
        match self {
            GenDialect::Sqlite => lower.contains("no such table"),
            GenDialect::Mysql => message.contains("1146") || lower.contains("doesn't exist"),
            GenDialect::Postgres => message.contains("42P01") || lower.contains("does not exist"),
            GenDialect::Oracle => message.contains("ORA-00942"),
            GenDialect::SqlServer => lower.contains("invalid object name"),
            GenDialect::Standard => {
                lower.contains("no such table")
                    || lower.contains("doesn't exist")
                    || lower.contains("does not exist")
                    || message.contains("ORA-00942")
                    || lower.contains("invalid object name")
            }
        }
    }

    /// Column type used when the runner creates its version table.
    pub fn integer_type(&self) -> &'static str {
        match self {
            GenDialect::Oracle => "number(10)",
            GenDialect::SqlServer => "int",
            _ => "integer",
        }
    }
}

impl FromStr for GenDialect {
    type Err = S2JdbcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(GenDialect::Standard),
            "sqlite" => Ok(GenDialect::Sqlite),
            "mysql" | "mariadb" => Ok(GenDialect::Mysql),
            "postgres" | "postgresql" => Ok(GenDialect::Postgres),
            "oracle" => Ok(GenDialect::Oracle),
            "mssql" | "sqlserver" => Ok(GenDialect::SqlServer),
            other => Err(S2JdbcError::UnknownDatabase(other.to_string())),
        }
    }
}

impl fmt::Display for GenDialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
