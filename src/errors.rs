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

use std::fmt;
use std::path::PathBuf;
use s2jdbc_core::ConversionError;

pub type Result<T> = std::result::Result<T, S2JdbcError>;

#[derive(Debug)]
pub enum S2JdbcError {
    /// A mandatory configuration value was not supplied.
    RequiredPropertyNull(String),
    IllegalVersionValue(String),
    UnsupportedEncoding(String),
    ConfigError(String),
    IoError(std::io::Error),
    DatabaseError(String),
    #[cfg(feature = "sqlite-sync")]
    R2D2Error(r2d2::Error),
    UnknownDatabase(String),
    SqlFailed { file: PathBuf, line: usize, sql: String, message: String },
    LoadFailed { file: PathBuf, line: usize, message: String },
    TableDescNotFound { file: PathBuf, table_name: String },
    ConversionError(ConversionError),
    /// Every failure captured while running one phase; `primary` is the first.
    Aggregate { primary: Box<S2JdbcError>, suppressed: Vec<S2JdbcError> },
}

impl S2JdbcError {
    pub fn primary(&self) -> &S2JdbcError {
        match self {
            S2JdbcError::Aggregate { primary, .. } => primary,
            other => other,
        }
    }

    pub fn suppressed(&self) -> &[S2JdbcError] {
        match self {
            S2JdbcError::Aggregate { suppressed, .. } => suppressed,
            _ => &[],
        }
    }

    /// Builds the error raised at the end of a phase from the captured list.
    pub fn aggregate(mut errors: Vec<S2JdbcError>) -> Option<S2JdbcError> {
        if errors.is_empty() {
            return None;
        }
        let primary = errors.remove(0);
        Some(S2JdbcError::Aggregate { primary: Box::new(primary), suppressed: errors })
    }
}

impl fmt::Display for S2JdbcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            S2JdbcError::RequiredPropertyNull(name) => write!(f, "Required property '{}' is not set", name),
            S2JdbcError::IllegalVersionValue(value) => write!(f, "Illegal version value: {}", value),
            S2JdbcError::UnsupportedEncoding(encoding) => write!(f, "Unsupported encoding: {}", encoding),
            S2JdbcError::ConfigError(err) => write!(f, "Config error: {}", err),
            S2JdbcError::IoError(err) => write!(f, "IO error: {}", err),
            S2JdbcError::DatabaseError(err) => write!(f, "Database error: {}", err),
            #[cfg(feature = "sqlite-sync")]
            S2JdbcError::R2D2Error(err) => write!(f, "Connection pool error: {}", err),
            S2JdbcError::UnknownDatabase(scheme) => write!(f, "Unknown database: {}", scheme),
            S2JdbcError::SqlFailed { file, line, sql, message } => {
                write!(f, "Failed to execute sql at {}:{} [{}]: {}", file.display(), line, sql, message)
            }
            S2JdbcError::LoadFailed { file, line, message } => {
                write!(f, "Failed to load {}:{}: {}", file.display(), line, message)
            }
            S2JdbcError::TableDescNotFound { file, table_name } => {
                write!(f, "No table found for '{}' ({})", table_name, file.display())
            }
            S2JdbcError::ConversionError(err) => write!(f, "Conversion error: {}", err),
            S2JdbcError::Aggregate { primary, .. } => primary.fmt(f),
        }
    }
}

impl std::error::Error for S2JdbcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            S2JdbcError::IoError(err) => Some(err),
            #[cfg(feature = "sqlite-sync")]
            S2JdbcError::R2D2Error(err) => Some(err),
            S2JdbcError::ConversionError(err) => Some(err),
            S2JdbcError::Aggregate { primary, .. } => Some(primary.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for S2JdbcError {
    fn from(err: std::io::Error) -> Self {
        S2JdbcError::IoError(err)
    }
}

impl From<ConversionError> for S2JdbcError {
    fn from(err: ConversionError) -> Self {
        S2JdbcError::ConversionError(err)
    }
}

impl From<serde_json::Error> for S2JdbcError {
    fn from(err: serde_json::Error) -> Self {
        S2JdbcError::ConfigError(err.to_string())
    }
}

impl From<regex::Error> for S2JdbcError {
    fn from(err: regex::Error) -> Self {
        S2JdbcError::ConfigError(err.to_string())
    }
}

impl From<url::ParseError> for S2JdbcError {
    fn from(err: url::ParseError) -> Self {
        S2JdbcError::ConfigError(err.to_string())
    }
}

#[cfg(feature = "sqlite-sync")]
impl From<rusqlite::Error> for S2JdbcError {
    fn from(err: rusqlite::Error) -> Self {
        S2JdbcError::DatabaseError(err.to_string())
    }
}

#[cfg(feature = "sqlite-sync")]
impl From<r2d2::Error> for S2JdbcError {
    fn from(err: r2d2::Error) -> Self {
        S2JdbcError::R2D2Error(err)
    }
}
