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

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    TypeMismatch {
        expected: String,
        found: String,
    },
    NotSupported(String, String),
    ParseError {
        target_type: String,
        input: String,
        message: String,
    },
    NumericOverflow {
        target_type: String,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            ConversionError::NotSupported(k, v) => write!(f, "NotSupported `{}` :`{}`", k, v),
            ConversionError::ParseError { target_type, input, message } => {
                write!(f, "Parse error: cannot convert `{}` to {}: {}", input, target_type, message)
            }
            ConversionError::NumericOverflow { target_type } => {
                write!(f, "Numeric overflow when converting to {}", target_type)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

impl ConversionError {
    pub fn parse_error<T, I, M>(target_type: T, input: I, message: M) -> Self
    where
        T: Into<String>,
        I: Into<String>,
        M: ToString,
    {
        Self::ParseError {
            target_type: target_type.into(),
            input: input.into(),
            message: message.to_string(),
        }
    }

    pub fn type_mismatch_error<T: Into<String>, E: Into<String>>(expected: T, found: E) -> Self {
        Self::TypeMismatch { expected: expected.into(), found: found.into() }
    }

    pub fn not_supported_error<T: Into<String>, E: Into<String>>(field: T, expected: E) -> Self {
        Self::NotSupported(field.into(), expected.into())
    }

    pub fn numeric_overflow_error<T: Into<String>>(target_type: T) -> Self {
        Self::NumericOverflow { target_type: target_type.into() }
    }
}
