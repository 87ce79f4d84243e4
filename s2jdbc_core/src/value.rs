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
//! Bind values.
//!

use std::fmt;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Tinyint(i8),
    Smallint(i16),
    Int(i32),
    Bigint(i64),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
    Char(char),
    Text(String),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_string(&self) -> bool {
        self.as_str().is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Text(ref s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether this is text made only of whitespace (or nothing at all).
    pub fn is_blank(&self) -> bool {
        self.as_str().map(|s| s.trim().is_empty()).unwrap_or(false)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Tinyint(v) => Some(v as i64),
            Value::Smallint(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Bigint(v) => Some(v),
            Value::Text(ref s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Tinyint(_) => "tinyint",
            Value::Smallint(_) => "smallint",
            Value::Int(_) => "int",
            Value::Bigint(_) => "bigint",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::BigDecimal(_) => "decimal",
            Value::Char(_) => "char",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned_from_for_value {
    ($ty:ty, $variant:ident, $target:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v as $target)
            }
        }
    };
}

impl_unsigned_from_for_value!(u8, Smallint, i16);
impl_unsigned_from_for_value!(u16, Int, i32);
impl_unsigned_from_for_value!(u32, Bigint, i64);
impl_unsigned_from_for_value!(u64, Bigint, i64);
impl_unsigned_from_for_value!(usize, Bigint, i64);

impl_from_for_value! {
    bool => Bool,
    i8 => Tinyint,
    i16 => Smallint,
    i32 => Int,
    i64 => Bigint,
    f32 => Float,
    f64 => Double,
    BigDecimal => BigDecimal,
    char => Char,
    String => Text,
    Vec<u8> => Blob,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Tinyint(v) => write!(f, "{}", v),
            Value::Smallint(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bigint(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::BigDecimal(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Blob(v) => write!(f, "BLOB({} bytes)", v.len()),
            Value::Date(v) => write!(f, "DATE '{}'", v),
            Value::Time(v) => write!(f, "TIME '{}'", v.format("%H:%M:%S%.3f")),
            Value::DateTime(v) => write!(f, "'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}
