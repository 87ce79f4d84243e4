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
//! Criteria accumulation shared by every where builder.
//! ```
//! use s2jdbc_core::{SimpleWhere, Where, WhereBuilder};
//!
//! let w = SimpleWhere::new()
//!     .eq("name", "foo")
//!     .contains("code", "10%")
//!     .is_null("deleted_at", Some(true));
//! assert_eq!(w.get_criteria(), "name = ? and code LIKE ? ESCAPE '$' and deleted_at IS NULL");
//! ```
//!
use tracing::trace;

use crate::{ConditionType, ConditionValue, Value};

const AND: &str = " and ";

/// Accumulated clauses plus their positional bind values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    buffer: String,
    params: Vec<Value>,
    property_names: Vec<String>,
    excludes_whitespace: bool,
}

impl Criteria {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn excludes_whitespace(&self) -> bool {
        self.excludes_whitespace
    }

    pub fn set_excludes_whitespace(&mut self, excludes_whitespace: bool) {
        self.excludes_whitespace = excludes_whitespace;
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn property_names(&self) -> &[String] {
        &self.property_names
    }

    /// Evaluates `condition_type` against `value` and, when targeted, appends
    /// the clause and its binds. Returns whether a clause was added.
    pub fn add_condition(&mut self, condition_type: ConditionType, property_name: &str, value: ConditionValue) -> bool {
        if !condition_type.is_target(&value) {
            trace!("skip {:?} on {}, value not targeted", condition_type, property_name);
            return false;
        }
        let clause = condition_type.get_condition(property_name, &value);
        self.append(&clause);
        let size = condition_type.add_value(&mut self.params, value);
        self.property_names.extend(std::iter::repeat(property_name.to_string()).take(size));
        true
    }

    /// Appends raw criteria text carrying its own binds.
    pub fn add_raw(&mut self, clause: &str, params: &[Value], property_names: &[String]) {
        if clause.is_empty() {
            return;
        }
        self.append(clause);
        self.params.extend_from_slice(params);
        self.property_names.extend_from_slice(property_names);
    }

    /// Moves the accumulated clauses out, keeping the whitespace setting.
    pub fn take(&mut self) -> Criteria {
        let excludes_whitespace = self.excludes_whitespace;
        let taken = std::mem::take(self);
        self.excludes_whitespace = excludes_whitespace;
        taken
    }

    fn append(&mut self, clause: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push_str(AND);
        }
        self.buffer.push_str(clause);
    }

    /// Blank text becomes null when whitespace is excluded.
    pub fn normalize(&self, value: Value) -> Value {
        if self.excludes_whitespace && value.is_blank() {
            Value::Null
        } else {
            value
        }
    }

    /// Normalizes every element and, when whitespace is excluded, drops
    /// the elements that became null.
    pub fn normalize_list(&self, values: Vec<Value>) -> Vec<Value> {
        if !self.excludes_whitespace {
            return values;
        }
        values.into_iter()
            .map(|v| self.normalize(v))
            .filter(|v| !v.is_null())
            .collect()
    }
}

/// Escapes `%`, `_` and `$` with the `$` escape character.
pub fn escape_wildcard(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '$' | '%' | '_') {
            escaped.push('$');
        }
        escaped.push(c);
    }
    escaped
}

fn has_wildcard(value: &str) -> bool {
    value.contains('%') || value.contains('_')
}

pub(crate) fn assert_property_name(property_name: &str) {
    if property_name.trim().is_empty() {
        panic!("property name must not be empty");
    }
}

/// Read side of a where builder.
pub trait Where {
    fn get_criteria(&self) -> String;
    fn get_params(&self) -> &[Value];
    fn get_property_names(&self) -> &[String];
}

/// Fluent side of a where builder. Every method consumes the builder and
/// hands it back, so calls chain on the concrete type.
///
/// # Panics
///
/// Every predicate panics when the property name is empty or whitespace.
pub trait WhereBuilder: Where + Sized {

    fn criteria_mut(&mut self) -> &mut Criteria;

    fn excludes_whitespace(mut self) -> Self {
        self.criteria_mut().set_excludes_whitespace(true);
        self
    }

    fn add_condition<S: Into<String>>(mut self, condition_type: ConditionType, property_name: S, value: ConditionValue) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        self.criteria_mut().add_condition(condition_type, &property_name, value);
        self
    }

    fn add_single<S: Into<String>, V: Into<Value>>(mut self, condition_type: ConditionType, property_name: S, value: V) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        let value = self.criteria_mut().normalize(value.into());
        self.add_condition(condition_type, property_name, ConditionValue::Single(value))
    }

    fn add_list<S: Into<String>, V: Into<Value>>(mut self, condition_type: ConditionType, property_name: S, values: Vec<V>) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        let values = self.criteria_mut().normalize_list(values);
        self.add_condition(condition_type, property_name, ConditionValue::List(values))
    }

    fn add_wildcard<S: Into<String>, V: Into<Value>>(mut self, condition_type: ConditionType, property_name: S, value: V) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        let value = self.criteria_mut().normalize(value.into());
        match value {
            Value::Text(text) if has_wildcard(&text) => {
                let escaped = Value::Text(escape_wildcard(&text));
                self.add_condition(condition_type.escaped(), property_name, ConditionValue::Single(escaped))
            }
            other => self.add_condition(condition_type, property_name, ConditionValue::Single(other)),
        }
    }

    fn eq<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Eq, property_name, value) }
    fn ne<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Ne, property_name, value) }
    fn lt<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Lt, property_name, value) }
    fn le<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Le, property_name, value) }
    fn gt<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Gt, property_name, value) }
    fn ge<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Ge, property_name, value) }
    fn r#in<S: Into<String>, V: Into<Value>>(self, property_name: S, values: Vec<V>) -> Self { self.add_list(ConditionType::In, property_name, values) }
    fn not_in<S: Into<String>, V: Into<Value>>(self, property_name: S, values: Vec<V>) -> Self { self.add_list(ConditionType::NotIn, property_name, values) }
    fn like<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_single(ConditionType::Like, property_name, value) }
    fn starts<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_wildcard(ConditionType::Starts, property_name, value) }
    fn ends<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_wildcard(ConditionType::Ends, property_name, value) }
    fn contains<S: Into<String>, V: Into<Value>>(self, property_name: S, value: V) -> Self { self.add_wildcard(ConditionType::Contains, property_name, value) }

    fn like_escape<S: Into<String>, V: Into<Value>>(mut self, property_name: S, value: V, escape: char) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        let value = self.criteria_mut().normalize(value.into());
        self.add_condition(ConditionType::LikeEscape, property_name, ConditionValue::Escaped(value, escape))
    }

    fn is_null<S: Into<String>>(self, property_name: S, flag: Option<bool>) -> Self {
        self.add_condition(ConditionType::IsNull, property_name, ConditionValue::Flag(flag))
    }

    fn is_not_null<S: Into<String>>(self, property_name: S, flag: Option<bool>) -> Self {
        self.add_condition(ConditionType::IsNotNull, property_name, ConditionValue::Flag(flag))
    }
}
