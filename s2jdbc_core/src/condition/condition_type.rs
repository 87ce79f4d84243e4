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
use std::fmt::{Display, Formatter};
use crate::Value;

/// Escape character used by `starts`, `ends` and `contains` once the
/// value carries wildcard characters.
pub const WILDCARD_ESCAPE_CHAR: char = '$';

/// The operand handed to a [`ConditionType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Single(Value),
    List(Vec<Value>),
    /// A LIKE pattern together with its escape character.
    Escaped(Value, char),
    /// The switch of `is_null` / `is_not_null`.
    Flag(Option<bool>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    LikeEscape,
    Starts,
    StartsEscape,
    Ends,
    EndsEscape,
    Contains,
    ContainsEscape,
    IsNull,
    IsNotNull,
}

impl ConditionType {

    /// Whether `value` is eligible to produce a clause for this operator.
    pub fn is_target(&self, value: &ConditionValue) -> bool {
        match self {
            ConditionType::Eq | ConditionType::Ne | ConditionType::Lt | ConditionType::Le
            | ConditionType::Gt | ConditionType::Ge | ConditionType::Like => {
                matches!(value, ConditionValue::Single(v) if !v.is_null())
            }
            ConditionType::Starts | ConditionType::StartsEscape | ConditionType::Ends
            | ConditionType::EndsEscape | ConditionType::Contains | ConditionType::ContainsEscape => {
                matches!(value, ConditionValue::Single(Value::Text(_)))
            }
            ConditionType::LikeEscape => {
                matches!(value, ConditionValue::Escaped(v, _) if !v.is_null())
            }
            ConditionType::In | ConditionType::NotIn => match value {
                ConditionValue::List(values) => !values.is_empty() && values.iter().all(|v| !v.is_null()),
                _ => false,
            },
            ConditionType::IsNull | ConditionType::IsNotNull => {
                matches!(value, ConditionValue::Flag(Some(true)))
            }
        }
    }

    /// Renders the clause for `property_name`, e.g. `name LIKE ?`.
    pub fn get_condition(&self, property_name: &str, value: &ConditionValue) -> String {
        match self {
            ConditionType::In | ConditionType::NotIn => {
                let size = match value {
                    ConditionValue::List(values) => values.len(),
                    _ => 1,
                };
                let placeholders = vec!["?"; size].join(", ");
                format!("{} {} ({})", property_name, self, placeholders)
            }
            ConditionType::IsNull | ConditionType::IsNotNull => {
                format!("{} {}", property_name, self)
            }
            ConditionType::LikeEscape => format!("{} LIKE ? ESCAPE ?", property_name),
            ConditionType::StartsEscape | ConditionType::EndsEscape | ConditionType::ContainsEscape => {
                format!("{} LIKE ? ESCAPE '{}'", property_name, WILDCARD_ESCAPE_CHAR)
            }
            _ => format!("{} {} ?", property_name, self),
        }
    }

    /// Appends the bind values of `value` to `params` and returns how many
    /// were appended.
    pub fn add_value(&self, params: &mut Vec<Value>, value: ConditionValue) -> usize {
        match (self, value) {
            (ConditionType::IsNull | ConditionType::IsNotNull, _) => 0,
            (_, ConditionValue::List(values)) => {
                let size = values.len();
                params.extend(values);
                size
            }
            (_, ConditionValue::Escaped(v, escape)) => {
                params.push(v);
                params.push(Value::Char(escape));
                2
            }
            (_, ConditionValue::Flag(_)) => 0,
            (ConditionType::Starts | ConditionType::StartsEscape, ConditionValue::Single(v)) => {
                params.push(Value::Text(format!("{}%", text_of(v))));
                1
            }
            (ConditionType::Ends | ConditionType::EndsEscape, ConditionValue::Single(v)) => {
                params.push(Value::Text(format!("%{}", text_of(v))));
                1
            }
            (ConditionType::Contains | ConditionType::ContainsEscape, ConditionValue::Single(v)) => {
                params.push(Value::Text(format!("%{}%", text_of(v))));
                1
            }
            (_, ConditionValue::Single(v)) => {
                params.push(v);
                1
            }
        }
    }

    /// The escape-aware twin of a positional LIKE operator.
    pub fn escaped(&self) -> ConditionType {
        match self {
            ConditionType::Starts => ConditionType::StartsEscape,
            ConditionType::Ends => ConditionType::EndsEscape,
            ConditionType::Contains => ConditionType::ContainsEscape,
            ConditionType::Like => ConditionType::LikeEscape,
            other => *other,
        }
    }
}

fn text_of(value: Value) -> String {
    match value {
        Value::Text(s) => s,
        other => other.to_string(),
    }
}

impl Display for ConditionType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ConditionType::Eq => write!(f, "="),
            ConditionType::Ne => write!(f, "<>"),
            ConditionType::Lt => write!(f, "<"),
            ConditionType::Le => write!(f, "<="),
            ConditionType::Gt => write!(f, ">"),
            ConditionType::Ge => write!(f, ">="),
            ConditionType::In => write!(f, "IN"),
            ConditionType::NotIn => write!(f, "NOT IN"),
            ConditionType::Like | ConditionType::Starts | ConditionType::Ends | ConditionType::Contains => write!(f, "LIKE"),
            ConditionType::LikeEscape | ConditionType::StartsEscape | ConditionType::EndsEscape
            | ConditionType::ContainsEscape => write!(f, "LIKE ESCAPE"),
            ConditionType::IsNull => write!(f, "IS NULL"),
            ConditionType::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_targets() {
        assert!(ConditionType::Eq.is_target(&ConditionValue::Single(Value::Int(1))));
        assert!(!ConditionType::Eq.is_target(&ConditionValue::Single(Value::Null)));
        assert!(!ConditionType::Gt.is_target(&ConditionValue::List(vec![Value::Int(1)])));
    }

    #[test]
    fn test_in_requires_non_empty_list_without_null() {
        assert!(ConditionType::In.is_target(&ConditionValue::List(vec![Value::Int(1), Value::Int(2)])));
        assert!(!ConditionType::In.is_target(&ConditionValue::List(vec![])));
        assert!(!ConditionType::NotIn.is_target(&ConditionValue::List(vec![Value::Int(1), Value::Null])));
    }

    #[test]
    fn test_null_check_needs_true_flag() {
        assert!(ConditionType::IsNull.is_target(&ConditionValue::Flag(Some(true))));
        assert!(!ConditionType::IsNull.is_target(&ConditionValue::Flag(Some(false))));
        assert!(!ConditionType::IsNotNull.is_target(&ConditionValue::Flag(None)));
    }

    #[test]
    fn test_rendering() {
        let one = ConditionValue::Single(Value::Int(1));
        assert_eq!(ConditionType::Ne.get_condition("a", &one), "a <> ?");
        assert_eq!(ConditionType::Le.get_condition("a", &one), "a <= ?");
        let list = ConditionValue::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(ConditionType::NotIn.get_condition("a", &list), "a NOT IN (?, ?, ?)");
        assert_eq!(ConditionType::IsNotNull.get_condition("a", &ConditionValue::Flag(Some(true))), "a IS NOT NULL");
        assert_eq!(ConditionType::ContainsEscape.get_condition("a", &one), "a LIKE ? ESCAPE '$'");
        assert_eq!(
            ConditionType::LikeEscape.get_condition("a", &ConditionValue::Escaped(Value::from("x"), '!')),
            "a LIKE ? ESCAPE ?"
        );
    }

    #[test]
    fn test_bind_arity() {
        let mut params = Vec::new();
        assert_eq!(ConditionType::IsNull.add_value(&mut params, ConditionValue::Flag(Some(true))), 0);
        assert_eq!(ConditionType::Ends.add_value(&mut params, ConditionValue::Single(Value::from("abc"))), 1);
        assert_eq!(ConditionType::LikeEscape.add_value(&mut params, ConditionValue::Escaped(Value::from("a!%"), '!')), 2);
        assert_eq!(params, vec![Value::from("%abc"), Value::from("a!%"), Value::Char('!')]);
    }
}
