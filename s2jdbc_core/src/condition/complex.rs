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

use crate::{Criteria, Value, Where, WhereBuilder};
use super::criteria::assert_property_name;

/// A where builder that can split its clauses into `or` groups and nest
/// other builders.
/// ```
/// use s2jdbc_core::{ComplexWhere, SimpleWhere, Where, WhereBuilder};
///
/// let w = ComplexWhere::new()
///     .eq("a", 1)
///     .or()
///     .eq("b", 2)
///     .and(SimpleWhere::new().eq("c", 3).eq("d", 4));
/// assert_eq!(w.get_criteria(), "(a = ?) or (b = ? and (c = ? and d = ?))");
/// assert_eq!(w.get_params().len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexWhere {
    criteria: Criteria,
    groups: Vec<Criteria>,
    params: Vec<Value>,
    property_names: Vec<String>,
}

impl ComplexWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the current group; following clauses are or-ed with it.
    pub fn or(mut self) -> Self {
        if !self.criteria.is_empty() {
            let group = self.criteria.take();
            self.groups.push(group);
        }
        self.sync();
        self
    }

    /// Appends the criteria of `other` as one parenthesized clause.
    pub fn and<W: Where>(mut self, other: W) -> Self {
        let criteria = other.get_criteria();
        if !criteria.is_empty() {
            self.criteria.add_raw(&format!("({})", criteria), other.get_params(), other.get_property_names());
        }
        self.sync();
        self
    }

    fn sync(&mut self) {
        self.params = self.groups.iter()
            .chain(std::iter::once(&self.criteria))
            .flat_map(|c| c.params().iter().cloned())
            .collect();
        self.property_names = self.groups.iter()
            .chain(std::iter::once(&self.criteria))
            .flat_map(|c| c.property_names().iter().cloned())
            .collect();
    }
}

impl Where for ComplexWhere {
    fn get_criteria(&self) -> String {
        if self.groups.is_empty() {
            return self.criteria.as_str().to_string();
        }
        self.groups.iter()
            .chain(std::iter::once(&self.criteria))
            .filter(|c| !c.is_empty())
            .map(|c| format!("({})", c.as_str()))
            .collect::<Vec<String>>()
            .join(" or ")
    }

    fn get_params(&self) -> &[Value] {
        &self.params
    }

    fn get_property_names(&self) -> &[String] {
        &self.property_names
    }
}

impl WhereBuilder for ComplexWhere {
    fn criteria_mut(&mut self) -> &mut Criteria {
        &mut self.criteria
    }

    fn add_condition<S: Into<String>>(mut self, condition_type: crate::ConditionType, property_name: S, value: crate::ConditionValue) -> Self {
        let property_name = property_name.into();
        assert_property_name(&property_name);
        self.criteria.add_condition(condition_type, &property_name, value);
        self.sync();
        self
    }
}
