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

/// The plain accumulating where builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleWhere {
    criteria: Criteria,
}

impl SimpleWhere {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Where for SimpleWhere {
    fn get_criteria(&self) -> String {
        self.criteria.as_str().to_string()
    }

    fn get_params(&self) -> &[Value] {
        self.criteria.params()
    }

    fn get_property_names(&self) -> &[String] {
        self.criteria.property_names()
    }
}

impl WhereBuilder for SimpleWhere {
    fn criteria_mut(&mut self) -> &mut Criteria {
        &mut self.criteria
    }
}
