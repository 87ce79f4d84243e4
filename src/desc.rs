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
//! Table and column descriptors derived from entity metadata.
//!

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use heck::ShoutySnakeCase;
use s2jdbc_core::{ConversionError, Value};
use crate::meta::{EntityMeta, GenerationType, PropertyMeta};

pub const DEFAULT_ID_TABLE_NAME: &str = "ID_GENERATOR";
pub const DEFAULT_ID_PK_COLUMN_NAME: &str = "PK";
pub const DEFAULT_ID_VALUE_COLUMN_NAME: &str = "VALUE";

/// Column types a dumped value can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Float,
    Double,
    Decimal,
    Char,
    Varchar,
    Clob,
    Binary,
    Date,
    Time,
    Timestamp,
}

impl SqlType {

    /// Maps a property type name to its column type. Unknown names are
    /// treated as text.
    pub fn from_property_type(property_type: &str) -> SqlType {
        let simple = property_type.rsplit(|c: char| c == '.' || c == ':').next().unwrap_or(property_type);
        match simple {
            "bool" | "boolean" | "Boolean" => SqlType::Boolean,
            "i8" | "i16" | "u8" | "short" | "Short" | "byte" | "Byte" => SqlType::Smallint,
            "i32" | "u16" | "int" | "Integer" => SqlType::Integer,
            "i64" | "u32" | "u64" | "usize" | "isize" | "long" | "Long" | "BigInteger" => SqlType::Bigint,
            "f32" | "float" | "Float" => SqlType::Float,
            "f64" | "double" | "Double" => SqlType::Double,
            "BigDecimal" => SqlType::Decimal,
            "char" | "Character" => SqlType::Char,
            "Clob" => SqlType::Clob,
            "Vec<u8>" | "byte[]" | "Blob" => SqlType::Binary,
            "NaiveDate" | "LocalDate" | "Date" => SqlType::Date,
            "NaiveTime" | "LocalTime" | "Time" => SqlType::Time,
            "NaiveDateTime" | "LocalDateTime" | "Timestamp" | "Calendar" => SqlType::Timestamp,
            _ => SqlType::Varchar,
        }
    }

    /// Converts the textual form of a dumped value.
    pub fn parse_value(&self, text: &str) -> Result<Value, ConversionError> {
        let value = match self {
            SqlType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(ConversionError::parse_error("boolean", text, "expected true, false, 1 or 0")),
            },
            SqlType::Smallint => Value::Smallint(parse_number(text, "smallint")?),
            SqlType::Integer => Value::Int(parse_number(text, "integer")?),
            SqlType::Bigint => Value::Bigint(parse_number(text, "bigint")?),
            SqlType::Float => Value::Float(parse_number(text, "float")?),
            SqlType::Double => Value::Double(parse_number(text, "double")?),
            SqlType::Decimal => Value::BigDecimal(parse_number::<BigDecimal>(text, "decimal")?),
            SqlType::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => Value::Text(text.to_string()),
                }
            }
            SqlType::Varchar | SqlType::Clob => Value::Text(text.to_string()),
            SqlType::Binary => Value::Blob(
                base64::decode(text.trim()).map_err(|e| ConversionError::parse_error("binary", text, e))?,
            ),
            SqlType::Date => Value::Date(
                NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|e| ConversionError::parse_error("date", text, e))?,
            ),
            SqlType::Time => Value::Time(
                NaiveTime::parse_from_str(text.trim(), "%H:%M:%S").map_err(|e| ConversionError::parse_error("time", text, e))?,
            ),
            SqlType::Timestamp => Value::DateTime(
                NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S%.f")
                    .map_err(|e| ConversionError::parse_error("timestamp", text, e))?,
            ),
        };
        Ok(value)
    }
}

fn parse_number<T>(text: &str, target_type: &str) -> Result<T, ConversionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.trim().parse::<T>().map_err(|e| ConversionError::parse_error(target_type, text, e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub id: bool,
}

/// A table an entity maps to. Two descriptors are equal when their
/// canonical names are.
#[derive(Debug, Clone)]
pub struct TableDesc {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDesc>,
    pub id_table_descs: Vec<TableDesc>,
}

impl TableDesc {

    pub fn new<S: Into<String>>(name: S) -> Self {
        TableDesc { catalog: None, schema: None, name: name.into(), columns: Vec::new(), id_table_descs: Vec::new() }
    }

    /// Dotted `catalog.schema.name`, as written.
    pub fn full_name(&self) -> String {
        [self.catalog.as_deref(), self.schema.as_deref(), Some(self.name.as_str())]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<&str>>()
            .join(".")
    }

    pub fn canonical_name(&self) -> String {
        self.full_name().to_lowercase()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDesc> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether `name` refers to this table, by bare or dotted name.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        name == self.name.to_lowercase() || name == self.canonical_name()
    }
}

impl PartialEq for TableDesc {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name() == other.canonical_name()
    }
}

impl Eq for TableDesc {}

impl Hash for TableDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_name().hash(state);
    }
}

/// Builds table descriptors from entity metadata.
#[derive(Debug, Clone, Default)]
pub struct TableDescFactory;

impl TableDescFactory {

    pub fn new() -> Self {
        TableDescFactory
    }

    pub fn get_table_desc(&self, entity_meta: &EntityMeta) -> TableDesc {
        let name = entity_meta.table_name.clone()
            .unwrap_or_else(|| to_db_name(&entity_meta.name));
        let columns = entity_meta.properties.iter()
            .filter(|p| !p.transient)
            .map(|p| self.get_column_desc(p))
            .collect();
        let id_table_descs = entity_meta.properties.iter()
            .filter(|p| p.id && p.generation_type == Some(GenerationType::Table))
            .map(|p| self.get_id_table_desc(p))
            .fold(Vec::<TableDesc>::new(), |mut acc, desc| {
                if !acc.contains(&desc) {
                    acc.push(desc);
                }
                acc
            });
        TableDesc {
            catalog: entity_meta.catalog.clone(),
            schema: entity_meta.schema.clone(),
            name,
            columns,
            id_table_descs,
        }
    }

    fn get_column_desc(&self, property_meta: &PropertyMeta) -> ColumnDesc {
        ColumnDesc {
            name: property_meta.column_name.clone().unwrap_or_else(|| to_db_name(&property_meta.name)),
            sql_type: SqlType::from_property_type(&property_meta.property_type),
            nullable: property_meta.nullable && !property_meta.id,
            id: property_meta.id,
        }
    }

    fn get_id_table_desc(&self, property_meta: &PropertyMeta) -> TableDesc {
        let mut desc = TableDesc::new(property_meta.id_table.clone().unwrap_or_else(|| DEFAULT_ID_TABLE_NAME.to_string()));
        desc.columns = vec![
            ColumnDesc { name: DEFAULT_ID_PK_COLUMN_NAME.to_string(), sql_type: SqlType::Varchar, nullable: false, id: true },
            ColumnDesc { name: DEFAULT_ID_VALUE_COLUMN_NAME.to_string(), sql_type: SqlType::Bigint, nullable: false, id: false },
        ];
        desc
    }
}

/// `orderItem` becomes `ORDER_ITEM`.
pub fn to_db_name(name: &str) -> String {
    name.to_shouty_snake_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str, property_type: &str) -> PropertyMeta {
        PropertyMeta {
            name: name.to_string(),
            column_name: None,
            property_type: property_type.to_string(),
            nullable: true,
            id: false,
            generation_type: None,
            id_table: None,
            transient: false,
        }
    }

    fn entity() -> EntityMeta {
        let mut id = property("id", "i64");
        id.id = true;
        id.generation_type = Some(GenerationType::Table);
        let mut cache = property("cache", "String");
        cache.transient = true;
        EntityMeta {
            name: "OrderItem".to_string(),
            table_name: None,
            schema: Some("Sales".to_string()),
            catalog: None,
            properties: vec![id, property("unitPrice", "BigDecimal"), property("orderedAt", "NaiveDateTime"), cache],
        }
    }

    #[test]
    fn test_table_desc_from_entity() {
        let desc = TableDescFactory::new().get_table_desc(&entity());
        assert_eq!(desc.name, "ORDER_ITEM");
        assert_eq!(desc.full_name(), "Sales.ORDER_ITEM");
        assert_eq!(desc.canonical_name(), "sales.order_item");
        let names: Vec<&str> = desc.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "UNIT_PRICE", "ORDERED_AT"]);
        assert!(!desc.columns[0].nullable);
        assert_eq!(desc.columns[1].sql_type, SqlType::Decimal);
        assert_eq!(desc.id_table_descs.len(), 1);
        assert_eq!(desc.id_table_descs[0].name, DEFAULT_ID_TABLE_NAME);
    }

    #[test]
    fn test_equality_by_canonical_name() {
        let mut a = TableDesc::new("Foo");
        a.schema = Some("S".to_string());
        let mut b = TableDesc::new("FOO");
        b.schema = Some("s".to_string());
        assert_eq!(a, b);
        assert!(a.matches("foo"));
        assert!(a.matches("S.FOO"));
        assert_ne!(a, TableDesc::new("FOO"));
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(SqlType::Boolean.parse_value("1").unwrap(), Value::Bool(true));
        assert_eq!(SqlType::Integer.parse_value(" 42 ").unwrap(), Value::Int(42));
        assert_eq!(SqlType::Decimal.parse_value("12.50").unwrap(), Value::BigDecimal("12.50".parse().unwrap()));
        assert_eq!(
            SqlType::Date.parse_value("2020-02-29").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
        );
        assert!(matches!(SqlType::Timestamp.parse_value("2020-01-01 10:00:00.5").unwrap(), Value::DateTime(_)));
        assert_eq!(SqlType::Binary.parse_value("AQID").unwrap(), Value::Blob(vec![1, 2, 3]));
        assert!(SqlType::Integer.parse_value("x").is_err());
        assert!(SqlType::Boolean.parse_value("yes").is_err());
    }

    #[test]
    fn test_property_type_mapping() {
        assert_eq!(SqlType::from_property_type("java.lang.Long"), SqlType::Bigint);
        assert_eq!(SqlType::from_property_type("chrono::NaiveDate"), SqlType::Date);
        assert_eq!(SqlType::from_property_type("Vec<u8>"), SqlType::Binary);
        assert_eq!(SqlType::from_property_type("MyEnum"), SqlType::Varchar);
    }
}
