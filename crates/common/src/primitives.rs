//! Primitive type table
//!
//! Maps declared scalar types to OpenAPI `{type, format}` pairs and to the
//! loose type names used in Postman parameter descriptions.

use serde::Serialize;

/// OpenAPI schema of a primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimitiveSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

impl PrimitiveSchema {
    const fn new(schema_type: &'static str, format: Option<&'static str>) -> Self {
        Self {
            schema_type,
            format,
        }
    }
}

const STRING: PrimitiveSchema = PrimitiveSchema::new("string", None);
const INT32: PrimitiveSchema = PrimitiveSchema::new("integer", Some("int32"));
const INT64: PrimitiveSchema = PrimitiveSchema::new("integer", Some("int64"));
const FLOAT: PrimitiveSchema = PrimitiveSchema::new("number", Some("float"));
const DOUBLE: PrimitiveSchema = PrimitiveSchema::new("number", Some("double"));
const BOOLEAN: PrimitiveSchema = PrimitiveSchema::new("boolean", None);
const DECIMAL: PrimitiveSchema = PrimitiveSchema::new("number", None);
const DATE_TIME: PrimitiveSchema = PrimitiveSchema::new("string", Some("date-time"));

/// Immutable lookup table for scalar types
///
/// Lookups accept either a simple name (`Long`) or a qualified one
/// (`java.lang.Long`); only the last segment is consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveTable;

impl PrimitiveTable {
    /// OpenAPI schema for a primitive; unrecognized names map to `string`
    ///
    /// # Examples
    /// ```
    /// use restmeta_common::PrimitiveTable;
    ///
    /// let schema = PrimitiveTable.schema_for("java.lang.Long");
    /// assert_eq!(schema.schema_type, "integer");
    /// assert_eq!(schema.format, Some("int64"));
    /// ```
    pub fn schema_for(&self, type_name: &str) -> PrimitiveSchema {
        match crate::simple_name(type_name) {
            "int" | "Integer" | "short" | "Short" | "byte" | "Byte" => INT32,
            "long" | "Long" => INT64,
            "float" | "Float" => FLOAT,
            "double" | "Double" => DOUBLE,
            "boolean" | "Boolean" => BOOLEAN,
            "BigDecimal" | "BigInteger" => DECIMAL,
            "Date" | "LocalDateTime" | "LocalDate" | "Instant" | "ZonedDateTime"
            | "OffsetDateTime" => DATE_TIME,
            _ => STRING,
        }
    }

    /// Loose type name shown in Postman descriptions
    pub fn postman_type(&self, type_name: &str) -> &'static str {
        match crate::simple_name(type_name) {
            "String" | "Date" | "Time" | "LocalDateTime" | "LocalDate" | "Instant" => "string",
            "boolean" | "Boolean" => "boolean",
            "int" | "Integer" | "short" | "Short" | "long" | "Long" | "float" | "Float"
            | "double" | "Double" | "BigDecimal" | "byte[]" => "number",
            "Array" => "Array",
            _ => "string",
        }
    }

    /// Whether a declared type is a scalar by its package
    ///
    /// Anything under `java.lang`, `java.math`, `java.time`, or `java.util`
    /// counts, as does any name without a package and anything mentioning
    /// `ResponseEntity`. Sequence containers are told apart by
    /// [`TypeConventions::is_scalar`](crate::TypeConventions::is_scalar).
    pub fn is_primitive(&self, class_path: &str) -> bool {
        class_path.starts_with("java.lang.")
            || class_path.starts_with("java.math.")
            || class_path.starts_with("java.time.")
            || class_path.starts_with("java.util.")
            || !class_path.contains('.')
            || class_path.contains("ResponseEntity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_for_numbers() {
        let table = PrimitiveTable;
        assert_eq!(table.schema_for("int"), INT32);
        assert_eq!(table.schema_for("java.lang.Integer"), INT32);
        assert_eq!(table.schema_for("Long"), INT64);
        assert_eq!(table.schema_for("float"), FLOAT);
        assert_eq!(table.schema_for("java.lang.Double"), DOUBLE);
        assert_eq!(table.schema_for("java.math.BigDecimal"), DECIMAL);
    }

    #[test]
    fn test_schema_for_dates_and_unknowns() {
        let table = PrimitiveTable;
        assert_eq!(table.schema_for("java.time.LocalDateTime"), DATE_TIME);
        assert_eq!(table.schema_for("java.util.Date"), DATE_TIME);
        assert_eq!(table.schema_for("java.util.UUID"), STRING);
        assert_eq!(table.schema_for("String"), STRING);
    }

    #[test]
    fn test_is_primitive() {
        let table = PrimitiveTable;
        assert!(table.is_primitive("java.lang.String"));
        assert!(table.is_primitive("long"));
        assert!(table.is_primitive("java.util.Map"));
        assert!(table.is_primitive("java.time.Instant"));
        assert!(!table.is_primitive("com.example.dto.UserDto"));
    }

    #[test]
    fn test_postman_type() {
        let table = PrimitiveTable;
        assert_eq!(table.postman_type("java.lang.Long"), "number");
        assert_eq!(table.postman_type("Boolean"), "boolean");
        assert_eq!(table.postman_type("UserStatus"), "string");
    }
}
