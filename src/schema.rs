//! Schema validation.
//!
//! A schema is itself a jon document: every node is an object with a `type` key
//! and optional per-type constraints. Schema documents are compiled into a
//! [`Schema`] tree first, so a malformed schema is reported as a
//! [`SchemaError`] independently of the data being checked. Checking data never
//! fails; it returns every violation found in a [`ValidationResult`].

use crate::error::SchemaError;
use crate::parser::MAX_DEPTH;
use crate::value::{Object, Value, ValueType};
use indexmap::IndexMap;
use log::{debug, trace};
use std::fmt::{self, Display};

/// One failed constraint, located by its path in the data document.
///
/// Paths start at `$`; object members append `.key` and array elements `[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The outcome of one validation: empty means the document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations rendered as `path: message` strings, in traversal order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub nullable: bool,
    pub kind: SchemaKind,
}

/// The declared type of a schema node together with its constraints.
/// All bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Null,
    Bool,
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    Float {
        min: Option<f64>,
        max: Option<f64>,
    },
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    Array {
        min_size: Option<usize>,
        max_size: Option<usize>,
        items: Box<Schema>,
    },
    /// Properties keep their declaration order. Every declared property is
    /// required and no other property is allowed.
    Object {
        min_props: Option<usize>,
        max_props: Option<usize>,
        props: IndexMap<String, Schema>,
    },
}

impl Schema {
    /// Compiles a schema document.
    pub fn from_value(schema: &Value) -> Result<Self, SchemaError> {
        compile(schema, "$", 0)
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self.kind {
            SchemaKind::Null => ValueType::Null,
            SchemaKind::Bool => ValueType::Bool,
            SchemaKind::Int { .. } => ValueType::Int,
            SchemaKind::Float { .. } => ValueType::Float,
            SchemaKind::String { .. } => ValueType::String,
            SchemaKind::Array { .. } => ValueType::Array,
            SchemaKind::Object { .. } => ValueType::Object,
        }
    }

    /// Checks `value` against this schema and collects every violation.
    #[must_use]
    pub fn validate(&self, value: &Value) -> ValidationResult {
        let mut violations = Vec::new();
        self.check(value, "$", &mut violations);
        debug!(
            "validated {} value against {} schema: {} violation(s)",
            value.value_type(),
            self.value_type(),
            violations.len()
        );
        ValidationResult { violations }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        trace!("checking {path} as {}", self.value_type());

        if self.nullable && value.is_null() {
            return;
        }

        let mut violation = |message: String| {
            violations.push(Violation {
                path: path.to_string(),
                message,
            });
        };

        if value.value_type() != self.value_type() {
            violation(format!(
                "expected {}, got {}",
                self.value_type(),
                value.value_type()
            ));
            return;
        }

        match (&self.kind, value) {
            (SchemaKind::Int { min, max }, Value::Int(v)) => {
                if let Some(min) = min.filter(|min| v < min) {
                    violation(format!("value {v} is less than minimum {min}"));
                }
                if let Some(max) = max.filter(|max| v > max) {
                    violation(format!("value {v} is greater than maximum {max}"));
                }
            }
            (SchemaKind::Float { min, max }, Value::Float(v)) => {
                if let Some(min) = min.filter(|min| v < min) {
                    violation(format!("value {v} is less than minimum {min}"));
                }
                if let Some(max) = max.filter(|max| v > max) {
                    violation(format!("value {v} is greater than maximum {max}"));
                }
            }
            (SchemaKind::String { min_len, max_len }, Value::String(s)) => {
                let len = s.chars().count();
                if let Some(min) = min_len.filter(|min| len < *min) {
                    violation(format!("length {len} is less than minimum length {min}"));
                }
                if let Some(max) = max_len.filter(|max| len > *max) {
                    violation(format!(
                        "length {len} is greater than maximum length {max}"
                    ));
                }
            }
            (
                SchemaKind::Array {
                    min_size,
                    max_size,
                    items,
                },
                Value::Array(elements),
            ) => {
                let size = elements.len();
                if let Some(min) = min_size.filter(|min| size < *min) {
                    violation(format!("size {size} is less than minimum size {min}"));
                }
                if let Some(max) = max_size.filter(|max| size > *max) {
                    violation(format!("size {size} is greater than maximum size {max}"));
                }
                for (index, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{path}[{index}]"), violations);
                }
            }
            (
                SchemaKind::Object {
                    min_props,
                    max_props,
                    props,
                },
                Value::Object(object),
            ) => {
                let count = object.len();
                if let Some(min) = min_props.filter(|min| count < *min) {
                    violation(format!(
                        "property count {count} is less than minimum {min}"
                    ));
                }
                if let Some(max) = max_props.filter(|max| count > *max) {
                    violation(format!(
                        "property count {count} is greater than maximum {max}"
                    ));
                }
                check_props(props, object, path, violations);
            }
            _ => {}
        }
    }
}

fn check_props(
    props: &IndexMap<String, Schema>,
    object: &Object,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    for (key, value) in object {
        match props.get(key) {
            Some(schema) => schema.check(value, &format!("{path}.{key}"), violations),
            None => violations.push(Violation {
                path: path.to_string(),
                message: format!("unknown property `{key}`"),
            }),
        }
    }

    for name in props.keys() {
        if !object.contains_key(name) {
            violations.push(Violation {
                path: path.to_string(),
                message: format!("missing property `{name}`"),
            });
        }
    }
}

/// Validates `value` against the schema document `schema`.
///
/// Returns `Err` only when `schema` is not a valid schema; data that fails the
/// schema yields an `Ok` result listing the violations.
pub fn validate(value: &Value, schema: &Value) -> Result<ValidationResult, SchemaError> {
    Ok(Schema::from_value(schema)?.validate(value))
}

/// `depth` counts schema nodes above `node`. Validation recurses at most as deep
/// as the compiled tree, so bounding it here bounds both passes.
fn compile(node: &Value, path: &str, depth: usize) -> Result<Schema, SchemaError> {
    if depth >= MAX_DEPTH {
        return Err(SchemaError::NestingTooDeep {
            path: path.to_string(),
            limit: MAX_DEPTH,
        });
    }

    let Value::Object(object) = node else {
        return Err(SchemaError::NotAnObject {
            path: path.to_string(),
            found: node.value_type(),
        });
    };

    let type_name = match object.get("type") {
        None => {
            return Err(SchemaError::MissingType {
                path: path.to_string(),
            })
        }
        Some(Value::String(name)) => name,
        Some(other) => return Err(invalid(path, "type", "a type name string", other)),
    };
    let value_type = ValueType::from_name(type_name).ok_or_else(|| SchemaError::UnknownType {
        path: path.to_string(),
        name: type_name.clone(),
    })?;

    let nullable = match object.get("nullable") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => return Err(invalid(path, "nullable", "a bool", other)),
    };

    let kind = match value_type {
        ValueType::Null => SchemaKind::Null,
        ValueType::Bool => SchemaKind::Bool,
        ValueType::Int => SchemaKind::Int {
            min: int_bound(object, "mini", path)?,
            max: int_bound(object, "maxi", path)?,
        },
        ValueType::Float => SchemaKind::Float {
            min: float_bound(object, "minf", path)?,
            max: float_bound(object, "maxf", path)?,
        },
        ValueType::String => SchemaKind::String {
            min_len: count_bound(object, "minLen", path)?,
            max_len: count_bound(object, "maxLen", path)?,
        },
        ValueType::Array => {
            let items = object.get("items").ok_or_else(|| SchemaError::MissingItems {
                path: path.to_string(),
            })?;
            SchemaKind::Array {
                min_size: count_bound(object, "minSize", path)?,
                max_size: count_bound(object, "maxSize", path)?,
                items: Box::new(compile(items, &format!("{path}.items"), depth + 1)?),
            }
        }
        ValueType::Object => {
            let props = match object.get("props") {
                None => {
                    return Err(SchemaError::MissingProps {
                        path: path.to_string(),
                    })
                }
                Some(Value::Object(props)) => props,
                Some(other) => return Err(invalid(path, "props", "an object", other)),
            };
            let props = props
                .iter()
                .map(|(name, prop)| {
                    compile(prop, &format!("{path}.props.{name}"), depth + 1)
                        .map(|schema| (name.to_string(), schema))
                })
                .collect::<Result<IndexMap<_, _>, _>>()?;
            SchemaKind::Object {
                min_props: count_bound(object, "minProps", path)?,
                max_props: count_bound(object, "maxProps", path)?,
                props,
            }
        }
    };

    Ok(Schema { nullable, kind })
}

fn invalid(path: &str, key: &str, expected: &str, found: &Value) -> SchemaError {
    SchemaError::InvalidConstraint {
        path: path.to_string(),
        key: key.to_string(),
        expected: expected.to_string(),
        found: found.value_type().to_string(),
    }
}

fn int_bound(object: &Object, key: &str, path: &str) -> Result<Option<i64>, SchemaError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Int(i)) => Ok(Some(*i)),
        Some(other) => Err(invalid(path, key, "an int", other)),
    }
}

/// Float bounds may be written as integers: `minf: 0` means `0.0`.
fn float_bound(object: &Object, key: &str, path: &str) -> Result<Option<f64>, SchemaError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Float(f)) => Ok(Some(*f)),
        Some(Value::Int(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(invalid(path, key, "a number", other)),
    }
}

fn count_bound(object: &Object, key: &str, path: &str) -> Result<Option<usize>, SchemaError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::Int(i)) => {
            usize::try_from(*i)
                .map(Some)
                .map_err(|_| SchemaError::InvalidConstraint {
                    path: path.to_string(),
                    key: key.to_string(),
                    expected: "a non-negative int".to_string(),
                    found: i.to_string(),
                })
        }
        Some(other) => Err(invalid(path, key, "a non-negative int", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn jon(source: &str) -> Value {
        Parser::new(source)
            .and_then(|mut parser| parser.parse_document())
            .unwrap()
    }

    fn check(data: &str, schema: &str) -> Vec<String> {
        validate(&jon(data), &jon(schema)).unwrap().errors()
    }

    #[test]
    fn test_int_bounds() {
        let schema = r#"{"type":"int","mini":0,"maxi":10}"#;
        assert!(check("5", schema).is_empty());
        assert!(check("0", schema).is_empty());
        assert!(check("10", schema).is_empty());
        assert_eq!(
            check("-1", schema),
            vec!["$: value -1 is less than minimum 0"]
        );
        assert_eq!(
            check("11", schema),
            vec!["$: value 11 is greater than maximum 10"]
        );
    }

    #[test]
    fn test_float_bounds() {
        let schema = "{ type: float, minf: 0, maxf: 1.5 }";
        assert!(check("0.5", schema).is_empty());
        assert_eq!(check("-0.5", schema).len(), 1);
        assert_eq!(
            check("2.0", schema),
            vec!["$: value 2 is greater than maximum 1.5"]
        );
        assert_eq!(check("1", schema), vec!["$: expected float, got int"]);
    }

    #[test]
    fn test_string_length_counts_chars() {
        let schema = "{ type: string, minLen: 2, maxLen: 3 }";
        assert!(check("'héé'", schema).is_empty());
        assert_eq!(
            check("'a'", schema),
            vec!["$: length 1 is less than minimum length 2"]
        );
        assert_eq!(
            check("abcd", schema),
            vec!["$: length 4 is greater than maximum length 3"]
        );
    }

    #[test]
    fn test_type_mismatch_stops_descent() {
        let schema = "{ type: array, minSize: 5, items: { type: int } }";
        assert_eq!(check("{}", schema), vec!["$: expected array, got object"]);
    }

    #[test]
    fn test_nested_array_of_objects() {
        let schema = "{type:array, items:{type:object, props:{x:{type:int}}}}";
        assert_eq!(
            check(r#"[{x: 1}, {x: "a"}]"#, schema),
            vec!["$[1].x: expected int, got string"]
        );
    }

    #[test]
    fn test_all_violations_are_collected() {
        let schema = r#"{
            type: object
            maxProps: 2
            props: {
                name: { type: string, minLen: 3 }
                tags: { type: array, maxSize: 1, items: { type: string } }
            }
        }"#;
        let data = "{ name: ab, tags: [a, 1], extra: true }";
        assert_eq!(
            check(data, schema),
            vec![
                "$: property count 3 is greater than maximum 2",
                "$.name: length 2 is less than minimum length 3",
                "$.tags: size 2 is greater than maximum size 1",
                "$.tags[1]: expected string, got int",
                "$: unknown property `extra`",
            ]
        );
    }

    #[test]
    fn test_missing_property() {
        let schema = "{ type: object, props: { a: { type: int }, b: { type: bool } } }";
        assert_eq!(
            check("{ b: true }", schema),
            vec!["$: missing property `a`"]
        );
    }

    #[test]
    fn test_nullable() {
        let schema = "{ type: int, nullable: true, mini: 5 }";
        assert!(check("null", schema).is_empty());
        assert_eq!(check("1", schema).len(), 1);
        assert_eq!(
            check("null", "{ type: int }"),
            vec!["$: expected int, got null"]
        );
        assert!(check("null", "{ type: null }").is_empty());
    }

    #[test]
    fn test_nullable_object_skips_missing_props_check() {
        let schema = "{ type: object, nullable: true, minProps: 1, props: { a: { type: int } } }";
        assert!(check("null", schema).is_empty());
    }

    #[test]
    fn test_schema_errors() {
        let data = jon("1");
        assert_eq!(
            validate(&data, &jon("{ mini: 1 }")),
            Err(SchemaError::MissingType {
                path: "$".to_string()
            })
        );
        assert_eq!(
            validate(&data, &jon("{ type: number }")),
            Err(SchemaError::UnknownType {
                path: "$".to_string(),
                name: "number".to_string()
            })
        );
        assert_eq!(
            validate(&data, &jon("int")),
            Err(SchemaError::NotAnObject {
                path: "$".to_string(),
                found: ValueType::String
            })
        );
        assert_eq!(
            validate(&data, &jon("{ type: array }")),
            Err(SchemaError::MissingItems {
                path: "$".to_string()
            })
        );
        assert_eq!(
            validate(&data, &jon("{ type: object }")),
            Err(SchemaError::MissingProps {
                path: "$".to_string()
            })
        );
        assert!(matches!(
            validate(&data, &jon("{ type: int, mini: 'zero' }")),
            Err(SchemaError::InvalidConstraint { ref key, .. }) if key == "mini"
        ));
        assert!(matches!(
            validate(&data, &jon("{ type: string, maxLen: -1 }")),
            Err(SchemaError::InvalidConstraint { ref key, .. }) if key == "maxLen"
        ));
    }

    fn nested_array_schema(levels: usize) -> Value {
        let mut schema = jon("{ type: int }");
        for _ in 0..levels {
            schema = Object::try_from_iter([
                ("type", Value::from("array")),
                ("items", schema),
            ])
            .unwrap()
            .into();
        }
        schema
    }

    #[test]
    fn test_schema_nesting_limit() {
        let err = Schema::from_value(&nested_array_schema(MAX_DEPTH + 10)).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NestingTooDeep { limit: MAX_DEPTH, ref path }
                if path.matches(".items").count() == MAX_DEPTH
        ));

        let levels = MAX_DEPTH - 1;
        let schema = Schema::from_value(&nested_array_schema(levels)).unwrap();
        let data = jon(&format!("{}7{}", "[".repeat(levels), "]".repeat(levels)));
        assert!(schema.validate(&data).is_ok());
    }

    #[test]
    fn test_schema_errors_are_found_without_data() {
        // Nested schema problems surface even when no element exercises them.
        let err = validate(
            &jon("[]"),
            &jon("{ type: array, items: { type: object, props: { a: { type: nope } } } }"),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                path: "$.items.props.a".to_string(),
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_unreserved_keys_are_ignored() {
        let schema = "{ type: bool, description: 'feature flag' }";
        assert!(check("true", schema).is_empty());
    }

    #[test]
    fn test_validation_is_repeatable() {
        let schema = Schema::from_value(&jon(
            "{ type: array, minSize: 3, items: { type: int, maxi: 0 } }",
        ))
        .unwrap();
        let data = jon("[1, 2]");
        let first = schema.validate(&data);
        let second = schema.validate(&data);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.is_err());
    }

    #[test]
    fn test_result_display() {
        let result = validate(&jon("[1, x]"), &jon("{ type: array, items: { type: int } }")).unwrap();
        assert_eq!(result.to_string(), "$[1]: expected int, got string\n");
        let paths: Vec<&str> = result.into_iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["$[1]"]);
    }
}
