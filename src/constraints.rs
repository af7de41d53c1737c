//! Constraint rule translation.
//!
//! Field doc comments carry up to five independent annotations: `@format`,
//! `@example`, `@description`, `@required`, and `@validate` with a
//! comma-separated rule list compatible with the go-playground/validator
//! vocabulary. This module maps those annotations onto schema constraint
//! keys. The rule-key table is a wire contract with downstream AsyncAPI
//! tooling and is reproduced exactly, including the many-to-one aliases.
//!
//! Rules apply left to right; a later rule overwrites a constraint set by an
//! earlier one. Malformed rule tokens (unparseable numbers, empty pattern
//! arguments) and unrecognized keys are dropped silently so that the rest of
//! the field's rules still apply.

use crate::schema_generator::{Schema, SchemaKind};
use crate::type_resolver::FieldTags;
use serde_json::{json, Value};

/// Applies a field's raw annotations onto its inferred schema, in place.
///
/// The `@required` annotation is not handled here - it feeds the parent
/// object's required set during inference.
pub fn apply_field_tags(schema: &mut Schema, tags: &FieldTags) {
    if let Some(format) = tags.format.as_deref() {
        if !format.is_empty() {
            set(schema, "format", json!(format));
        }
    }

    if let Some(example) = tags.example.as_deref() {
        if !example.is_empty() {
            let typed = typed_value(example, schema.kind);
            set(schema, "example", typed);
        }
    }

    if let Some(description) = tags.description.as_deref() {
        if !description.is_empty() {
            set(schema, "description", json!(description));
        }
    }

    if let Some(validate) = tags.validate.as_deref() {
        apply_validation_rules(schema, validate);
    }
}

/// Parses a comma-separated validation rule list and applies each rule
pub fn apply_validation_rules(schema: &mut Schema, validate: &str) {
    for rule in validate.split(',') {
        let rule = rule.trim();
        if rule.is_empty() {
            continue;
        }

        let (key, value) = match rule.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (rule, ""),
        };

        apply_rule(schema, key, value);
    }
}

fn apply_rule(schema: &mut Schema, key: &str, value: &str) {
    match key {
        // Numeric comparisons; min/max are polymorphic on the inferred kind
        "min" => match schema.kind {
            SchemaKind::String => set_integer(schema, "minLength", value),
            SchemaKind::Array => set_integer(schema, "minItems", value),
            _ => set_number(schema, "minimum", value),
        },
        "max" => match schema.kind {
            SchemaKind::String => set_integer(schema, "maxLength", value),
            SchemaKind::Array => set_integer(schema, "maxItems", value),
            _ => set_number(schema, "maximum", value),
        },
        "gt" => set_number(schema, "exclusiveMinimum", value),
        "gte" => set_number(schema, "minimum", value),
        "lt" => set_number(schema, "exclusiveMaximum", value),
        "lte" => set_number(schema, "maximum", value),

        // Length validations
        "minLength" => set_integer(schema, "minLength", value),
        "maxLength" => set_integer(schema, "maxLength", value),
        "len" => {
            if let Ok(exact) = value.parse::<i64>() {
                match schema.kind {
                    SchemaKind::String => {
                        set(schema, "minLength", json!(exact));
                        set(schema, "maxLength", json!(exact));
                    }
                    SchemaKind::Array => {
                        set(schema, "minItems", json!(exact));
                        set(schema, "maxItems", json!(exact));
                    }
                    _ => {}
                }
            }
        }

        // Enum validations
        "oneof" | "oneOf" => {
            if !value.is_empty() {
                let entries: Vec<Value> = value
                    .split('|')
                    .map(|entry| typed_value(entry.trim(), schema.kind))
                    .collect();
                set(schema, "enum", Value::Array(entries));
            }
        }
        "eq" => {
            if !value.is_empty() {
                let constant = typed_value(value, schema.kind);
                set(schema, "const", constant);
            }
        }

        // String patterns
        "alpha" => set_pattern(schema, "^[a-zA-Z]+$"),
        "alphanum" => set_pattern(schema, "^[a-zA-Z0-9]+$"),
        "alphaspace" => set_pattern(schema, "^[a-zA-Z ]+$"),
        "alphanumunicode" => set_pattern(schema, "^[\\p{L}\\p{N}]+$"),
        "lowercase" => set_pattern(schema, "^[a-z]+$"),
        "uppercase" => set_pattern(schema, "^[A-Z]+$"),
        "numeric" => set_pattern(schema, "^[0-9]+$"),
        "hexadecimal" => set_pattern(schema, "^[0-9a-fA-F]+$"),
        "hexcolor" => set_pattern(schema, "^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$"),
        "ascii" => set_pattern(schema, "^[\\x00-\\x7F]+$"),
        "printascii" => set_pattern(schema, "^[\\x20-\\x7E]+$"),
        "startswith" => {
            if !value.is_empty() {
                let pattern = format!("^{}", escape_regex(value));
                set(schema, "pattern", json!(pattern));
            }
        }
        "endswith" => {
            if !value.is_empty() {
                let pattern = format!("{}$", escape_regex(value));
                set(schema, "pattern", json!(pattern));
            }
        }
        "contains" => {
            if !value.is_empty() {
                set(schema, "pattern", json!(escape_regex(value)));
            }
        }
        "pattern" => {
            if !value.is_empty() {
                set(schema, "pattern", json!(value));
            }
        }
        "jwt" => set_pattern(
            schema,
            "^[A-Za-z0-9-_]+\\.[A-Za-z0-9-_]+\\.[A-Za-z0-9-_]*$",
        ),

        // Format validations
        "email" => set_format(schema, "email"),
        "url" | "uri" | "http_url" => set_format(schema, "uri"),
        "uuid" | "uuid4" | "uuid_rfc4122" | "uuid3" | "uuid3_rfc4122" | "uuid5"
        | "uuid5_rfc4122" => set_format(schema, "uuid"),
        "datetime" => set_format(schema, "date-time"),
        "date" => set_format(schema, "date"),
        "time" => set_format(schema, "time"),
        "duration" => set_format(schema, "duration"),
        "hostname" | "fqdn" | "hostname_rfc1123" => set_format(schema, "hostname"),
        "ipv4" | "ip4_addr" | "ip" | "ip_addr" => set_format(schema, "ipv4"),
        "ipv6" | "ip6_addr" => set_format(schema, "ipv6"),
        "base64" | "base64url" => set_format(schema, "base64"),
        "datauri" => set_format(schema, "data-uri"),
        "json" => set(schema, "contentMediaType", json!("application/json")),

        // Geographic
        "latitude" => {
            set(schema, "minimum", json!(-90));
            set(schema, "maximum", json!(90));
        }
        "longitude" => {
            set(schema, "minimum", json!(-180));
            set(schema, "maximum", json!(180));
        }

        // Network
        "mac" => set_pattern(schema, "^([0-9A-Fa-f]{2}[:-]){5}([0-9A-Fa-f]{2})$"),
        "cidr" => set_pattern(schema, "^([0-9]{1,3}\\.){3}[0-9]{1,3}/[0-9]{1,2}$"),
        "port" => {
            set(schema, "minimum", json!(1));
            set(schema, "maximum", json!(65535));
        }

        // ISBN/ISSN
        "isbn" => set_pattern(
            schema,
            "^(?:ISBN(?:-1[03])?:? )?(?=[0-9X]{10}$|(?=(?:[0-9]+[- ]){3})[- 0-9X]{13}$|97[89][0-9]{10}$|(?=(?:[0-9]+[- ]){4})[- 0-9]{17}$)(?:97[89][- ]?)?[0-9]{1,5}[- ]?[0-9]+[- ]?[0-9]+[- ]?[0-9X]$",
        ),
        "isbn10" => set_pattern(schema, "^(?:[0-9]{9}X|[0-9]{10})$"),
        "isbn13" => set_pattern(schema, "^(?:97[89][0-9]{10})$"),
        "issn" => set_pattern(schema, "^[0-9]{4}-[0-9]{3}[0-9X]$"),

        // Credit card
        "credit_card" => set_pattern(schema, "^[0-9]{13,19}$"),

        // Cryptocurrency addresses
        "btc_addr" => set_pattern(schema, "^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$"),
        "eth_addr" => set_pattern(schema, "^0x[0-9a-fA-F]{40}$"),

        // SSN
        "ssn" => set_pattern(schema, "^[0-9]{3}-[0-9]{2}-[0-9]{4}$"),

        // Semantic versioning
        "semver" => set_pattern(
            schema,
            "^(0|[1-9]\\d*)\\.(0|[1-9]\\d*)\\.(0|[1-9]\\d*)(?:-((?:0|[1-9]\\d*|\\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\\.(?:0|[1-9]\\d*|\\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\\+([0-9a-zA-Z-]+(?:\\.[0-9a-zA-Z-]+)*))?$",
        ),

        // Phone number
        "e164" => set_pattern(schema, "^\\+[1-9]\\d{1,14}$"),

        // Array specific
        "unique" => set(schema, "uniqueItems", json!(true)),
        "dive" => {
            // Marker for nested-element validation; not applied here.
        }

        // Unrecognized keys are ignored for forward compatibility.
        _ => {}
    }
}

fn set(schema: &mut Schema, key: &str, value: Value) {
    schema.constraints.insert(key.to_string(), value);
}

fn set_integer(schema: &mut Schema, key: &str, value: &str) {
    if let Ok(parsed) = value.parse::<i64>() {
        set(schema, key, json!(parsed));
    }
}

fn set_number(schema: &mut Schema, key: &str, value: &str) {
    if let Ok(parsed) = value.parse::<f64>() {
        set(schema, key, json!(parsed));
    }
}

fn set_pattern(schema: &mut Schema, pattern: &str) {
    set(schema, "pattern", json!(pattern));
}

fn set_format(schema: &mut Schema, format: &str) {
    set(schema, "format", json!(format));
}

/// Re-types a raw annotation value to match the field's inferred kind, so
/// that examples and enum entries are schema-type-consistent. Values that do
/// not parse stay strings.
fn typed_value(value: &str, kind: SchemaKind) -> Value {
    match kind {
        SchemaKind::Integer => {
            if let Ok(parsed) = value.parse::<i64>() {
                return json!(parsed);
            }
        }
        SchemaKind::Number => {
            if let Ok(parsed) = value.parse::<f64>() {
                return json!(parsed);
            }
        }
        SchemaKind::Boolean => {
            if let Ok(parsed) = value.parse::<bool>() {
                return json!(parsed);
            }
        }
        _ => {}
    }
    json!(value)
}

/// Escapes regex metacharacters so a literal value can anchor a pattern
fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(
            character,
            '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}
