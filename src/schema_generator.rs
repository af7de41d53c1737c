use crate::constraints;
use crate::type_resolver::{
    is_map_name, FieldDescription, PrimitiveType, ResolvedType, TypeKind, TypeNotation,
    TypeResolver,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

/// Schema generator - infers JSON-Schema-like trees from resolved type
/// descriptions (static path) or from sample JSON values (dynamic path).
///
/// Inference never fails: unresolved or unclassifiable types degrade to the
/// most generic schema for their category, so one exotic payload cannot
/// abort a whole generation run.
pub struct SchemaGenerator {
    /// Type resolver for looking up type definitions
    type_resolver: TypeResolver,
    /// Schemas already inferred, keyed by type name. Inference is pure per
    /// scope, so memoization cannot change observable output.
    memo: HashMap<String, Schema>,
    /// Record names currently being expanded, to break structural recursion
    expanding: HashSet<String>,
}

/// Schema kind - the closed set of shapes a schema node can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

/// A recursive schema tree.
///
/// An object schema produced from a record always carries `properties`
/// (possibly empty); the fallback schema for unclassifiable types is a bare
/// object with `properties` absent. Constraint annotations (bounds, pattern,
/// format, enum, description, example) are kept in an ordered map and
/// serialize flat into the schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The shape of this schema node
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    /// Properties for object schemas, in field declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object schemas
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    /// Item schema for array schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Open-ended value schema for generic key-value collections
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,
    /// Constraint annotations, applied flat onto the schema node
    #[serde(flatten)]
    pub constraints: IndexMap<String, Value>,
}

impl Schema {
    /// A schema of the given kind with nothing else set
    pub fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: None,
            required: Vec::new(),
            items: None,
            additional_properties: None,
            constraints: IndexMap::new(),
        }
    }

    /// An object schema with an explicit (possibly empty) property map
    pub fn record(properties: IndexMap<String, Schema>, required: Vec<String>) -> Self {
        Self {
            properties: Some(properties),
            required,
            ..Self::of(SchemaKind::Object)
        }
    }

    /// An array schema with a complete item schema
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaKind::Array)
        }
    }
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with a TypeResolver
    pub fn new(type_resolver: TypeResolver) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            type_resolver,
            memo: HashMap::new(),
            expanding: HashSet::new(),
        }
    }

    /// The resolver this generator infers against
    pub fn resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Infer a schema from a resolved type description (static path).
    ///
    /// This is the message-level entry point: if the description is one of
    /// the well-known envelope shapes, the envelope is unwrapped exactly once
    /// and the inner payload schema is returned. Envelope fields never appear
    /// in output.
    pub fn schema_for_description(&mut self, description: &ResolvedType) -> Schema {
        if let TypeKind::Record(fields) = &description.kind {
            if let Some(payload) = envelope_payload(fields) {
                debug!("Unwrapping envelope {}", description.name);
                return self.field_schema(payload);
            }
        }
        self.schema_for_resolved(description)
    }

    /// Infer a schema from a type name (static path).
    ///
    /// The name may carry one optionality marker and one collection marker
    /// in either the annotation (`*T`, `[]T`) or Rust (`Option<T>`, `Vec<T>`)
    /// spelling. Unknown names degrade to a bare object schema.
    pub fn schema_for_type(&mut self, type_name: &str) -> Schema {
        let notation = TypeNotation::parse(type_name);

        if notation.is_collection {
            // An empty or absent collection still gets a complete item
            // schema, inferred from the declared element type.
            let items = self.schema_for_type(&notation.base);
            return Schema::array(items);
        }

        if is_map_name(&notation.base) {
            return map_schema();
        }

        if let Some(memoized) = self.memo.get(&notation.base) {
            return memoized.clone();
        }

        match self.type_resolver.resolve_base(&notation.base) {
            Some(resolved) => self.schema_for_resolved(&resolved),
            None => {
                debug!("Unknown type: {}, using object placeholder", notation.base);
                Schema::of(SchemaKind::Object)
            }
        }
    }

    /// Infer a schema from a sample JSON value (dynamic path).
    ///
    /// Produces the same shapes as the static path for equivalent inputs.
    /// The envelope unwrap applies here too, once, at the top level.
    pub fn schema_for_value(&mut self, value: &Value) -> Schema {
        if value.is_null() {
            return Schema::of(SchemaKind::Object);
        }

        if let Value::Object(map) = value {
            if map.len() == 1 {
                if let Some(inner) = map.get("data") {
                    return self.value_schema(inner);
                }
            }
            if let Some(inner) = map.get("response") {
                return self.value_schema(inner);
            }
        }

        self.value_schema(value)
    }

    fn schema_for_resolved(&mut self, resolved: &ResolvedType) -> Schema {
        match &resolved.kind {
            TypeKind::Primitive(primitive) => primitive_schema(*primitive),
            TypeKind::DateTime => datetime_schema(),
            TypeKind::Record(fields) => self.record_schema(&resolved.name, fields),
        }
    }

    /// Build an object schema from a record's visible fields
    fn record_schema(&mut self, name: &str, fields: &[FieldDescription]) -> Schema {
        if !self.expanding.insert(name.to_string()) {
            warn!("Recursive reference to type {}, emitting open object", name);
            return Schema::of(SchemaKind::Object);
        }

        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for field in fields {
            let mut field_schema = self.field_schema(field);
            constraints::apply_field_tags(&mut field_schema, &field.tags);

            if is_required(field) {
                required.push(field.serialized_name.clone());
            }
            properties.insert(field.serialized_name.clone(), field_schema);
        }

        self.expanding.remove(name);

        let schema = Schema::record(properties, required);
        self.memo.insert(name.to_string(), schema.clone());
        schema
    }

    /// Schema for a single field's value type
    fn field_schema(&mut self, field: &FieldDescription) -> Schema {
        if field.is_collection {
            let element = field.nested_element_type.as_deref().unwrap_or("Unknown");
            return Schema::array(self.schema_for_type(element));
        }
        self.schema_for_type(&field.element_type)
    }

    fn value_schema(&mut self, value: &Value) -> Schema {
        match value {
            Value::Null => Schema::of(SchemaKind::Null),
            Value::Bool(_) => Schema::of(SchemaKind::Boolean),
            Value::Number(number) => {
                if number.is_f64() {
                    Schema::of(SchemaKind::Number)
                } else {
                    Schema::of(SchemaKind::Integer)
                }
            }
            Value::String(_) => Schema::of(SchemaKind::String),
            Value::Array(elements) => match elements.first() {
                Some(first) => Schema::array(self.value_schema(first)),
                // A bare value carries no element type information.
                None => Schema::array(Schema::of(SchemaKind::Object)),
            },
            Value::Object(map) => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();
                for (key, entry) in map {
                    properties.insert(key.clone(), self.value_schema(entry));
                    required.push(key.clone());
                }
                Schema::record(properties, required)
            }
        }
    }
}

/// A field is required unless serde marks it omissible or it is optional,
/// with the explicit `@required true` annotation overriding both.
fn is_required(field: &FieldDescription) -> bool {
    if field.tags.required.as_deref() == Some("true") {
        return true;
    }
    !field.omittable && !field.is_optional
}

/// Detects the well-known envelope shapes: a data envelope (single field
/// serialized as `data`) or a response envelope (an identifier plus a field
/// serialized as `response`). Returns the payload field to recurse into.
fn envelope_payload(fields: &[FieldDescription]) -> Option<&FieldDescription> {
    if fields.len() == 1 && fields[0].serialized_name == "data" {
        return Some(&fields[0]);
    }
    fields
        .iter()
        .find(|field| field.serialized_name == "response")
}

fn primitive_schema(primitive: PrimitiveType) -> Schema {
    use PrimitiveType::*;

    let kind = match primitive {
        String | Char => SchemaKind::String,
        I8 | I16 | I32 | I64 | I128 | Isize | U8 | U16 | U32 | U64 | U128 | Usize => {
            SchemaKind::Integer
        }
        F32 | F64 => SchemaKind::Number,
        Bool => SchemaKind::Boolean,
    };

    Schema::of(kind)
}

fn datetime_schema() -> Schema {
    let mut schema = Schema::of(SchemaKind::String);
    schema
        .constraints
        .insert("format".to_string(), json!("date-time"));
    schema
}

fn map_schema() -> Schema {
    let mut schema = Schema::of(SchemaKind::Object);
    schema.additional_properties = Some(Box::new(Schema::of(SchemaKind::Object)));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use crate::type_resolver::FieldTags;
    use std::fs;
    use tempfile::TempDir;

    /// Helper function to create a SchemaGenerator from code
    fn create_generator_from_code(code: &str) -> SchemaGenerator {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.rs");
        fs::write(&file_path, code).unwrap();
        let parsed = AstParser::parse_file(&file_path).unwrap();
        SchemaGenerator::new(TypeResolver::new(vec![parsed]))
    }

    fn plain_field(name: &str, element_type: &str) -> FieldDescription {
        FieldDescription {
            name: name.to_string(),
            serialized_name: name.to_string(),
            element_type: element_type.to_string(),
            is_collection: false,
            is_optional: false,
            nested_element_type: None,
            omittable: false,
            tags: FieldTags::default(),
        }
    }

    #[test]
    fn test_primitive_schemas() {
        let mut generator = create_generator_from_code("");

        assert_eq!(
            generator.schema_for_type("String").kind,
            SchemaKind::String
        );
        assert_eq!(generator.schema_for_type("i32").kind, SchemaKind::Integer);
        assert_eq!(generator.schema_for_type("u64").kind, SchemaKind::Integer);
        assert_eq!(generator.schema_for_type("f32").kind, SchemaKind::Number);
        assert_eq!(generator.schema_for_type("f64").kind, SchemaKind::Number);
        assert_eq!(generator.schema_for_type("bool").kind, SchemaKind::Boolean);
    }

    #[test]
    fn test_datetime_schema() {
        let mut generator = create_generator_from_code("");
        let schema = generator.schema_for_type("DateTime");

        assert_eq!(schema.kind, SchemaKind::String);
        assert_eq!(schema.constraints["format"], json!("date-time"));
    }

    #[test]
    fn test_collection_schema_has_complete_items() {
        let code = r#"
            pub struct Item {
                pub id: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);

        for spelling in ["Vec<Item>", "[]Item"] {
            let schema = generator.schema_for_type(spelling);
            assert_eq!(schema.kind, SchemaKind::Array);

            let items = schema.items.expect("array schema must carry items");
            assert_eq!(items.kind, SchemaKind::Object);
            let properties = items.properties.expect("item schema must be fully shaped");
            assert!(properties.contains_key("id"));
        }
    }

    #[test]
    fn test_optional_unwraps_to_pointee() {
        let mut generator = create_generator_from_code("");

        let schema = generator.schema_for_type("Option<i64>");
        assert_eq!(schema.kind, SchemaKind::Integer);

        let schema = generator.schema_for_type("*f64");
        assert_eq!(schema.kind, SchemaKind::Number);
    }

    #[test]
    fn test_struct_schema() {
        let code = r#"
            pub struct User {
                pub id: u32,
                pub name: String,
                pub active: bool,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        assert_eq!(schema.kind, SchemaKind::Object);
        let properties = schema.properties.as_ref().unwrap();
        let keys: Vec<_> = properties.keys().collect();
        assert_eq!(keys, vec!["id", "name", "active"]);
        assert_eq!(schema.required, vec!["id", "name", "active"]);
    }

    #[test]
    fn test_optional_field_not_required() {
        let code = r#"
            pub struct User {
                pub id: u32,
                pub email: Option<String>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        assert_eq!(schema.required, vec!["id"]);
        // The optional field still appears in properties, as its pointee.
        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties["email"].kind, SchemaKind::String);
    }

    #[test]
    fn test_required_override_tag() {
        let code = r#"
            pub struct User {
                /// @required true
                #[serde(skip_serializing_if = "Option::is_none")]
                pub email: Option<String>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        assert_eq!(schema.required, vec!["email"]);
    }

    #[test]
    fn test_serde_rename_used_in_properties() {
        let code = r#"
            pub struct User {
                #[serde(rename = "userId")]
                pub user_id: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        let properties = schema.properties.as_ref().unwrap();
        assert!(properties.contains_key("userId"));
        assert!(!properties.contains_key("user_id"));
        assert_eq!(schema.required, vec!["userId"]);
    }

    #[test]
    fn test_excluded_field_invisible() {
        let code = r#"
            pub struct User {
                pub id: u32,
                #[serde(skip)]
                pub password: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        assert!(!properties.contains_key("password"));
        assert_eq!(schema.required, vec!["id"]);
    }

    #[test]
    fn test_nested_struct_inlined() {
        let code = r#"
            pub struct User {
                pub id: u32,
                pub profile: Profile,
            }

            pub struct Profile {
                pub bio: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("User");

        let properties = schema.properties.as_ref().unwrap();
        let profile = &properties["profile"];
        assert_eq!(profile.kind, SchemaKind::Object);
        let profile_props = profile.properties.as_ref().unwrap();
        assert_eq!(profile_props["bio"].kind, SchemaKind::String);
    }

    #[test]
    fn test_map_field_open_object() {
        let code = r#"
            use std::collections::HashMap;

            pub struct Event {
                pub labels: HashMap<String, String>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("Event");

        let properties = schema.properties.as_ref().unwrap();
        let labels = &properties["labels"];
        assert_eq!(labels.kind, SchemaKind::Object);
        assert!(labels.properties.is_none());
        assert_eq!(
            labels.additional_properties.as_ref().unwrap().kind,
            SchemaKind::Object
        );
    }

    #[test]
    fn test_unknown_type_fallback() {
        let mut generator = create_generator_from_code("");
        let schema = generator.schema_for_type("CompletelyUnknown");

        assert_eq!(schema.kind, SchemaKind::Object);
        assert!(schema.properties.is_none());
    }

    #[test]
    fn test_recursive_type_degrades() {
        let code = r#"
            pub struct Node {
                pub value: i32,
                pub next: Option<Box<Node>>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("Node");

        assert_eq!(schema.kind, SchemaKind::Object);
        let properties = schema.properties.as_ref().unwrap();
        // The recursive reference degrades to an open object instead of
        // looping forever.
        assert_eq!(properties["next"].kind, SchemaKind::Object);
        assert!(properties["next"].properties.is_none());
    }

    #[test]
    fn test_inference_is_idempotent() {
        let code = r#"
            pub struct User {
                pub id: u32,
                pub tags: Vec<String>,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let first = generator.schema_for_type("User");
        let second = generator.schema_for_type("User");

        assert_eq!(first, second);
    }

    #[test]
    fn test_data_envelope_transparent() {
        let code = r#"
            pub struct UserEvent {
                pub user_id: String,
                pub email: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);

        let envelope = ResolvedType {
            name: "Msg".to_string(),
            kind: TypeKind::Record(vec![plain_field("data", "UserEvent")]),
        };

        let unwrapped = generator.schema_for_description(&envelope);
        let direct = generator.schema_for_type("UserEvent");

        assert_eq!(unwrapped, direct);
        let properties = unwrapped.properties.as_ref().unwrap();
        assert!(!properties.contains_key("data"));
        assert!(properties.contains_key("user_id"));
    }

    #[test]
    fn test_response_envelope_transparent() {
        let code = r#"
            pub struct UserResponse {
                pub success: bool,
                pub message: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);

        let envelope = ResolvedType {
            name: "MsgResponse".to_string(),
            kind: TypeKind::Record(vec![
                plain_field("id", "String"),
                plain_field("response", "UserResponse"),
            ]),
        };

        let schema = generator.schema_for_description(&envelope);

        let properties = schema.properties.as_ref().unwrap();
        assert!(!properties.contains_key("id"));
        assert!(!properties.contains_key("response"));
        assert!(properties.contains_key("success"));
        assert!(properties.contains_key("message"));
    }

    #[test]
    fn test_envelope_with_excluded_field_both_invisible() {
        let code = r#"
            pub struct Payload {
                #[serde(skip)]
                pub id: String,
                pub value: String,
            }
        "#;

        let mut generator = create_generator_from_code(code);

        let envelope = ResolvedType {
            name: "Msg".to_string(),
            kind: TypeKind::Record(vec![plain_field("data", "Payload")]),
        };

        let schema = generator.schema_for_description(&envelope);

        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        assert!(properties.contains_key("value"));
        assert!(!properties.contains_key("id"));
        assert!(!properties.contains_key("data"));
        assert_eq!(schema.required, vec!["value"]);
    }

    #[test]
    fn test_envelope_unwrap_is_top_level_only() {
        let code = r#"
            pub struct Inner {
                pub data: String,
            }

            pub struct Outer {
                pub inner: Inner,
                pub count: u32,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("Outer");

        // Nested types that merely happen to have a `data` field keep it.
        let properties = schema.properties.as_ref().unwrap();
        let inner_props = properties["inner"].properties.as_ref().unwrap();
        assert!(inner_props.contains_key("data"));
    }

    #[test]
    fn test_value_path_basic_kinds() {
        let mut generator = create_generator_from_code("");

        assert_eq!(
            generator.schema_for_value(&json!("text")).kind,
            SchemaKind::String
        );
        assert_eq!(
            generator.schema_for_value(&json!(true)).kind,
            SchemaKind::Boolean
        );
        assert_eq!(
            generator.schema_for_value(&json!(42)).kind,
            SchemaKind::Integer
        );
        assert_eq!(
            generator.schema_for_value(&json!(3.5)).kind,
            SchemaKind::Number
        );
        // A top-level null sample degrades to the generic object schema.
        assert_eq!(
            generator.schema_for_value(&Value::Null).kind,
            SchemaKind::Object
        );
    }

    #[test]
    fn test_value_path_object_and_array() {
        let mut generator = create_generator_from_code("");

        let schema = generator.schema_for_value(&json!({
            "name": "John",
            "age": 30,
        }));

        assert_eq!(schema.kind, SchemaKind::Object);
        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties["name"].kind, SchemaKind::String);
        assert_eq!(properties["age"].kind, SchemaKind::Integer);

        let schema = generator.schema_for_value(&json!([{"id": "1"}]));
        assert_eq!(schema.kind, SchemaKind::Array);
        assert_eq!(schema.items.unwrap().kind, SchemaKind::Object);
    }

    #[test]
    fn test_value_path_nested_null_is_null_kind() {
        let mut generator = create_generator_from_code("");

        let schema = generator.schema_for_value(&json!({"maybe": null}));
        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties["maybe"].kind, SchemaKind::Null);
    }

    #[test]
    fn test_value_path_envelope_unwrap() {
        let mut generator = create_generator_from_code("");

        let schema = generator.schema_for_value(&json!({
            "data": {"userId": "123"}
        }));

        let properties = schema.properties.as_ref().unwrap();
        assert!(!properties.contains_key("data"));
        assert!(properties.contains_key("userId"));
    }

    #[test]
    fn test_spec_scenario_name_and_age() {
        let code = r#"
            pub struct Person {
                pub name: String,
                /// @validate gte=0,lte=150
                pub age: i64,
            }
        "#;

        let mut generator = create_generator_from_code(code);
        let schema = generator.schema_for_type("Person");

        assert_eq!(schema.kind, SchemaKind::Object);
        assert_eq!(schema.required, vec!["name", "age"]);

        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties["name"].kind, SchemaKind::String);
        let age = &properties["age"];
        assert_eq!(age.kind, SchemaKind::Integer);
        assert_eq!(age.constraints["minimum"], json!(0.0));
        assert_eq!(age.constraints["maximum"], json!(150.0));
    }
}
