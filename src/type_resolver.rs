use crate::annotation::{
    self, DESCRIPTION_ATTR, EXAMPLE_ATTR, FORMAT_ATTR, REQUIRED_ATTR, VALIDATE_ATTR,
};
use crate::parser::ParsedFile;
use log::debug;

/// Type resolver - resolves type names against the parsed source scope and
/// produces normalized type descriptions for schema inference.
pub struct TypeResolver {
    /// All parsed files forming the resolution scope
    parsed_files: Vec<ParsedFile>,
}

/// Normalized description of a resolved type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    /// The type name as requested
    pub name: String,
    /// The kind of type
    pub kind: TypeKind,
}

/// Type kind - a closed set of categories the schema engine dispatches on
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A record (struct) type with visible fields, in declaration order
    Record(Vec<FieldDescription>),
    /// A built-in primitive type
    Primitive(PrimitiveType),
    /// A well-known date/time value type
    DateTime,
}

/// Primitive types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
}

/// Normalized description of one visible struct field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescription {
    /// Field name as declared
    pub name: String,
    /// Name used in the output schema (serde rename or the declared name)
    pub serialized_name: String,
    /// The field's value type, unwrapped of the optionality wrapper
    pub element_type: String,
    /// Whether the field is a repeated/array value
    pub is_collection: bool,
    /// Whether the field is wrapped in `Option<T>`
    pub is_optional: bool,
    /// Contained element type when `is_collection` is true
    pub nested_element_type: Option<String>,
    /// Whether serde marks the field omissible (`skip_serializing_if`/`default`)
    pub omittable: bool,
    /// Raw field-level annotations consumed by the inference engine
    pub tags: FieldTags,
}

/// Raw annotation strings attached to a field's doc comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTags {
    pub format: Option<String>,
    pub example: Option<String>,
    pub description: Option<String>,
    pub required: Option<String>,
    pub validate: Option<String>,
}

/// Serde attributes recognized on a field
#[derive(Debug, Clone, Default, PartialEq)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
    omit_hint: bool,
}

/// A type name split into its wrapper markers and base identifier.
///
/// Accepts both the annotation spellings (`*Name`, `[]Name`) and the Rust
/// spellings (`Option<Name>`, `Vec<Name>`, `&Name`). One optionality marker
/// and one collection marker are stripped, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNotation {
    pub base: String,
    pub is_optional: bool,
    pub is_collection: bool,
}

impl TypeNotation {
    pub fn parse(type_name: &str) -> Self {
        let mut name = type_name.trim().to_string();
        let mut is_optional = false;
        let mut is_collection = false;

        if let Some(rest) = name.strip_prefix('*') {
            name = rest.trim().to_string();
            is_optional = true;
        } else if let Some(inner) = strip_generic(&name, "Option") {
            name = inner;
            is_optional = true;
        } else if let Some(rest) = name.strip_prefix('&') {
            name = rest.trim_start_matches("mut ").trim().to_string();
        }

        if let Some(rest) = name.strip_prefix("[]") {
            name = rest.trim().to_string();
            is_collection = true;
        } else if let Some(inner) = strip_generic(&name, "Vec") {
            name = inner;
            is_collection = true;
        }

        TypeNotation {
            base: name,
            is_optional,
            is_collection,
        }
    }
}

/// Strips one `Wrapper<...>` layer, returning the inner type text
fn strip_generic(name: &str, wrapper: &str) -> Option<String> {
    let rest = name.strip_prefix(wrapper)?.trim_start();
    let inner = rest.strip_prefix('<')?.strip_suffix('>')?;
    Some(inner.trim().to_string())
}

/// Parses a primitive type name
pub fn parse_primitive(type_name: &str) -> Option<PrimitiveType> {
    match bare_name(type_name) {
        "String" | "str" => Some(PrimitiveType::String),
        "char" => Some(PrimitiveType::Char),
        "i8" => Some(PrimitiveType::I8),
        "i16" => Some(PrimitiveType::I16),
        "i32" => Some(PrimitiveType::I32),
        "i64" => Some(PrimitiveType::I64),
        "i128" => Some(PrimitiveType::I128),
        "isize" => Some(PrimitiveType::Isize),
        "u8" => Some(PrimitiveType::U8),
        "u16" => Some(PrimitiveType::U16),
        "u32" => Some(PrimitiveType::U32),
        "u64" => Some(PrimitiveType::U64),
        "u128" => Some(PrimitiveType::U128),
        "usize" => Some(PrimitiveType::Usize),
        "f32" => Some(PrimitiveType::F32),
        "f64" => Some(PrimitiveType::F64),
        "bool" => Some(PrimitiveType::Bool),
        _ => None,
    }
}

/// Whether a type name denotes a well-known date/time value type
pub fn is_datetime_name(type_name: &str) -> bool {
    matches!(
        bare_name(type_name),
        "DateTime" | "NaiveDateTime" | "SystemTime"
    )
}

/// Whether a type name denotes a generic key-value collection
pub fn is_map_name(type_name: &str) -> bool {
    matches!(bare_name(type_name), "HashMap" | "BTreeMap")
}

/// Final path segment of a type name, with any generic arguments removed
fn bare_name(type_name: &str) -> &str {
    let without_args = type_name.split('<').next().unwrap_or(type_name).trim();
    without_args
        .rsplit("::")
        .next()
        .unwrap_or(without_args)
        .trim()
}

impl TypeResolver {
    /// Create a new TypeResolver over a set of parsed files
    pub fn new(parsed_files: Vec<ParsedFile>) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        Self { parsed_files }
    }

    /// Resolve a type name to a normalized description.
    ///
    /// Wrapper markers are stripped before lookup; primitives and date/time
    /// types resolve without any field traversal. Returns `None` when the
    /// name is unknown to the scope - the caller is expected to degrade to an
    /// empty-shape placeholder rather than abort.
    pub fn resolve(&self, type_name: &str) -> Option<ResolvedType> {
        let notation = TypeNotation::parse(type_name);
        self.resolve_base(&notation.base)
    }

    /// Resolve a base identifier (no wrapper markers)
    pub fn resolve_base(&self, name: &str) -> Option<ResolvedType> {
        debug!("Resolving type: {}", name);

        if let Some(primitive) = parse_primitive(name) {
            return Some(ResolvedType {
                name: name.to_string(),
                kind: TypeKind::Primitive(primitive),
            });
        }

        if is_datetime_name(name) {
            return Some(ResolvedType {
                name: name.to_string(),
                kind: TypeKind::DateTime,
            });
        }

        // Path-qualified names can only match by their final segment, since
        // struct identifiers in the syntax tree are bare.
        let item_struct = self
            .find_struct(name)
            .or_else(|| self.find_struct(bare_name(name)))?;

        Some(self.describe_struct(name, item_struct))
    }

    /// Find a struct definition by name across all parsed files
    fn find_struct(&self, name: &str) -> Option<&syn::ItemStruct> {
        for parsed_file in &self.parsed_files {
            for item in &parsed_file.syntax_tree.items {
                if let syn::Item::Struct(item_struct) = item {
                    if item_struct.ident == name {
                        debug!("Found struct {} in {}", name, parsed_file.path.display());
                        return Some(item_struct);
                    }
                }
            }
        }
        None
    }

    /// Build a ResolvedType from a struct definition
    fn describe_struct(&self, name: &str, item_struct: &syn::ItemStruct) -> ResolvedType {
        let mut fields = Vec::new();

        if let syn::Fields::Named(named_fields) = &item_struct.fields {
            for field in &named_fields.named {
                if let Some(description) = describe_field(field) {
                    fields.push(description);
                }
            }
        }

        debug!("Described {} with {} visible fields", name, fields.len());

        ResolvedType {
            name: name.to_string(),
            kind: TypeKind::Record(fields),
        }
    }
}

/// Describe a single named field. Returns `None` for private fields and for
/// fields excluded via `#[serde(skip)]`.
fn describe_field(field: &syn::Field) -> Option<FieldDescription> {
    let name = field.ident.as_ref()?.to_string();

    if !matches!(field.vis, syn::Visibility::Public(_)) {
        return None;
    }

    let serde_attrs = parse_serde_attributes(&field.attrs);
    if serde_attrs.skip {
        debug!("Field {} excluded via serde skip", name);
        return None;
    }

    let shape = classify_type(&field.ty);
    let serialized_name = serde_attrs.rename.unwrap_or_else(|| name.clone());

    Some(FieldDescription {
        name,
        serialized_name,
        element_type: shape.element_type,
        is_collection: shape.is_collection,
        is_optional: shape.is_optional,
        nested_element_type: shape.nested_element_type,
        omittable: serde_attrs.omit_hint,
        tags: parse_field_tags(&field.attrs),
    })
}

/// Shape of a field's type after unwrapping well-known wrappers
#[derive(Debug, Clone, PartialEq)]
struct FieldShape {
    element_type: String,
    is_collection: bool,
    is_optional: bool,
    nested_element_type: Option<String>,
}

impl FieldShape {
    fn plain(element_type: String) -> Self {
        Self {
            element_type,
            is_collection: false,
            is_optional: false,
            nested_element_type: None,
        }
    }

    fn collection(element: String) -> Self {
        Self {
            element_type: format!("Vec<{}>", element),
            is_collection: true,
            is_optional: false,
            nested_element_type: Some(element),
        }
    }
}

/// Classify a field's declared type.
///
/// `Option<T>` marks optionality, `Vec<T>`, slices, and arrays mark
/// collections, `Box<T>` and references are transparent. Anything the
/// classifier does not recognize keeps its printed name and is resolved (or
/// degraded) later by the inference engine.
fn classify_type(ty: &syn::Type) -> FieldShape {
    match ty {
        syn::Type::Reference(reference) => classify_type(&reference.elem),
        syn::Type::Slice(slice) => FieldShape::collection(element_name(&slice.elem)),
        syn::Type::Array(array) => FieldShape::collection(element_name(&array.elem)),
        syn::Type::Path(type_path) => classify_path(&type_path.path),
        _ => FieldShape::plain("Unknown".to_string()),
    }
}

fn classify_path(path: &syn::Path) -> FieldShape {
    let Some(segment) = path.segments.last() else {
        return FieldShape::plain("Unknown".to_string());
    };

    match segment.ident.to_string().as_str() {
        "Option" => {
            if let Some(inner) = first_type_argument(segment) {
                let mut shape = classify_type(inner);
                shape.is_optional = true;
                return shape;
            }
        }
        "Vec" => {
            if let Some(inner) = first_type_argument(segment) {
                return FieldShape::collection(element_name(inner));
            }
        }
        "Box" => {
            if let Some(inner) = first_type_argument(segment) {
                return classify_type(inner);
            }
        }
        _ => {}
    }

    FieldShape::plain(path_name(path))
}

/// First generic type argument of a path segment, if any
fn first_type_argument(segment: &syn::PathSegment) -> Option<&syn::Type> {
    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
        for arg in &args.args {
            if let syn::GenericArgument::Type(inner) = arg {
                return Some(inner);
            }
        }
    }
    None
}

/// Printable name for a collection element type
fn element_name(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => path_name(&type_path.path),
        syn::Type::Reference(reference) => element_name(&reference.elem),
        _ => "Unknown".to_string(),
    }
}

/// Path rendered as `a::b::Name`, generic arguments dropped
fn path_name(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Parse serde attributes from field attributes
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        let Ok(meta_list) = attr.meta.require_list() else {
            continue;
        };
        let tokens_str = meta_list.tokens.to_string();

        for piece in tokens_str.split(',') {
            let piece = piece.trim();

            if piece == "skip" || piece == "skip_serializing" {
                serde_attrs.skip = true;
            } else if piece.starts_with("skip_serializing_if")
                || piece == "default"
                || piece.starts_with("default ")
                || piece.starts_with("default=")
            {
                serde_attrs.omit_hint = true;
            } else if let Some(value) = extract_rename_value(piece) {
                serde_attrs.rename = Some(value);
            }
        }
    }

    serde_attrs
}

/// Extract the quoted value from a `rename = "value"` attribute piece
fn extract_rename_value(piece: &str) -> Option<String> {
    let rest = piece.strip_prefix("rename")?.trim_start();
    let rest = rest.strip_prefix('=')?;
    let start = rest.find('"')?;
    let after_start = &rest[start + 1..];
    let end = after_start.find('"')?;
    Some(after_start[..end].to_string())
}

/// Collect the raw `@format`/`@example`/`@description`/`@required`/`@validate`
/// annotations from a field's doc comment
fn parse_field_tags(attrs: &[syn::Attribute]) -> FieldTags {
    let mut tags = FieldTags::default();

    for line in annotation::doc_lines(attrs) {
        let Some((attribute, value)) = annotation::split_attribute(&line) else {
            continue;
        };
        let value = value.to_string();
        match attribute.as_str() {
            FORMAT_ATTR => tags.format = Some(value),
            EXAMPLE_ATTR => tags.example = Some(value),
            DESCRIPTION_ATTR => tags.description = Some(value),
            REQUIRED_ATTR => tags.required = Some(value),
            VALIDATE_ATTR => tags.validate = Some(value),
            _ => {}
        }
    }

    tags
}
