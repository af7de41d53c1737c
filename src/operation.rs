//! Operation model built from one annotated comment block.
//!
//! Each operation block describes a single channel operation: its type
//! (`pub`/`sub`/`request`), channel address, payload and optional response
//! types, plus extended metadata (tags, security, bindings, message and
//! channel details). Payload and response types are wrapped in the
//! well-known message envelopes; the schema engine unwraps them again so the
//! envelopes never surface in output.

use crate::annotation::{self, *};
use crate::type_resolver::{
    FieldDescription, FieldTags, ResolvedType, TypeKind, TypeNotation, TypeResolver,
};
use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

/// The action family of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationKind {
    Publish,
    #[default]
    Subscribe,
    Request,
}

impl OperationKind {
    /// Parses the `@type` value; anything unrecognized keeps the default
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "pub" => OperationKind::Publish,
            "sub" => OperationKind::Subscribe,
            "request" => OperationKind::Request,
            _ => OperationKind::Subscribe,
        }
    }
}

/// Message metadata plus the envelope description handed to schema inference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageInfo {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub sample: Option<ResolvedType>,
}

/// Channel parameter extracted from a `{param}` address segment
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub description: String,
}

/// External documentation reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalDocsInfo {
    pub description: Option<String>,
    pub url: Option<String>,
}

/// A parsed operation, accumulated line by line from a comment block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: String,
    pub message: MessageInfo,
    pub response: Option<MessageInfo>,
    pub parameters: IndexMap<String, ParameterInfo>,

    // Extended operation metadata
    pub security: Vec<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub external_docs: Option<ExternalDocsInfo>,
    pub bindings: IndexMap<String, IndexMap<String, Value>>,

    // Channel metadata
    pub channel_title: Option<String>,
    pub channel_description: Option<String>,

    // Message metadata
    pub content_type: Option<String>,
    pub message_title: Option<String>,
    pub message_tags: Vec<String>,
    pub correlation_id: Option<String>,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a whole comment block into an operation
    pub fn from_block(lines: &[String], resolver: &TypeResolver) -> Self {
        let mut operation = Operation::new();
        for line in lines {
            operation.parse_comment(line, resolver);
        }
        operation
    }

    /// Processes one comment line; non-annotation lines are ignored
    pub fn parse_comment(&mut self, line: &str, resolver: &TypeResolver) {
        let Some((attribute, value)) = annotation::split_attribute(line) else {
            return;
        };

        match attribute.as_str() {
            TYPE_ATTR => self.kind = OperationKind::parse(value),
            NAME_ATTR => self.set_name(value),
            DESCRIPTION_ATTR => self.message.description = non_empty(value),
            SUMMARY_ATTR => self.message.summary = non_empty(value),
            PAYLOAD_ATTR => self.parse_payload(value, resolver),
            RESPONSE_ATTR => self.parse_response(value, resolver),
            SECURITY_ATTR => self.parse_security(value),
            OPERATION_TAG_ATTR => push_non_empty(&mut self.tags, value),
            DEPRECATED_ATTR => {
                let trimmed = value.trim().to_ascii_lowercase();
                self.deprecated = trimmed == "true" || trimmed.is_empty();
            }
            OPERATION_EXTERNAL_DOCS_DESC_ATTR => {
                self.external_docs_mut().description = non_empty(value);
            }
            OPERATION_EXTERNAL_DOCS_URL_ATTR => {
                self.external_docs_mut().url = non_empty(value);
            }
            MESSAGE_CONTENT_TYPE_ATTR => self.content_type = non_empty(value),
            MESSAGE_TITLE_ATTR => self.message_title = non_empty(value),
            MESSAGE_TAG_ATTR => push_non_empty(&mut self.message_tags, value),
            MESSAGE_CORRELATION_ID_ATTR => self.correlation_id = non_empty(value),
            CHANNEL_TITLE_ATTR => self.channel_title = non_empty(value),
            CHANNEL_DESCRIPTION_ATTR => self.channel_description = non_empty(value),
            BINDING_NATS_QUEUE_ATTR => self.set_binding("nats", "queue", value),
            BINDING_NATS_DELIVER_POLICY_ATTR => self.set_binding("nats", "deliverPolicy", value),
            BINDING_AMQP_EXCHANGE_ATTR => self.set_binding("amqp", "exchange", value),
            BINDING_AMQP_ROUTING_KEY_ATTR => self.set_binding("amqp", "routingKey", value),
            BINDING_KAFKA_TOPIC_ATTR => self.set_binding("kafka", "topic", value),
            BINDING_KAFKA_PARTITIONS_ATTR => self.set_binding("kafka", "partitions", value),
            BINDING_KAFKA_REPLICAS_ATTR => self.set_binding("kafka", "replicas", value),
            _ => {}
        }
    }

    /// Sets the channel address and extracts `{param}` channel parameters
    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();

        let mut rest = name;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                break;
            };
            let param = &after[..end];
            if !param.is_empty() {
                self.parameters.insert(
                    param.to_string(),
                    ParameterInfo {
                        description: param.to_string(),
                    },
                );
            }
            rest = &after[end + 1..];
        }
    }

    fn parse_payload(&mut self, type_name: &str, resolver: &TypeResolver) {
        check_resolvable(type_name, resolver);
        self.message.sample = Some(data_envelope(type_name));
    }

    fn parse_response(&mut self, type_name: &str, resolver: &TypeResolver) {
        check_resolvable(type_name, resolver);
        let response = self.response.get_or_insert_with(MessageInfo::default);
        response.sample = Some(response_envelope(type_name));
    }

    fn parse_security(&mut self, value: &str) {
        for scheme in value.split(',') {
            push_non_empty(&mut self.security, scheme);
        }
    }

    fn set_binding(&mut self, protocol: &str, key: &str, value: &str) {
        self.bindings
            .entry(protocol.to_string())
            .or_default()
            .insert(key.to_string(), Value::String(value.trim().to_string()));
    }

    fn external_docs_mut(&mut self) -> &mut ExternalDocsInfo {
        self.external_docs.get_or_insert_with(ExternalDocsInfo::default)
    }
}

/// Warns when a payload/response type cannot be resolved. The reference is
/// still recorded; inference degrades it to a generic schema later.
fn check_resolvable(type_name: &str, resolver: &TypeResolver) {
    let notation = TypeNotation::parse(type_name);
    if crate::type_resolver::is_map_name(&notation.base) {
        return;
    }
    if resolver.resolve_base(&notation.base).is_none() {
        warn!("type '{}' not found, schema degrades to empty object", type_name);
    }
}

/// Wraps a payload type in the single-field data envelope
pub fn data_envelope(payload_type: &str) -> ResolvedType {
    ResolvedType {
        name: "Msg".to_string(),
        kind: TypeKind::Record(vec![envelope_field("data", payload_type)]),
    }
}

/// Wraps a response type in the identifier-plus-response envelope
pub fn response_envelope(payload_type: &str) -> ResolvedType {
    ResolvedType {
        name: "MsgResponse".to_string(),
        kind: TypeKind::Record(vec![
            envelope_field("id", "String"),
            envelope_field("response", payload_type),
        ]),
    }
}

fn envelope_field(name: &str, type_name: &str) -> FieldDescription {
    let notation = TypeNotation::parse(type_name);
    FieldDescription {
        name: name.to_string(),
        serialized_name: name.to_string(),
        element_type: notation.base.clone(),
        is_collection: notation.is_collection,
        is_optional: notation.is_optional,
        nested_element_type: notation.is_collection.then(|| notation.base.clone()),
        omittable: false,
        tags: FieldTags::default(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn push_non_empty(list: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        list.push(trimmed.to_string());
    }
}
