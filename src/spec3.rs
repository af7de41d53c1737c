//! AsyncAPI 3.0.0 document model.
//!
//! Serde types for the parts of the specification this generator emits.
//! In 3.0, channels and operations are separate sections: channels define
//! addresses and messages, operations define actions (send/receive) with
//! channel references. Servers use `host` instead of the 2.x `url`.
//!
//! All maps are ordered so that serialized documents are byte-stable across
//! runs.

use crate::schema_generator::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root object of an AsyncAPI 3.0.0 document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncApi {
    pub asyncapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub servers: IndexMap<String, Server>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub channels: IndexMap<String, Channel>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub operations: IndexMap<String, Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl AsyncApi {
    /// A new 3.0.0 document with empty sections.
    pub fn new() -> Self {
        Self {
            asyncapi: "3.0.0".to_string(),
            info: Info::default(),
            servers: IndexMap::new(),
            channels: IndexMap::new(),
            operations: IndexMap::new(),
            components: Some(Components::default()),
            tags: Vec::new(),
            external_docs: None,
        }
    }
}

impl Default for AsyncApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata about the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// Contact information for the exposed API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information for the exposed API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A server object. The host carries no scheme prefix; the protocol is a
/// separate field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub protocol: String,
}

/// A tag object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// A reference to external documentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

/// A channel: an address plus the messages that flow over it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub messages: IndexMap<String, Reference>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub parameters: IndexMap<String, Parameter>,
}

/// A channel parameter. Parameter schemas are always strings in 3.0, so only
/// the description survives into the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The action type of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationAction {
    /// An outgoing message (2.x `publish`)
    Send,
    /// An incoming message (2.x `subscribe`)
    Receive,
}

/// An operation: an action bound to a channel reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub action: OperationAction,
    pub channel: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<OperationReply>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<IndexMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub bindings: IndexMap<String, IndexMap<String, Value>>,
}

/// Reply configuration for request/reply patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReply {
    pub channel: Reference,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<Reference>,
}

/// A message object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Reference>,
    #[serde(rename = "correlationId", skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
}

/// An identifier for message correlation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
}

/// A `$ref` to another object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl Reference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// Reusable objects: inferred payload schemas and the messages that carry
/// them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub messages: IndexMap<String, Message>,
}
