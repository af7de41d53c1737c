//! AsyncAPI document assembly.
//!
//! The builder consumes service-level comment blocks and parsed operations
//! and places them into the channels/operations/components sections of an
//! AsyncAPI 3.0 document. Payload schemas are registered under
//! `components.schemas` and referenced via `$ref`; the builder has no insight
//! into how a schema was inferred.
//!
//! Assembly is best-effort throughout. The single fatal condition is missing
//! service identity metadata (title, version, or a server), checked in
//! [`AsyncApiBuilder::build`].

use crate::annotation::{self, *};
use crate::operation::{MessageInfo, Operation, OperationKind};
use crate::schema_generator::SchemaGenerator;
use crate::spec3::{
    AsyncApi, Channel, Components, Contact, CorrelationId, ExternalDocs, License, Message,
    OperationAction, OperationReply, Parameter, Reference, Tag,
};
use anyhow::Result;
use indexmap::IndexMap;
use log::debug;

/// AsyncAPI document builder
pub struct AsyncApiBuilder {
    document: AsyncApi,
    /// Protocol from the most recent `@protocol` line; consumed when a
    /// server host is declared.
    protocol: String,
    /// Server name derived from the title, or `default`
    server_name: String,
}

impl AsyncApiBuilder {
    pub fn new() -> Self {
        debug!("Initializing AsyncApiBuilder");
        Self {
            document: AsyncApi::new(),
            protocol: String::new(),
            server_name: String::new(),
        }
    }

    /// Parses a service-level comment block into the document's info,
    /// servers, tags, and external docs sections.
    ///
    /// A `@protocol` line must precede the `@url`/`@host` line it applies to;
    /// the server is registered at the host line with whatever protocol has
    /// been seen so far.
    pub fn parse_service_block(&mut self, lines: &[String]) {
        let mut external_docs = ExternalDocs::default();

        for line in lines {
            let Some((attribute, value)) = annotation::split_attribute(line) else {
                continue;
            };
            let value = value.trim();

            match attribute.as_str() {
                TITLE_ATTR => {
                    self.document.info.title = value.to_string();
                    if self.server_name.is_empty() {
                        self.server_name = value.to_lowercase().replace(' ', "-");
                    }
                }
                VERSION_ATTR => self.document.info.version = value.to_string(),
                DESCRIPTION_ATTR => self.document.info.description = non_empty(value),
                TERMS_OF_SERVICE_ATTR => self.document.info.terms_of_service = non_empty(value),
                CONTACT_NAME_ATTR => self.contact_mut().name = non_empty(value),
                CONTACT_URL_ATTR => self.contact_mut().url = non_empty(value),
                CONTACT_EMAIL_ATTR => self.contact_mut().email = non_empty(value),
                LICENSE_NAME_ATTR => self.license_mut().name = value.to_string(),
                LICENSE_URL_ATTR => self.license_mut().url = non_empty(value),
                TAG_ATTR => self.document.tags.push(parse_tag(value)),
                EXTERNAL_DOCS_DESC_ATTR => external_docs.description = non_empty(value),
                EXTERNAL_DOCS_URL_ATTR => external_docs.url = value.to_string(),
                PROTOCOL_ATTR => self.protocol = value.to_string(),
                URL_ATTR | HOST_ATTR => self.register_server(value),
                _ => {}
            }
        }

        if !external_docs.url.is_empty() {
            self.document.external_docs = Some(external_docs);
        }
    }

    /// Registers a server under the derived name, stripping any scheme
    /// prefix from the host (`nats://localhost:4222` becomes
    /// `localhost:4222`).
    fn register_server(&mut self, value: &str) {
        if self.server_name.is_empty() {
            self.server_name = "default".to_string();
        }

        let host = match value.find("://") {
            Some(idx) => &value[idx + 3..],
            None => value,
        };

        self.document.servers.insert(
            self.server_name.clone(),
            crate::spec3::Server {
                host: host.to_string(),
                protocol: self.protocol.clone(),
            },
        );
    }

    /// Converts a parsed operation into its channel, operation, message, and
    /// schema entries. Operations without a channel address are skipped.
    pub fn add_operation(&mut self, operation: &Operation, generator: &mut SchemaGenerator) {
        if operation.name.is_empty() {
            return;
        }

        let channel_name = to_channel_name(&operation.name);
        let message_name = format!("{}Message", channel_name);

        let (action, operation_name) = action_and_name(operation.kind, &channel_name);
        let parameters = self.channel_parameters(operation);

        debug!("Adding operation {} on channel {}", operation_name, channel_name);

        self.register_message(&message_name, &operation.message, generator);
        self.apply_message_metadata(&message_name, operation);

        self.register_channel(
            &channel_name,
            &operation.name,
            &message_name,
            parameters.clone(),
            operation.channel_title.clone(),
            operation.channel_description.clone(),
        );

        let mut spec_operation = crate::spec3::Operation {
            action,
            channel: Reference::to(format!("#/channels/{}", channel_name)),
            summary: operation.message.summary.clone(),
            description: operation.message.description.clone(),
            messages: vec![Reference::to(format!(
                "#/channels/{}/messages/{}",
                channel_name, message_name
            ))],
            reply: None,
            tags: operation.tags.iter().map(Tag::named).collect(),
            external_docs: operation.external_docs.as_ref().and_then(|docs| {
                docs.url.as_ref().map(|url| ExternalDocs {
                    description: docs.description.clone(),
                    url: url.clone(),
                })
            }),
            security: operation
                .security
                .iter()
                .map(|scheme| {
                    let mut requirement = IndexMap::new();
                    requirement.insert(scheme.clone(), Vec::new());
                    requirement
                })
                .collect(),
            bindings: operation.bindings.clone(),
        };

        // The presence of a response alone establishes the request-reply
        // pattern, for any operation type.
        if let Some(response) = &operation.response {
            spec_operation.reply =
                Some(self.reply_configuration(&channel_name, operation, response, parameters, generator));
        }

        self.document
            .operations
            .insert(operation_name, spec_operation);
    }

    fn channel_parameters(&self, operation: &Operation) -> IndexMap<String, Parameter> {
        operation
            .parameters
            .iter()
            .map(|(name, info)| {
                (
                    name.clone(),
                    Parameter {
                        description: Some(info.description.clone()),
                    },
                )
            })
            .collect()
    }

    /// Creates a message, infers its payload schema, and registers both in
    /// the components section.
    fn register_message(
        &mut self,
        message_name: &str,
        info: &MessageInfo,
        generator: &mut SchemaGenerator,
    ) {
        let mut message = Message {
            name: Some(message_name.to_string()),
            summary: info.summary.clone(),
            description: info.description.clone(),
            ..Message::default()
        };

        if let Some(sample) = &info.sample {
            let schema_name = format!("{}Payload", message_name);
            let schema = generator.schema_for_description(sample);
            self.components_mut()
                .schemas
                .insert(schema_name.clone(), schema);
            message.payload = Some(Reference::to(format!(
                "#/components/schemas/{}",
                schema_name
            )));
        }

        self.components_mut()
            .messages
            .insert(message_name.to_string(), message);
    }

    /// Applies `@message.*` metadata onto an already-registered message.
    /// Only the primary message carries this metadata, never the reply.
    fn apply_message_metadata(&mut self, message_name: &str, operation: &Operation) {
        let Some(message) = self.components_mut().messages.get_mut(message_name) else {
            return;
        };

        message.title = operation.message_title.clone();
        message.content_type = operation.content_type.clone();
        message.tags = operation.message_tags.iter().map(Tag::named).collect();
        message.correlation_id = operation
            .correlation_id
            .as_ref()
            .map(|location| CorrelationId {
                description: None,
                location: location.clone(),
            });
    }

    fn register_channel(
        &mut self,
        channel_name: &str,
        address: &str,
        message_name: &str,
        parameters: IndexMap<String, Parameter>,
        title: Option<String>,
        description: Option<String>,
    ) {
        let mut messages = IndexMap::new();
        messages.insert(
            message_name.to_string(),
            Reference::to(format!("#/components/messages/{}", message_name)),
        );

        self.document.channels.insert(
            channel_name.to_string(),
            Channel {
                address: address.to_string(),
                title,
                description,
                messages,
                parameters,
            },
        );
    }

    /// Registers the reply channel and message for a request-reply operation
    /// and returns the reply configuration.
    fn reply_configuration(
        &mut self,
        channel_name: &str,
        operation: &Operation,
        response: &MessageInfo,
        parameters: IndexMap<String, Parameter>,
        generator: &mut SchemaGenerator,
    ) -> OperationReply {
        let reply_channel_name = format!("{}Reply", channel_name);
        let reply_message_name = format!("{}Message", reply_channel_name);

        self.register_message(&reply_message_name, response, generator);
        self.register_channel(
            &reply_channel_name,
            &format!("{}/reply", operation.name),
            &reply_message_name,
            parameters,
            None,
            None,
        );

        OperationReply {
            channel: Reference::to(format!("#/channels/{}", reply_channel_name)),
            messages: vec![Reference::to(format!(
                "#/channels/{}/messages/{}",
                reply_channel_name, reply_message_name
            ))],
        }
    }

    fn components_mut(&mut self) -> &mut Components {
        self.document.components.get_or_insert_with(Components::default)
    }

    fn contact_mut(&mut self) -> &mut Contact {
        self.document.info.contact.get_or_insert_with(Contact::default)
    }

    fn license_mut(&mut self) -> &mut License {
        self.document.info.license.get_or_insert_with(License::default)
    }

    /// Finalizes the document.
    ///
    /// # Errors
    ///
    /// Fails when the scanned tree produced no title, no version, or no
    /// server configuration. This is the only condition that aborts a
    /// generation run.
    pub fn build(self) -> Result<AsyncApi> {
        if self.document.info.title.is_empty() {
            anyhow::bail!("missing required @title annotation in API comments");
        }
        if self.document.info.version.is_empty() {
            anyhow::bail!("missing required @version annotation in API comments");
        }
        if self.document.servers.is_empty() {
            anyhow::bail!("missing required server configuration (@url or @host and @protocol)");
        }
        Ok(self.document)
    }
}

impl Default for AsyncApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a `@tag` value in `name - description` or bare `name` form.
fn parse_tag(value: &str) -> Tag {
    match value.split_once(" - ") {
        Some((name, description)) => Tag {
            name: name.trim().to_string(),
            description: Some(description.trim().to_string()),
        },
        None => Tag::named(value.trim()),
    }
}

/// Maps an operation kind to its AsyncAPI action and document key.
fn action_and_name(kind: OperationKind, channel_name: &str) -> (OperationAction, String) {
    match kind {
        OperationKind::Publish => (
            OperationAction::Send,
            format!("publish{}", capitalize(channel_name)),
        ),
        OperationKind::Subscribe => (
            OperationAction::Receive,
            format!("subscribe{}", capitalize(channel_name)),
        ),
        OperationKind::Request => (
            OperationAction::Send,
            format!("request{}", capitalize(channel_name)),
        ),
    }
}

/// Converts a channel address to a valid channel name:
/// `user.created` becomes `userCreated`, `user.{id}.updated` becomes
/// `userIdUpdated`.
fn to_channel_name(address: &str) -> String {
    let mut result = String::with_capacity(address.len());
    let mut capitalize_next = false;

    for character in address.chars() {
        match character {
            '.' | '-' | '_' | '{' | '}' => capitalize_next = true,
            _ => {
                if capitalize_next && !result.is_empty() {
                    result.extend(character.to_uppercase());
                } else {
                    result.push(character);
                }
                capitalize_next = false;
            }
        }
    }

    result
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
