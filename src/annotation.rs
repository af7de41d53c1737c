//! Annotation extraction from doc comments.
//!
//! Operations and service metadata are declared as `@attribute value` lines
//! inside ordinary doc comments (`///` on functions and impl methods, `//!`
//! at file or module level). This module collects those comment blocks from
//! a parsed file and splits individual lines into attribute/value pairs.
//!
//! A block that mentions any of the service-level attributes (`@title`,
//! `@version`, `@protocol`, `@url`, `@host`) describes the API itself;
//! every other annotated block describes a single operation.

use crate::parser::ParsedFile;

// Service-level attributes
pub const TITLE_ATTR: &str = "@title";
pub const VERSION_ATTR: &str = "@version";
pub const DESCRIPTION_ATTR: &str = "@description";
pub const TERMS_OF_SERVICE_ATTR: &str = "@termsofservice";
pub const CONTACT_NAME_ATTR: &str = "@contact.name";
pub const CONTACT_URL_ATTR: &str = "@contact.url";
pub const CONTACT_EMAIL_ATTR: &str = "@contact.email";
pub const LICENSE_NAME_ATTR: &str = "@license.name";
pub const LICENSE_URL_ATTR: &str = "@license.url";
pub const TAG_ATTR: &str = "@tag";
pub const EXTERNAL_DOCS_DESC_ATTR: &str = "@externaldocs.description";
pub const EXTERNAL_DOCS_URL_ATTR: &str = "@externaldocs.url";
pub const PROTOCOL_ATTR: &str = "@protocol";
pub const URL_ATTR: &str = "@url";
pub const HOST_ATTR: &str = "@host";

// Operation-level attributes
pub const TYPE_ATTR: &str = "@type";
pub const NAME_ATTR: &str = "@name";
pub const SUMMARY_ATTR: &str = "@summary";
pub const PAYLOAD_ATTR: &str = "@payload";
pub const RESPONSE_ATTR: &str = "@response";
pub const SECURITY_ATTR: &str = "@security";
pub const OPERATION_TAG_ATTR: &str = "@operation.tag";
pub const DEPRECATED_ATTR: &str = "@deprecated";
pub const OPERATION_EXTERNAL_DOCS_DESC_ATTR: &str = "@operation.externaldocs.description";
pub const OPERATION_EXTERNAL_DOCS_URL_ATTR: &str = "@operation.externaldocs.url";
pub const MESSAGE_CONTENT_TYPE_ATTR: &str = "@message.contenttype";
pub const MESSAGE_TITLE_ATTR: &str = "@message.title";
pub const MESSAGE_TAG_ATTR: &str = "@message.tag";
pub const MESSAGE_CORRELATION_ID_ATTR: &str = "@message.correlationid";
pub const CHANNEL_TITLE_ATTR: &str = "@channel.title";
pub const CHANNEL_DESCRIPTION_ATTR: &str = "@channel.description";
pub const BINDING_NATS_QUEUE_ATTR: &str = "@binding.nats.queue";
pub const BINDING_NATS_DELIVER_POLICY_ATTR: &str = "@binding.nats.deliverpolicy";
pub const BINDING_AMQP_EXCHANGE_ATTR: &str = "@binding.amqp.exchange";
pub const BINDING_AMQP_ROUTING_KEY_ATTR: &str = "@binding.amqp.routingkey";
pub const BINDING_KAFKA_TOPIC_ATTR: &str = "@binding.kafka.topic";
pub const BINDING_KAFKA_PARTITIONS_ATTR: &str = "@binding.kafka.partitions";
pub const BINDING_KAFKA_REPLICAS_ATTR: &str = "@binding.kafka.replicas";

// Field-level attributes
pub const FORMAT_ATTR: &str = "@format";
pub const EXAMPLE_ATTR: &str = "@example";
pub const REQUIRED_ATTR: &str = "@required";
pub const VALIDATE_ATTR: &str = "@validate";

/// A contiguous doc-comment block, one trimmed line per entry.
pub type CommentBlock = Vec<String>;

/// Extracts the string values of all `#[doc = "..."]` attributes, trimmed.
pub fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut lines = Vec::new();

    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(name_value) = &attr.meta {
            if let syn::Expr::Lit(expr_lit) = &name_value.value {
                if let syn::Lit::Str(lit_str) = &expr_lit.lit {
                    lines.push(lit_str.value().trim().to_string());
                }
            }
        }
    }

    lines
}

/// Collects every annotated comment block in a parsed file, in source order.
///
/// Blocks are taken from file-level inner docs, free functions, impl methods,
/// and (recursively) inline modules. Blocks without a single `@attribute`
/// line are regular documentation and are skipped.
pub fn collect_blocks(parsed_file: &ParsedFile) -> Vec<CommentBlock> {
    let mut blocks = Vec::new();

    push_block(&mut blocks, doc_lines(&parsed_file.syntax_tree.attrs));
    collect_item_blocks(&parsed_file.syntax_tree.items, &mut blocks);

    blocks
}

fn collect_item_blocks(items: &[syn::Item], blocks: &mut Vec<CommentBlock>) {
    for item in items {
        match item {
            syn::Item::Fn(item_fn) => {
                push_block(blocks, doc_lines(&item_fn.attrs));
            }
            syn::Item::Impl(item_impl) => {
                for impl_item in &item_impl.items {
                    if let syn::ImplItem::Fn(method) = impl_item {
                        push_block(blocks, doc_lines(&method.attrs));
                    }
                }
            }
            syn::Item::Mod(item_mod) => {
                push_block(blocks, doc_lines(&item_mod.attrs));
                if let Some((_, mod_items)) = &item_mod.content {
                    collect_item_blocks(mod_items, blocks);
                }
            }
            _ => {}
        }
    }
}

fn push_block(blocks: &mut Vec<CommentBlock>, lines: Vec<String>) {
    if lines.iter().any(|line| line.starts_with('@')) {
        blocks.push(lines);
    }
}

/// Splits one comment line into a lowercased attribute and its raw value.
///
/// Returns `None` for lines that do not start with an `@attribute` token.
pub fn split_attribute(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    let attribute = line.split_whitespace().next()?;
    if !attribute.starts_with('@') {
        return None;
    }

    let value = line[attribute.len()..].trim();
    Some((attribute.to_ascii_lowercase(), value))
}

/// Whether a comment block carries service-level metadata rather than a
/// single operation.
pub fn is_service_block(lines: &[String]) -> bool {
    lines.iter().any(|line| match split_attribute(line) {
        Some((attribute, _)) => matches!(
            attribute.as_str(),
            TITLE_ATTR | VERSION_ATTR | PROTOCOL_ATTR | URL_ATTR | HOST_ATTR
        ),
        None => false,
    })
}
