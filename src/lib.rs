//! AsyncAPI Generator - Automatic AsyncAPI documentation from annotated Rust code.
//!
//! This library generates AsyncAPI 3.0.0 documentation by statically analyzing
//! Rust source code. Channels, operations, and service metadata are declared
//! as `@attribute value` lines inside ordinary doc comments; message schemas
//! are inferred from the referenced Rust types, including nested types,
//! collections, optionality, and validation constraints translated from
//! field-level annotations. The target program is never compiled or executed.
//!
//! # Architecture
//!
//! The library is organized into modules that work together as a pipeline:
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`annotation`] - Collects `@attribute` comment blocks and classifies them
//! 4. [`type_resolver`] - Resolves type names against the parsed source scope
//! 5. [`schema_generator`] - Infers JSON-Schema-like trees from resolved types
//! 6. [`constraints`] - Translates validation-rule annotations into constraints
//! 7. [`operation`] - Models one channel operation built from a comment block
//! 8. [`spec3`] - The AsyncAPI 3.0.0 document model
//! 9. [`asyncapi_builder`] - Assembles channels, operations, and components
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use asyncapi_from_source::{
//!     annotation,
//!     asyncapi_builder::AsyncApiBuilder,
//!     operation::Operation,
//!     parser::AstParser,
//!     scanner::FileScanner,
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::PathBuf;
//!
//! // Scan and parse the project
//! let scanner = FileScanner::new(PathBuf::from("./my-service"));
//! let scan_result = scanner.scan().unwrap();
//! let parsed_files = AstParser::parse_files(&scan_result.rust_files);
//!
//! // Collect annotated comment blocks
//! let blocks: Vec<_> = parsed_files
//!     .iter()
//!     .flat_map(annotation::collect_blocks)
//!     .collect();
//!
//! // Build the document
//! let mut schema_generator = SchemaGenerator::new(TypeResolver::new(parsed_files));
//! let mut builder = AsyncApiBuilder::new();
//! for block in &blocks {
//!     if annotation::is_service_block(block) {
//!         builder.parse_service_block(block);
//!     } else {
//!         let operation = Operation::from_block(block, schema_generator.resolver());
//!         builder.add_operation(&operation, &mut schema_generator);
//!     }
//! }
//! let document = builder.build().unwrap();
//!
//! // Serialize to YAML
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete
//! CLI application.

pub mod annotation;
pub mod asyncapi_builder;
pub mod cli;
pub mod constraints;
pub mod operation;
pub mod parser;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod spec3;
pub mod type_resolver;
