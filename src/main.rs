//! AsyncAPI Generator - Command-line tool for generating AsyncAPI documentation.
//!
//! This binary provides a command-line interface for generating AsyncAPI 3.0
//! documentation from annotated Rust source code. It scans a project tree for
//! `@attribute` doc comments describing channels and operations, infers
//! message schemas from the referenced types, and emits a complete AsyncAPI
//! specification.
//!
//! # Usage
//!
//! ```bash
//! asyncapi-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! asyncapi-from-source ./my-service -o asyncapi.yaml
//! ```
//!
//! Generate JSON documentation, skipping vendored code:
//! ```bash
//! asyncapi-from-source ./my-service -f json -e vendor,generated -o asyncapi.json
//! ```

mod annotation;
mod asyncapi_builder;
mod cli;
mod constraints;
mod operation;
mod parser;
mod scanner;
mod schema_generator;
mod serializer;
mod spec3;
mod type_resolver;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // We need to parse args twice: once to get verbose flag, then again after logger init
    // First, do a quick parse just to check for verbose flag
    let args_for_verbose = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("AsyncAPI Generator starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    // Run the main workflow
    cli::run(args)?;

    info!("AsyncAPI document generation completed successfully");

    Ok(())
}
