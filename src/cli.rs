use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// AsyncAPI Generator - Automatically generate AsyncAPI documentation from
/// annotated Rust projects
#[derive(Parser, Debug)]
#[command(name = "asyncapi-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Directory names to exclude from scanning (comma-separated)
    #[arg(short = 'e', long = "exclude", value_delimiter = ',', value_name = "DIRS")]
    pub exclude: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if !args.exclude.is_empty() {
        info!("Excluded directories: {:?}", args.exclude);
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::annotation;
    use crate::asyncapi_builder::AsyncApiBuilder;
    use crate::operation::Operation;
    use crate::parser::AstParser;
    use crate::scanner::FileScanner;
    use crate::schema_generator::SchemaGenerator;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::type_resolver::TypeResolver;

    info!("Starting AsyncAPI document generation...");

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scanner =
        FileScanner::new(args.project_path.clone()).with_excluded_dirs(args.exclude.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} Rust files", scan_result.rust_files.len());
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }

    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into ASTs (lenient - broken files are dropped)
    info!("Parsing Rust files...");
    let parsed_files = AstParser::parse_files(&scan_result.rust_files);
    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Collect annotated comment blocks in processing order
    let file_count = parsed_files.len();
    let blocks: Vec<_> = parsed_files
        .iter()
        .flat_map(annotation::collect_blocks)
        .collect();
    info!("Found {} annotated comment blocks", blocks.len());

    // Step 4: Initialize type resolver and schema generator over the scope
    info!("Initializing type resolver...");
    let type_resolver = TypeResolver::new(parsed_files);
    let mut schema_generator = SchemaGenerator::new(type_resolver);

    // Step 5: Build the AsyncAPI document
    info!("Building AsyncAPI document...");
    let mut builder = AsyncApiBuilder::new();
    let mut operation_count = 0;

    for block in &blocks {
        if annotation::is_service_block(block) {
            debug!("Processing service-level block");
            builder.parse_service_block(block);
        } else {
            let operation = Operation::from_block(block, schema_generator.resolver());
            debug!("Processing operation block: {}", operation.name);
            builder.add_operation(&operation, &mut schema_generator);
            operation_count += 1;
        }
    }

    let document = builder.build()?;
    info!("AsyncAPI document built successfully");

    // Step 6: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 7: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!(
            "Successfully wrote AsyncAPI document to {}",
            output_path.display()
        );
    } else {
        println!("{}", content);
    }

    // Step 8: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files parsed: {}", file_count);
    info!("  - Operation blocks: {}", operation_count);
    info!("  - Channels: {}", document.channels.len());
    info!("  - Operations: {}", document.operations.len());

    Ok(())
}
