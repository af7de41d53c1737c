use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST parser for Rust source files.
///
/// Uses the `syn` crate to parse Rust source code into a syntax tree, which
/// the annotation extractor and type resolver then traverse. The parser is
/// deliberately lenient in batch mode: a file the tool cannot parse degrades
/// to a warning so that the rest of the source tree still contributes to the
/// generated document.
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust
    /// syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings and dropped; the
    /// successfully parsed remainder forms the resolution scope. This allows
    /// the tool to generate partial documentation even when parts of the
    /// tree have syntax errors.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<ParsedFile> {
        debug!("Parsing {} files", paths.len());

        let mut parsed_files = Vec::new();
        let mut failure_count = 0;

        for path in paths {
            match Self::parse_file(path) {
                Ok(parsed) => parsed_files.push(parsed),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failure_count += 1;
                }
            }
        }

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            parsed_files.len(),
            failure_count
        );

        parsed_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let valid_code = r#"
            /// @type pub
            /// @name user.created
            pub fn publish_user_created() {}

            pub struct User {
                pub id: u32,
                pub name: String,
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "valid.rs", valid_code);
        let result = AstParser::parse_file(&file_path);

        assert!(result.is_ok());
        let parsed = result.unwrap();
        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.syntax_tree.items.len(), 2);
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_code = r#"
            pub struct User {
                pub id: u32
                pub name: String
            }

            fn broken( {
        "#;

        let file_path = create_temp_file(&temp_dir, "invalid.rs", invalid_code);
        let result = AstParser::parse_file(&file_path);

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/file.rs"));

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "empty.rs", "");
        let result = AstParser::parse_file(&file_path);

        assert!(result.is_ok());
        assert!(result.unwrap().syntax_tree.items.is_empty());
    }

    #[test]
    fn test_parse_files_drops_broken_files() {
        let temp_dir = TempDir::new().unwrap();

        let file1 = create_temp_file(&temp_dir, "file1.rs", "pub fn hello() {}");
        let file2 = create_temp_file(&temp_dir, "file2.rs", "pub fn broken( {");
        let file3 = create_temp_file(&temp_dir, "file3.rs", "pub struct World;");

        let paths = vec![file1.clone(), file2, file3.clone()];
        let parsed = AstParser::parse_files(&paths);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].path, file1);
        assert_eq!(parsed[1].path, file3);
    }

    #[test]
    fn test_parse_files_empty_list() {
        let paths: Vec<PathBuf> = vec![];
        let parsed = AstParser::parse_files(&paths);

        assert!(parsed.is_empty());
    }

    #[test]
    fn test_parse_file_with_doc_comments_and_serde() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            use serde::{Deserialize, Serialize};

            #[derive(Debug, Serialize, Deserialize)]
            pub struct UserEvent {
                /// @description Unique user identifier
                #[serde(rename = "userId")]
                pub user_id: String,
                pub email: Option<String>,
            }

            /// @type sub
            /// @name user.updated
            /// @payload UserEvent
            pub async fn handle_user_updated() {}
        "#;

        let file_path = create_temp_file(&temp_dir, "service.rs", code);
        let result = AstParser::parse_file(&file_path);

        assert!(result.is_ok());
        let parsed = result.unwrap();
        assert!(parsed.syntax_tree.items.len() >= 3);
    }
}
