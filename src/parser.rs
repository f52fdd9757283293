use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};

use crate::error::Error;

/// AST (Abstract Syntax Tree) parser for TypeScript source files.
///
/// The `AstParser` uses the SWC parser to turn TypeScript source code into a
/// syntax tree, which is then analyzed to extract route registrations, type
/// declarations, and import statements. Files with a `.tsx` extension are
/// parsed with JSX enabled.
///
/// # Example
///
/// ```no_run
/// use openapi_from_typescript::parser::AstParser;
/// use std::path::Path;
///
/// let parser = AstParser::new();
/// let parsed = parser.parse_file(Path::new("src/routes/user.ts")).unwrap();
/// println!("Parsed {} top-level items", parsed.syntax_tree.body.len());
/// ```
pub struct AstParser {
    source_map: SourceMap,
}

/// A successfully parsed TypeScript file with its abstract syntax tree.
///
/// Contains both the original file path and the parsed module body.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: Module,
}

impl AstParser {
    pub fn new() -> Self {
        AstParser {
            source_map: SourceMap::default(),
        }
    }

    /// Parses a single TypeScript source file into an AST.
    ///
    /// This method reads the file content and runs the SWC lexer/parser over
    /// it. If parsing fails (e.g., due to syntax errors), an error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid TypeScript syntax
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = self.parse_source(&content, path)?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses TypeScript source text into a module.
    ///
    /// The `path` is only used for diagnostics and for deciding whether to
    /// enable JSX (`.tsx` files); the file itself is not touched.
    pub fn parse_source(&self, source: &str, path: &Path) -> Result<Module> {
        let is_tsx = path
            .extension()
            .map(|ext| ext == "tsx")
            .unwrap_or(false);

        let file_name: Lrc<FileName> = FileName::Real(path.to_path_buf()).into();
        let source_file = self.source_map.new_source_file(file_name, source.to_string());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: is_tsx,
            ..Default::default()
        });

        let lexer = Lexer::new(
            syntax,
            Default::default(),
            StringInput::from(&*source_file),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let module = parser
            .parse_module()
            .map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: format!("{:?}", e),
            })
            .with_context(|| {
                format!("Failed to parse TypeScript syntax in file: {}", path.display())
            })?;

        Ok(module)
    }

    /// Parses multiple TypeScript source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues
    /// for the remaining files. This allows the tool to generate a partial
    /// document even when some files have syntax errors.
    pub fn parse_files(&self, paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match self.parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        let failure_count = results.len() - success_count;

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count, failure_count
        );

        results
    }
}

impl Default for AstParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_typescript_file() {
        let temp_dir = TempDir::new().unwrap();
        let valid_code = r#"
            import { User } from './dtos';

            export interface Account {
                id: string;
                balance: number;
            }

            export function getUser(id: string): User | undefined {
                return undefined;
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "valid.ts", valid_code);
        let parser = AstParser::new();
        let result = parser.parse_file(&file_path);

        assert!(result.is_ok());
        let parsed = result.unwrap();
        assert_eq!(parsed.path, file_path);
        assert!(!parsed.syntax_tree.body.is_empty());
    }

    #[test]
    fn test_parse_invalid_typescript_file() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_code = r#"
            interface User {
                id: string
            export const = 5;
        "#;

        let file_path = create_temp_file(&temp_dir, "invalid.ts", invalid_code);
        let parser = AstParser::new();
        let result = parser.parse_file(&file_path);

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse TypeScript syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let parser = AstParser::new();
        let result = parser.parse_file(Path::new("/nonexistent/file.ts"));

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "empty.ts", "");
        let parser = AstParser::new();
        let result = parser.parse_file(&file_path);

        assert!(result.is_ok());
        let parsed = result.unwrap();
        assert!(parsed.syntax_tree.body.is_empty());
    }

    #[test]
    fn test_parse_source_without_file() {
        let parser = AstParser::new();
        let module = parser
            .parse_source("type Id = string;", Path::new("inline.ts"))
            .unwrap();

        assert_eq!(module.body.len(), 1);
    }

    #[test]
    fn test_parse_tsx_source() {
        let parser = AstParser::new();
        let result = parser.parse_source(
            "export const View = () => <div>hello</div>;",
            Path::new("view.tsx"),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();

        let valid_code1 = "export function hello() {}";
        let valid_code2 = "export interface World { name: string; }";
        let invalid_code = "export const = ;";

        let file1 = create_temp_file(&temp_dir, "file1.ts", valid_code1);
        let file2 = create_temp_file(&temp_dir, "file2.ts", valid_code2);
        let file3 = create_temp_file(&temp_dir, "file3.ts", invalid_code);

        let paths = vec![file1.clone(), file2.clone(), file3.clone()];
        let parser = AstParser::new();
        let results = parser.parse_files(&paths);

        assert_eq!(results.len(), 3);

        // First two should succeed
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());

        // Third should fail
        assert!(results[2].is_err());

        // Verify the successful parses
        assert_eq!(results[0].as_ref().unwrap().path, file1);
        assert_eq!(results[1].as_ref().unwrap().path, file2);
    }

    #[test]
    fn test_parse_files_empty_list() {
        let paths: Vec<PathBuf> = vec![];
        let parser = AstParser::new();
        let results = parser.parse_files(&paths);

        assert_eq!(results.len(), 0);
    }

    #[test]
    fn test_parse_file_with_complex_syntax() {
        let temp_dir = TempDir::new().unwrap();
        let complex_code = r#"
            import { QueryParam, Response } from 'lil-schemy';
            export { CreateUserRequest } from './requests';

            export enum AnimalKind {
                Dog = "dog",
                Cat = "cat",
                Bird = "bird"
            }

            export type UserList = Array<User>;

            export interface User {
                name: string;
                kind?: AnimalKind;
            }

            export default class AdminUser implements User {
                permissions!: string[];
                name!: string;
            }

            export const handler = async (request: { id: QueryParam<string, false> }): Promise<void> => {
                return;
            };
        "#;

        let file_path = create_temp_file(&temp_dir, "complex.ts", complex_code);
        let parser = AstParser::new();
        let result = parser.parse_file(&file_path);

        assert!(result.is_ok());
        let parsed = result.unwrap();

        // Import, re-export, enum, alias, interface, class, handler
        assert!(parsed.syntax_tree.body.len() >= 7);
    }
}
