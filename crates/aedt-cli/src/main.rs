#![doc = include_str!("../README.md")]
//! `aedt`: inspect AEDT project files from the command line.
//!
//! Examples:
//!   aedt dump project.aedt                          - whole file as JSON
//!   aedt dump project.aedt --keyword ProjectPreview - one block only
//!   aedt get project.aedt AnsoftProject/Desktop/Version
//!   aedt check project.aedt                         - structure and diagnostics

use std::io;
use std::path::Path;

use aedt_lines::Lines;
use aedt_parse::{Diagnostics, ParseError, Parser};
use aedt_tree::Document;
use facet::Facet;
use figue as args;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_PATH_NOT_FOUND: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;
const EXIT_USAGE: i32 = 64;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "AEDT_LOG";

// ============================================================================
// CLI argument structures
// ============================================================================

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Facet, Debug)]
struct Args {
    /// Show version
    #[facet(args::named, args::short = 'V', default)]
    version: bool,

    /// Subcommand to run
    #[facet(args::subcommand, default)]
    command: Option<Command>,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Print a project (or one block of it) as JSON
    Dump {
        /// Project file
        #[facet(args::positional)]
        file: String,

        /// Only decode the first block with this name
        #[facet(args::named, default)]
        keyword: Option<String>,

        /// With --keyword: only accept the block after `Name='<design>'`
        #[facet(args::named, default)]
        design: Option<String>,

        /// Single-line JSON
        #[facet(args::named, default)]
        compact: bool,
    },

    /// Print the value at a `/`-separated path as JSON
    Get {
        /// Project file
        #[facet(args::positional)]
        file: String,

        /// Path such as `AnsoftProject/Desktop/Version[0]`
        #[facet(args::positional)]
        path: String,
    },

    /// Parse a project and report its structure and diagnostics
    Check {
        /// Project file
        #[facet(args::positional)]
        file: String,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.is_empty() || raw_args[0] == "--help" || raw_args[0] == "-h" {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--version" || raw_args[0] == "-V" {
        println!("aedt {VERSION}");
        std::process::exit(EXIT_SUCCESS);
    }

    init_tracing();

    match run(&raw_args) {
        Ok(output) => {
            print!("{output}");
            std::process::exit(EXIT_SUCCESS);
        }
        Err(e) => {
            match &e {
                CliError::Parse {
                    error,
                    lines,
                    filename,
                } => error.write_report(filename, lines, io::stderr()),
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_help() {
    eprintln!("aedt {VERSION} - inspect AEDT project files\n");
    eprintln!("USAGE:");
    eprintln!("    aedt <command> [args]\n");
    eprintln!("COMMANDS:");
    eprintln!("    dump <file> [--keyword <K>] [--design <D>] [--compact]");
    eprintln!("                                    Print the project (or block K) as JSON");
    eprintln!("    get <file> <path>               Print the value at <path> as JSON");
    eprintln!("    check <file>                    Report blocks, skipped lines, fallbacks\n");
    eprintln!("ENVIRONMENT:");
    eprintln!("    {LOG_ENV}=<filter>                Log filter (default: warn), e.g. AEDT_LOG=debug\n");
    eprintln!("EXAMPLES:");
    eprintln!("    aedt dump project.aedt --keyword ProjectPreview");
    eprintln!("    aedt get project.aedt AnsoftProject/Desktop/Version");
}

/// Run one command and return what goes to stdout.
fn run(args: &[String]) -> Result<String, CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed: Args =
        figue::from_slice(&args_strs).map_err(|e| CliError::Usage(e.to_string()))?;
    debug!(?parsed, "arguments");

    if parsed.version {
        return Ok(format!("aedt {VERSION}\n"));
    }

    match parsed.command {
        Some(Command::Dump {
            file,
            keyword,
            design,
            compact,
        }) => run_dump(&file, keyword.as_deref(), design.as_deref(), compact),
        Some(Command::Get { file, path }) => run_get(&file, &path),
        Some(Command::Check { file }) => run_check(&file),
        None => Err(CliError::Usage("missing command".into())),
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Parse {
        error: ParseError,
        lines: Lines,
        filename: String,
    },
    PathNotFound(String),
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Parse { .. } => EXIT_SYNTAX_ERROR,
            CliError::PathNotFound(_) => EXIT_PATH_NOT_FOUND,
            CliError::Usage(_) => EXIT_USAGE,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Parse { error, filename, .. } => write!(f, "{filename}: {error}"),
            CliError::PathNotFound(path) => write!(f, "no value at `{path}`"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

/// Read `file` once and decode it with `decode`.
///
/// On a syntax error the lines travel with the error so the report can quote
/// them without reading the file again.
fn load<F>(file: &str, decode: F) -> Result<Document, CliError>
where
    F: FnOnce(&Parser, &Lines) -> Result<Document, ParseError>,
{
    let parser = Parser::new();
    let lines = parser.read_lines(file).map_err(CliError::Io)?;
    match decode(&parser, &lines) {
        Ok(doc) => Ok(doc),
        Err(error) => Err(CliError::Parse {
            error,
            lines,
            filename: file.to_string(),
        }),
    }
}

fn run_dump(
    file: &str,
    keyword: Option<&str>,
    design: Option<&str>,
    compact: bool,
) -> Result<String, CliError> {
    let doc = match (keyword, design) {
        (Some(keyword), design) => load(file, |parser, lines| {
            parser.parse_keyword_lines(lines, keyword, design)
        })?,
        (None, Some(_)) => return Err(CliError::Usage("--design requires --keyword".into())),
        (None, None) => load(file, |parser, lines| parser.parse_document_lines(lines))?,
    };
    render_json(&doc.to_json(), compact)
}

fn run_get(file: &str, path: &str) -> Result<String, CliError> {
    let doc = load(file, |parser, lines| parser.parse_document_lines(lines))?;
    let value = doc
        .get(path)
        .ok_or_else(|| CliError::PathNotFound(path.to_string()))?;
    render_json(&value.to_json(), false)
}

fn run_check(file: &str) -> Result<String, CliError> {
    let mut diagnostics = Diagnostics::default();
    let doc = load(file, |parser, lines| {
        parser.parse_document_lines_with_observer(lines, &mut diagnostics)
    })?;
    Ok(check_report(Path::new(file), &doc, &diagnostics))
}

fn check_report(file: &Path, doc: &Document, diagnostics: &Diagnostics) -> String {
    let mut out = format!("{}: ok\n", file.display());

    let blocks: Vec<(&str, usize)> = doc
        .iter()
        .map(|(name, value)| (name, value.documents().count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    out.push_str(&format!("  top-level blocks: {}\n", blocks.len()));
    for (name, count) in blocks {
        if count > 1 {
            out.push_str(&format!("    {name} (x{count})\n"));
        } else {
            out.push_str(&format!("    {name}\n"));
        }
    }

    out.push_str(&format!("  skipped lines: {}\n", diagnostics.skipped_lines.len()));
    for line in &diagnostics.skipped_lines {
        out.push_str(&format!("    raw line {line}\n"));
    }

    out.push_str(&format!("  keyword fallbacks: {}\n", diagnostics.fallbacks.len()));
    for fallback in &diagnostics.fallbacks {
        out.push_str(&format!(
            "    line {}: {} ({})\n",
            fallback.line, fallback.keyword, fallback.reason
        ));
    }
    out
}

fn render_json(json: &serde_json::Value, compact: bool) -> Result<String, CliError> {
    let mut text = if compact {
        serde_json::to_string(json)
    } else {
        serde_json::to_string_pretty(json)
    }
    .map_err(|e| CliError::Io(io::Error::other(e)))?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    const PROJECT: &str = "\
$begin 'AnsoftProject'
\tCreated='Thu Mar  4 12:01:24 2021'
\t$begin 'Desktop'
\t\tVersion(2021, 1)
\t$end 'Desktop'
\t$begin 'Choice'
\t\tId=1
\t$end 'Choice'
\t$begin 'Choice'
\t\tId=2
\t$end 'Choice'
$end 'AnsoftProject'
$begin 'AllReferencedFilesForProject'
$end 'AllReferencedFilesForProject'
";

    fn write(dir: &tempfile::TempDir, content: &[u8]) -> String {
        let path = dir.path().join("project.aedt");
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, PROJECT.as_bytes());
        let out = run_get(&file, "AnsoftProject/Desktop/Version[0]").unwrap();
        assert_eq!(out, "2021\n");
        let out = run_get(&file, "AnsoftProject/Choice[1]/Id").unwrap();
        assert_eq!(out, "2\n");
    }

    #[test]
    fn test_get_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, PROJECT.as_bytes());
        let err = run_get(&file, "AnsoftProject/Nope").unwrap_err();
        assert_eq!(err.exit_code(), EXIT_PATH_NOT_FOUND);
        assert_eq!(err.to_string(), "no value at `AnsoftProject/Nope`");
    }

    #[test]
    fn test_dump_keyword_compact() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, PROJECT.as_bytes());
        let out = run_dump(&file, Some("Desktop"), None, true).unwrap();
        assert_eq!(out, "{\"Desktop\":{\"Version\":[2021,1]}}\n");
    }

    #[test]
    fn test_dump_design_without_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, PROJECT.as_bytes());
        let err = run_dump(&file, None, Some("HFSSDesign1"), false).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_check_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = PROJECT.as_bytes().to_vec();
        content.extend_from_slice(&[0xc3, 0x28, b'\n']);
        let file = write(&dir, &content);

        let out = run_check(&file).unwrap();
        assert!(out.contains("  top-level blocks: 2\n"), "{out}");
        assert!(out.contains("    AnsoftProject\n"), "{out}");
        assert!(out.contains("  skipped lines: 1\n    raw line 15\n"), "{out}");
        assert!(out.contains("  keyword fallbacks: 0\n"), "{out}");
    }

    #[test]
    fn test_syntax_error_keeps_lines_for_report() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, b"$begin 'AnsoftProject'\nName='x'\n");
        let err = run_check(&file).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_SYNTAX_ERROR);
        match err {
            CliError::Parse { lines, error, .. } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(error.at.line_number(), 3);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.aedt");
        let err = run_check(&missing.to_string_lossy()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_run_parses_subcommands() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, PROJECT.as_bytes());
        let out = run(&args(&["get", &file, "AnsoftProject/Created"])).unwrap();
        assert_eq!(out, "\"Thu Mar  4 12:01:24 2021\"\n");
    }
}
