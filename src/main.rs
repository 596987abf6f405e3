use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use makeref::commands::{self, Format};
use makeref::types::Position;
use makeref::{diagnostics, error, logger, watch};

#[derive(Parser)]
#[command(name = "makeref", about = "Symbol navigation, references and lint checks for Makefiles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint Makefiles. Exit 0 clean, 1 warnings, 2 errors
    Check {
        /// Files to check (default: every Makefile in the workspace)
        files: Vec<PathBuf>,
    },
    /// Completion candidates at a position
    Complete(PositionArgs),
    /// Find where the name under the cursor is declared
    Definition(PositionArgs),
    /// Describe the declaration under the cursor
    Hover(PositionArgs),
    /// Find every usage of the name under the cursor
    References {
        #[command(flatten)]
        at: PositionArgs,
        /// Also list the declaration
        #[arg(long)]
        include_declaration: bool,
    },
    /// Print the name under the cursor. Exits 1 if there is none
    Resolve(PositionArgs),
    /// List targets and variables declared in a file
    Symbols {
        /// Makefile to scan
        file: PathBuf,
    },
    /// Watch Makefiles and re-run check on changes
    Watch,
}

/// A file plus a zero-based cursor position.
#[allow(clippy::arbitrary_source_item_ordering, reason = "field order is the positional argument order")]
#[derive(Args)]
struct PositionArgs {
    /// Makefile to inspect
    file: PathBuf,
    /// Zero-based line
    line: u32,
    /// Zero-based byte column
    column: u32,
}

impl PositionArgs {
    /// Cursor as a library position.
    const fn position(&self) -> Position {
        return Position::new(self.line, self.column);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    return match run(cli.command, cli.format) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

/// Dispatch a subcommand. The workspace root is the working directory.
///
/// # Errors
///
/// Returns whatever the command returns; `main` renders it and exits 3.
fn run(command: Commands, format: Format) -> Result<ExitCode, error::Error> {
    let root = Path::new(".");
    return match command {
        Commands::Check { files } => commands::check(root, &files, format),
        Commands::Complete(at) => commands::complete(&at.file, at.position(), format),
        Commands::Definition(at) => commands::definition(root, &at.file, at.position(), format),
        Commands::Hover(at) => commands::hover(&at.file, at.position(), format),
        Commands::References { at, include_declaration } => {
            commands::references(root, &at.file, at.position(), include_declaration, format)
        },
        Commands::Resolve(at) => commands::resolve(&at.file, at.position(), format),
        Commands::Symbols { file } => commands::symbols(&file, format),
        Commands::Watch => watch::run(root, format),
    };
}
