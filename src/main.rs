use std::{
    fs::read_to_string,
    io::{self, Write},
    ops::Range,
    path::{Path, PathBuf},
    process::ExitCode,
};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser as _;
use flecha::{error::Error, lexer::LexerDiagnostic, parser, Tokenizer};
use log::debug;
use walkdir::WalkDir;

const FLECHA_FILE_EXTENSION: &str = ".fl";

#[derive(clap::Parser, Debug)]
#[command(version, about = "Interpreter for the flecha language")]
struct Args {
    // Input path
    #[arg(help = "Source file, or directory searched for .fl files")]
    src: String,

    #[arg(long, conflicts_with = "parse", help = "Print the token stream instead of running")]
    tokenize: bool,

    #[arg(long, help = "Print the desugared AST instead of running")]
    parse: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn source_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                eprintln!("{}", err);
                None
            }
        })
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|s| s.ends_with(FLECHA_FILE_EXTENSION))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn report_error(path: &str, source: &str, error: &Error) {
    let report = match &error.location {
        Some(location) => Report::build(ReportKind::Error, path, location.span.start)
            .with_message(error.kind.name())
            .with_label(
                Label::new((path, location.span.clone()))
                    .with_message(error.kind.to_string())
                    .with_color(Color::Red),
            )
            .finish(),
        None => Report::<(&str, Range<usize>)>::build(ReportKind::Error, path, 0)
            .with_message(error.to_string())
            .finish(),
    };

    if let Err(err) = report.eprint((path, Source::from(source.to_owned()))) {
        eprintln!("{} ({})", error, err);
    }
}

fn report_diagnostic(path: &str, source: &str, diagnostic: &LexerDiagnostic) {
    let report = Report::build(ReportKind::Warning, path, diagnostic.location.span.start)
        .with_message(diagnostic.error.to_string())
        .with_label(
            Label::new((path, diagnostic.location.span.clone()))
                .with_message(format!("skipped {:?}", diagnostic.text))
                .with_color(Color::Yellow),
        )
        .finish();

    if let Err(err) = report.eprint((path, Source::from(source.to_owned()))) {
        eprintln!("{} ({})", diagnostic, err);
    }
}

// Returns whether the file was processed without errors
fn process_file(args: &Args, file_path: &Path) -> bool {
    let path = file_path.display().to_string();
    let source = match read_to_string(file_path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read file {}: {}", path, err);
            return false;
        }
    };
    debug!("processing {}", path);

    let mut tokenizer = Tokenizer::new(&source);
    let tokens: Vec<_> = tokenizer.by_ref().collect();
    for diagnostic in tokenizer.diagnostics() {
        report_diagnostic(&path, &source, diagnostic);
    }

    if args.tokenize {
        for token in &tokens {
            println!("{}:{}\t{}", token.line, token.span.start, token.token);
        }
        return tokenizer.diagnostics().is_empty();
    }

    let program = match parser::parse(tokens) {
        Ok(program) => program,
        Err(err) => {
            report_error(&path, &source, &err);
            return false;
        }
    };

    if args.parse {
        println!("{}", program);
        return true;
    }

    let stdout = io::stdout().lock();
    match flecha::run(&program, stdout) {
        Ok(_) => true,
        Err(err) => {
            // Keep what the program printed before the error apart from the report
            let _ = io::stdout().flush();
            eprintln!();
            report_error(&path, &source, &err);
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let files = source_files(Path::new(&args.src));
    if files.is_empty() {
        eprintln!("No {} files found in {}", FLECHA_FILE_EXTENSION, args.src);
        return ExitCode::FAILURE;
    }

    let mut success = true;
    for file in &files {
        success &= process_file(&args, file);
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
