use std::fmt;
use std::path::PathBuf;

use flashcard_core::model::{ModuleName, TagFilter};
use services::{Clock, ModuleService, SessionLoopService};
use storage::repository::Storage;
use tracing::debug;

mod logging;
mod terminal;

use terminal::{ReviewOptions, Terminal};

const DEFAULT_MODULES_DIR: &str = "flashcards";
const DEFAULT_PROGRESS_DIR: &str = "progress";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidModule { raw: String },
    InvalidTag { raw: String },
    InvalidCount { raw: String },
    EmptyPath { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidModule { raw } => write!(f, "invalid --module value: {raw}"),
            ArgsError::InvalidTag { raw } => write!(f, "invalid --tag value: {raw}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::EmptyPath { flag } => write!(f, "{flag} cannot be empty"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_path(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<PathBuf, ArgsError> {
    let value = require_value(args, flag)?;
    if value.trim().is_empty() {
        return Err(ArgsError::EmptyPath { flag });
    }
    Ok(PathBuf::from(value))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- review  [options] [--module <name>] [--tag <tag>] [--count <n>]");
    eprintln!("  cargo run -p app -- modules [options]");
    eprintln!("  cargo run -p app -- stats   [options] [--module <name>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --modules <dir>      folder of .docx/.txt modules (default: {DEFAULT_MODULES_DIR})");
    eprintln!("  --progress <dir>     folder of progress files (default: {DEFAULT_PROGRESS_DIR})");
    eprintln!("  --log-level <filter> tracing filter (default: warn)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASHCARD_MODULES_DIR, FLASHCARD_PROGRESS_DIR, FLASHCARD_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Review,
    Modules,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "review" => Some(Self::Review),
            "modules" => Some(Self::Modules),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    modules_dir: PathBuf,
    progress_dir: PathBuf,
    log_filter: String,
    module: Option<ModuleName>,
    tag: Option<TagFilter>,
    count: Option<usize>,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            modules_dir: env("FLASHCARD_MODULES_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_MODULES_DIR), PathBuf::from),
            progress_dir: env("FLASHCARD_PROGRESS_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_PROGRESS_DIR), PathBuf::from),
            log_filter: env("FLASHCARD_LOG")
                .unwrap_or_else(|| logging::DEFAULT_LOG_FILTER.to_string()),
            module: None,
            tag: None,
            count: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--modules" => parsed.modules_dir = require_path(args, "--modules")?,
                "--progress" => parsed.progress_dir = require_path(args, "--progress")?,
                "--log-level" => parsed.log_filter = require_value(args, "--log-level")?,
                "--module" => {
                    let value = require_value(args, "--module")?;
                    let name = ModuleName::new(value.clone())
                        .map_err(|_| ArgsError::InvalidModule { raw: value })?;
                    parsed.module = Some(name);
                }
                "--tag" => {
                    let value = require_value(args, "--tag")?;
                    let filter = value
                        .parse::<TagFilter>()
                        .map_err(|_| ArgsError::InvalidTag { raw: value.clone() })?;
                    parsed.tag = Some(filter);
                }
                "--count" => {
                    let value = require_value(args, "--count")?;
                    let count: usize = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ArgsError::InvalidCount { raw: value.clone() })?;
                    parsed.count = Some(count);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means a review session.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Review,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Review,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter(), |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init_tracing(&parsed.log_filter);
    debug!(
        modules = %parsed.modules_dir.display(),
        progress = %parsed.progress_dir.display(),
        "starting"
    );

    // Saving never creates directories, so the progress folder is prepared here.
    std::fs::create_dir_all(&parsed.progress_dir)?;
    let storage = Storage::filesystem(&parsed.modules_dir, &parsed.progress_dir);
    let modules = ModuleService::new(storage.modules.clone(), storage.progress.clone());

    let stdin = std::io::stdin();
    let mut term = Terminal::new(stdin.lock(), std::io::stdout());

    match cmd {
        Command::Review => {
            let session_loop = SessionLoopService::new(Clock::system(), storage.progress.clone());
            let options = ReviewOptions {
                module: parsed.module,
                filter: parsed.tag,
                count: parsed.count,
            };
            term.review(&modules, &session_loop, &options)?;
        }
        Command::Modules => term.list_modules(&modules)?,
        Command::Stats => term.stats(&modules, parsed.module.as_ref())?,
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |_| None)
    }

    #[test]
    fn defaults_without_flags() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.modules_dir, PathBuf::from(DEFAULT_MODULES_DIR));
        assert_eq!(args.progress_dir, PathBuf::from(DEFAULT_PROGRESS_DIR));
        assert_eq!(args.log_filter, "warn");
        assert_eq!(args.module, None);
    }

    #[test]
    fn environment_provides_fallbacks() {
        let mut iter = std::iter::empty();
        let args = Args::parse(&mut iter, |key| match key {
            "FLASHCARD_MODULES_DIR" => Some("/data/cards".into()),
            "FLASHCARD_LOG" => Some("debug".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(args.modules_dir, PathBuf::from("/data/cards"));
        assert_eq!(args.log_filter, "debug");
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--modules", "decks", "--progress", "state", "--module", "math", "--tag",
            "Review Later", "--count", "5",
        ])
        .unwrap();
        assert_eq!(args.modules_dir, PathBuf::from("decks"));
        assert_eq!(args.progress_dir, PathBuf::from("state"));
        assert_eq!(args.module, Some(ModuleName::new("math").unwrap()));
        assert_eq!(args.tag, Some("Review Later".parse().unwrap()));
        assert_eq!(args.count, Some(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            parse(&["--count", "0"]),
            Err(ArgsError::InvalidCount { raw: "0".into() })
        );
        assert_eq!(
            parse(&["--module"]),
            Err(ArgsError::MissingValue { flag: "--module" })
        );
        assert_eq!(
            parse(&["--module", "../x"]),
            Err(ArgsError::InvalidModule { raw: "../x".into() })
        );
        assert_eq!(
            parse(&["--progress", " "]),
            Err(ArgsError::EmptyPath { flag: "--progress" })
        );
        assert_eq!(parse(&["--wat"]), Err(ArgsError::UnknownArg("--wat".into())));
    }

    #[test]
    fn subcommands_are_recognized() {
        assert_eq!(Command::from_arg("stats"), Some(Command::Stats));
        assert_eq!(Command::from_arg("modules"), Some(Command::Modules));
        assert_eq!(Command::from_arg("review"), Some(Command::Review));
        assert_eq!(Command::from_arg("ui"), None);
    }
}
