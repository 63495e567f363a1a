use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use services::{Clock, DeleteOutcome, ExerciseServices, Opened};
use uebung_core::PageRequest;
use uebung_core::model::{AttemptId, Mode};

mod telemetry;
mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidAttemptId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidAttemptId { raw } => write!(f, "invalid --attempt-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  uebung run     --exercise <file.json> [--mode soft|hard] [--query <qs>]");
    eprintln!("                 [--attempt-id <id> --view] [--db <sqlite_url> | --json-store <file>]");
    eprintln!("  uebung journal [--db <sqlite_url> | --json-store <file>]");
    eprintln!("  uebung delete  --attempt-id <id> --name <name> [--db <sqlite_url> | --json-store <file>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://uebung.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  UEBUNG_DB_URL, UEBUNG_LOG, UEBUNG_LOG_FORMAT=json");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Journal,
    Delete,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "journal" => Some(Self::Journal),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Sqlite(String),
    JsonFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    backend: Backend,
    exercise: Option<PathBuf>,
    request: PageRequest,
    name: Option<String>,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut backend = Backend::Sqlite(
            std::env::var("UEBUNG_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://uebung.sqlite3".into(), normalize_sqlite_url),
        );
        let mut exercise = None;
        let mut request = PageRequest::default();
        let mut attempt_id = None;
        let mut view = false;
        let mut name = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    backend = Backend::Sqlite(normalize_sqlite_url(value));
                }
                "--json-store" => {
                    backend = Backend::JsonFile(require_value(args, "--json-store")?.into());
                }
                "--exercise" => exercise = Some(PathBuf::from(require_value(args, "--exercise")?)),
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    let mode = value
                        .parse::<Mode>()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                    request.mode = Some(mode);
                }
                "--query" => {
                    let parsed = PageRequest::from_query(&require_value(args, "--query")?);
                    request.mode = parsed.mode.or(request.mode);
                    if parsed.replay.is_some() {
                        attempt_id = parsed.replay;
                        view = true;
                    }
                }
                "--attempt-id" => {
                    let value = require_value(args, "--attempt-id")?;
                    let id = value
                        .parse::<AttemptId>()
                        .map_err(|_| ArgsError::InvalidAttemptId { raw: value.clone() })?;
                    attempt_id = Some(id);
                }
                "--view" => view = true,
                "--name" => name = Some(require_value(args, "--name")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        match cmd {
            Command::Run => {
                if exercise.is_none() {
                    return Err(ArgsError::MissingFlag { flag: "--exercise" });
                }
                request.replay = attempt_id.filter(|_| view);
            }
            Command::Delete => {
                if attempt_id.is_none() {
                    return Err(ArgsError::MissingFlag {
                        flag: "--attempt-id",
                    });
                }
                if name.is_none() {
                    return Err(ArgsError::MissingFlag { flag: "--name" });
                }
                request.replay = attempt_id;
            }
            Command::Journal => {}
        }

        Ok(Self {
            backend,
            exercise,
            request,
            name,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_services(backend: &Backend) -> Result<ExerciseServices, Box<dyn std::error::Error>> {
    let clock = Clock::default_clock();
    match backend {
        Backend::Sqlite(url) => {
            // Open + migrate SQLite here so core/services stay free of file-system glue.
            prepare_sqlite_file(url)?;
            Ok(ExerciseServices::new_sqlite(url, clock).await?)
        }
        Backend::JsonFile(path) => Ok(ExerciseServices::new_json_file(path.clone(), clock)),
    }
}

async fn run_exercise(services: &ExerciseServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let path = args
        .exercise
        .as_ref()
        .ok_or(ArgsError::MissingFlag { flag: "--exercise" })?;
    let raw = tokio::fs::read_to_string(path).await?;
    let mut workflow = services.workflow_from_json(&raw)?;
    let mut stdout = io::stdout().lock();

    match workflow.open(&args.request).await {
        Opened::Replay(id) => {
            terminal::render_page(&workflow, &mut stdout)?;
            if let Some(evaluation) = workflow.evaluation() {
                terminal::render_results(evaluation, &mut stdout)?;
            }
            writeln!(stdout, "Versuch {id} (nur ansehen).")?;
            if !workflow.page().path().is_empty() {
                writeln!(stdout, "Uebung erneut starten: {}", workflow.page().path())?;
            }
            Ok(())
        }
        Opened::Practice(mode) => {
            tracing::info!(mode = %mode, title = workflow.page().title(), "exercise opened");
            let stdin = io::stdin().lock();
            terminal::run_loop(&mut workflow, stdin, &mut stdout).await?;
            Ok(())
        }
    }
}

async fn print_journal(services: &ExerciseServices) -> io::Result<()> {
    let entries = services.attempts().journal().await;
    let mut out = io::stdout().lock();
    if entries.is_empty() {
        writeln!(out, "Noch keine gespeicherten Ergebnisse.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(out, "{}  {}", entry.name, entry.datetime)?;
        writeln!(out, "  Ergebnis: {}  Modus: {}", entry.score, entry.mode)?;
        writeln!(out, "  {} ({})", entry.title, entry.path)?;
        if let Some(link) = &entry.view_link {
            writeln!(out, "  Ergebnis ansehen: {link}")?;
        }
        if let Some(link) = &entry.retry_link {
            writeln!(out, "  Uebung erneut: {link}")?;
        }
    }
    Ok(())
}

async fn delete_attempt(services: &ExerciseServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let id = args
        .request
        .replay
        .ok_or(ArgsError::MissingFlag { flag: "--attempt-id" })?;
    let name = args.name.as_deref().unwrap_or_default();
    match services.attempts().remove_with_confirmation(id, name).await {
        DeleteOutcome::Deleted => println!("Eintrag geloescht."),
        DeleteOutcome::NameMismatch { expected } => {
            println!("Dieser Eintrag wurde von \"{expected}\" erstellt.");
        }
        DeleteOutcome::NotFound => println!("Eintrag {id} nicht gefunden."),
        DeleteOutcome::Failed => println!("Loeschen nicht moeglich."),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = open_services(&parsed.backend).await?;

    match cmd {
        Command::Run => run_exercise(&services, &parsed).await,
        Command::Journal => Ok(print_journal(&services).await?),
        Command::Delete => delete_attempt(&services, &parsed).await,
    }
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
