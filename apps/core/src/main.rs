use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use aleph_core::backend::LauncherBackend;
use aleph_core::config::{self, Config};
use aleph_core::contract::SessionSnapshot;
use aleph_core::local_backend::LocalBackend;
use aleph_core::logging;
use aleph_core::model::{Domain, NavKey};
use aleph_core::runtime::{RuntimeError, SessionRuntime};
use aleph_core::session::SessionEvent;
use aleph_core::transport;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "aleph-core", version, about = "Keyboard-driven launcher core")]
struct Cli {
    /// Config file (TOML, or JSON5 for .json/.json5).
    #[arg(long, env = "ALEPH_CONFIG")]
    config: Option<PathBuf>,
    /// Print snapshots as JSON lines.
    #[arg(long)]
    json: bool,
    #[arg(long, value_enum, default_value_t = ModeArg::Apps)]
    mode: ModeArg,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer JSON command requests from stdin, one per line.
    Serve,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Apps,
    Files,
    Assistant,
}

impl From<ModeArg> for Domain {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Apps => Domain::Applications,
            ModeArg::Files => Domain::Files,
            ModeArg::Assistant => Domain::Assistant,
        }
    }
}

#[derive(Debug, PartialEq)]
enum ReplLine {
    Event(SessionEvent),
    Quit,
    Unknown(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("[aleph-core] {error}");
            return ExitCode::from(2);
        }
    };

    if let Err(error) = run(cli, config) {
        eprintln!("[aleph-core] runtime failed: {error}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli, config: Config) -> Result<(), RuntimeError> {
    if !config.config_path.exists() {
        config::save(&config)?;
    }
    let log_path = logging::init(&config)?;
    info!(
        config_path = %config.config_path.display(),
        index_db_path = %config.index_db_path.display(),
        log_path = %log_path.display(),
        "startup"
    );

    let backend: Arc<dyn LauncherBackend> = Arc::new(LocalBackend::open(&config)?);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Some(Command::Serve) => rt.block_on(serve(backend)),
        None => rt.block_on(repl(&config, backend, cli.mode.into(), cli.json)),
    }
}

async fn serve(backend: Arc<dyn LauncherBackend>) -> Result<(), RuntimeError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = transport::handle_json(backend.as_ref(), &line).await;
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

async fn repl(
    config: &Config,
    backend: Arc<dyn LauncherBackend>,
    mode: Domain,
    json: bool,
) -> Result<(), RuntimeError> {
    let mut session = SessionRuntime::from_config(config, backend, mode);
    session.start();
    session.settle().await;
    print_snapshot(&session.snapshot(), json)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplLine::Quit => break,
            ReplLine::Unknown(command) => {
                eprintln!("[aleph-core] unknown command: {command}");
                continue;
            }
            ReplLine::Event(event) => session.submit(event),
        }
        session.settle().await;
        print_snapshot(&session.snapshot(), json)?;
    }
    Ok(())
}

fn parse_line(line: &str) -> ReplLine {
    let Some(command) = line.strip_prefix(':') else {
        return ReplLine::Event(SessionEvent::Input(line.to_string()));
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((command.trim(), ""));
    match name {
        "up" => ReplLine::Event(SessionEvent::Key(NavKey::Up)),
        "down" => ReplLine::Event(SessionEvent::Key(NavKey::Down)),
        "enter" => ReplLine::Event(SessionEvent::Key(NavKey::Enter)),
        "esc" => ReplLine::Event(SessionEvent::Key(NavKey::Escape)),
        "quit" | "q" => ReplLine::Quit,
        "mode" => match Domain::parse(arg) {
            Some(domain) => ReplLine::Event(SessionEvent::SwitchMode(domain)),
            None => ReplLine::Unknown(line.to_string()),
        },
        _ => ReplLine::Unknown(line.to_string()),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) -> Result<(), RuntimeError> {
    let mut stdout = std::io::stdout().lock();
    if json {
        let encoded = serde_json::to_string(snapshot)?;
        writeln!(stdout, "{encoded}")?;
    } else {
        write!(stdout, "{}", render_snapshot(snapshot))?;
    }
    stdout.flush()?;
    Ok(())
}

fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let badges = snapshot
        .statuses
        .iter()
        .map(|badge| format!("{}: {}", badge.domain, badge.label))
        .collect::<Vec<_>>()
        .join(" | ");
    let loading = if snapshot.loading { " (loading)" } else { "" };
    out.push_str(&format!(
        "[{}] \"{}\"{loading}  {badges}\n",
        snapshot.mode, snapshot.query
    ));

    for (index, row) in snapshot.results.iter().enumerate() {
        let marker = if index == snapshot.selected_index { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker} {} [{}] {}\n",
            row.display_name, row.glyph, row.path
        ));
    }

    if let Some(assistant) = &snapshot.assistant {
        for turn in &assistant.recent {
            out.push_str(&format!("  you: {}\n  assistant: {}\n", turn.query, turn.response));
        }
        if assistant.pending {
            out.push_str("  thinking...\n");
        }
    }

    if let Some(hint) = &snapshot.hint {
        out.push_str(&format!("  {hint}\n"));
    }
    out
}
