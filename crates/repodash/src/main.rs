mod app;
mod discover;
mod evaluate;
mod scan;
mod syncer;
mod table;
#[cfg(test)]
mod test_support;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use repodash_core::RecordSet;

use crate::app::{command_for, App};

const REDRAW_INTERVAL_MS: u64 = 250;

/// Scan directory trees for git repositories and show how far each one
/// is from its origin remote.
#[derive(Parser, Debug)]
#[command(name = "repodash", version, about)]
struct Cli {
    /// Root directories to scan (defaults to the current directory)
    dirs: Vec<PathBuf>,
    /// How many directory levels to search below each root
    #[arg(long, default_value_t = 2)]
    max_depth: usize,
    /// Print the status table once instead of opening the dashboard
    #[arg(long)]
    table: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.table);

    let dirs = if cli.dirs.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        cli.dirs.clone()
    };
    let mut roots = Vec::new();
    for dir in &dirs {
        roots.extend(discover::discover(dir, cli.max_depth));
    }

    let records = scan::scan(roots, scan::default_concurrency()).await;
    if records.is_empty() {
        println!("no repos found");
    } else {
        println!("found {} repos...", records.len());
    }

    if cli.table {
        if !records.is_empty() {
            print!("{}", table::render_table(&records.snapshot(), Utc::now()));
        }
        return Ok(());
    }

    run_dashboard(records).await
}

async fn run_dashboard(records: Arc<RecordSet>) -> Result<()> {
    let mut app = App::new(records);
    // the scan barrier released before the dashboard starts
    app.mark_ready();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Redraw on a fixed period; between redraws, wait for either the next
/// tick or the next key. Rendering always works from a snapshot, so
/// background sync workers never race a half-drawn record.
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(REDRAW_INTERVAL_MS));

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key)))
                        if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                    {
                        if let Some(command) = command_for(&key) {
                            if app.dispatch(command) {
                                let launched = syncer::spawn_sync_all(app.records().handles());
                                app.note_sync_launched(launched);
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn init_logging(to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_enabled = to_stderr
        || matches!(
            std::env::var("REPODASH_LOG_STDERR").ok().as_deref(),
            Some("1") | Some("true") | Some("yes")
        );
    // the dashboard owns the terminal; stray log lines would corrupt it
    if stderr_enabled {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
