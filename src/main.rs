//! gv - a terminal diff viewer for git worktrees.

use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;

use gv::config::{normalize_context, Config};
use gv::core::{detect_main_branch, LayoutMode, RepoError, RepoRoot};
use gv::theme::Theme;
use gv::ui::{handle_input, render, App, AppOptions};

/// Review branch changes across git worktrees.
#[derive(Parser, Debug)]
#[command(name = "gv", version, about)]
struct Cli {
    /// Repository or worktree to open (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Branch to compare against (defaults to config, then main/master)
    #[arg(short = 'b', long = "base")]
    base: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Color theme (default, light)
    #[arg(short = 't', long = "theme", value_name = "THEME")]
    theme: Option<String>,

    /// Initial context lines (0, 1 or 3)
    #[arg(long = "context", value_name = "N")]
    context: Option<u32>,

    /// Start in unified layout
    #[arg(long = "unified")]
    unified: bool,
}

/// RAII guard for terminal state. Restores terminal on drop (including panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    // Mouse capture goes first, while still in raw mode
    let _ = execute!(io::stdout(), DisableMouseCapture);
    let _ = io::stdout().flush();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = io::stdout().flush();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let log_path = gv::logging::init()?;
    gv::metrics::init();
    if let Some(path) = &log_path {
        info!(path = %path.display(), "logging enabled");
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };

    let start = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let repo = match RepoRoot::discover(&start) {
        Ok(repo) => repo,
        Err(RepoError::NotARepo) => anyhow::bail!("not inside a git repository"),
        Err(e) => return Err(e.into()),
    };

    let options = app_options(&cli, &config, &start);
    let mut app = App::new(repo, &start, options)?;

    run_tui(&mut app)
}

/// Merge command-line flags over the config file.
fn app_options(cli: &Cli, config: &Config, start: &Path) -> AppOptions {
    let base = cli
        .base
        .clone()
        .or_else(|| config.base_branch.clone())
        .unwrap_or_else(|| detect_main_branch(start));

    let theme_name = cli.theme.as_deref().or(config.theme.as_deref()).unwrap_or("default");
    let theme = Theme::load(theme_name).with_overrides(&config.colors);

    let layout = if cli.unified {
        LayoutMode::Unified
    } else {
        config.layout_mode()
    };

    AppOptions {
        base,
        context_lines: cli.context.map_or_else(|| config.context_lines(), normalize_context),
        layout,
        hidden: config.hidden_filter(),
        theme,
    }
}

/// Run the TUI until the user quits.
fn run_tui(app: &mut App) -> Result<()> {
    // Restore the terminal before the default hook prints the panic
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    run_loop(&mut terminal, app)
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.poll_worker();
        app.tick();

        // Only redraw if dirty or on resize
        if app.ui.dirty {
            terminal.draw(|frame| render(frame, app))?;
            app.clear_dirty();
        }

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;

            if matches!(event, crossterm::event::Event::Resize(_, _)) {
                app.mark_dirty();
            }

            handle_input(app, event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
