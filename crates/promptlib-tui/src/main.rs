mod app;
mod cli;
mod editor;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{error, info};

use app::App;
use cli::{CliAction, LaunchOptions};
use promptlib_core::clipboard::SystemClipboard;
use promptlib_core::config;
use promptlib_core::keymap::Keymap;
use promptlib_core::logging;
use promptlib_core::store::FileStore;

#[tokio::main]
async fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let launch_opts = match cli::run(&args) {
        CliAction::Exit(code) => std::process::exit(code),
        CliAction::LaunchTui(opts) => opts,
    };

    // Resolve storage before terminal setup so errors print cleanly
    let Some(data_dir) = resolve_data_dir(&launch_opts) else {
        eprintln!("Error: cannot determine a data directory.");
        eprintln!("Set HOME, or pass --data-dir <path>.");
        std::process::exit(1);
    };
    if let Err(e) = logging::init_file(&data_dir.join("promptlib.log"), "info") {
        eprintln!("Warning: logging disabled ({e})");
    }
    info!(dir = %data_dir.display(), "starting promptlib");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, launch_opts, data_dir).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!(error = %e, "terminal loop failed");
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn resolve_data_dir(opts: &LaunchOptions) -> Option<PathBuf> {
    opts.data_dir
        .clone()
        .or_else(|| config::data_dir(&config::load_settings()))
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    launch_opts: LaunchOptions,
    data_dir: PathBuf,
) -> io::Result<()> {
    let mut app = App::new(
        Box::new(FileStore::new(data_dir)),
        Box::new(SystemClipboard::new()),
        Keymap::load(),
    );

    // Prompts from `promptlib import`
    for text in &launch_opts.prompts {
        app.add_prompt(text);
    }

    // Dedicated thread for crossterm event reading
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    std::thread::spawn(move || loop {
        if event::poll(Duration::from_millis(50)).unwrap_or(false) {
            if let Ok(ev) = event::read() {
                if event_tx.send(ev).is_err() {
                    break;
                }
            }
        }
    });

    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal.draw(|f| ui::render(f, &mut app))?;

        tokio::select! {
            Some(ev) = event_rx.recv() => {
                match ev {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Event::Paste(text) => app.handle_paste(&text),
                    _ => {}
                }
            }
            _ = tick_interval.tick() => {
                app.clear_expired_status();
            }
        }

        if app.should_quit {
            info!(prompts = app.library.len(), "exiting");
            return Ok(());
        }
    }
}
