// ============================================================================
// SahamData - Point d'entrée
// ============================================================================
// TUI : saisir un symbole, choisir intervalle et période, récupérer
// l'historique Yahoo Finance, le voir en tableau ou en graphique, l'exporter
// en CSV.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime::block_on pour les fetchs
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use sahamdata::app::{fetch_and_normalize, App};
use sahamdata::export::default_export_dir;
use sahamdata::ui::events::{
    get_char_from_event, is_backspace_event, is_chart_toggle_event, is_down_event, is_enter_event,
    is_export_event, is_force_quit_event, is_next_field_event, is_next_value_event,
    is_previous_field_event, is_previous_value_event, is_quit_event, is_symbol_char_event,
    is_up_event, Event,
};
use sahamdata::ui::{render, EventHandler};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : les logs vont
// dans un fichier. Rien n'est écrit tant que RUST_LOG n'est pas défini.
//
// # Utilisation
// ```bash
// RUST_LOG=debug cargo run
// tail -f logs/sahamdata.log.*
// ```
// ============================================================================

/// Initialise le logging vers fichier si RUST_LOG est défini
///
/// Retourne false si aucun subscriber n'a été installé.
fn init_logging() -> Result<bool> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(false);
    }

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "sahamdata.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sahamdata=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(true)
}

fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
    }

    info!("SahamData starting up");

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let mut terminal = setup_terminal().context("Échec de l'initialisation du terminal")?;
    let mut app = App::new();
    let events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &events, &runtime);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal).context("Échec de la restauration du terminal")?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================

fn run(terminal: &mut Tui, app: &mut App, events: &EventHandler, runtime: &tokio::runtime::Runtime) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        if is_enter_event(&event) {
            fetch(terminal, app, runtime)?;
        } else {
            handle_event(app, &event);
        }
    }

    Ok(())
}

/// Fetch bloquant : affiche le chargement, puis applique le résultat
fn fetch(terminal: &mut Tui, app: &mut App, runtime: &tokio::runtime::Runtime) -> Result<()> {
    app.cancel_quit();

    let Some(request) = app.pending_request() else {
        return Ok(());
    };

    info!(symbol = %request.symbol, interval = %request.interval, period = %request.period, "User requested fetch");
    app.start_loading(&request);
    terminal.draw(|frame| render(frame, app))?;

    let outcome = runtime.block_on(fetch_and_normalize(request));
    app.apply_outcome(outcome);
    Ok(())
}

/// Applique un événement clavier à l'état de la session
fn handle_event(app: &mut App, event: &Event) {
    if matches!(event, Event::Tick) {
        return;
    }

    if is_force_quit_event(event) {
        info!("User forced quit");
        app.quit();
        return;
    }

    if is_quit_event(event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.request_quit();
        }
        return;
    }

    // N'importe quelle autre touche annule la confirmation
    app.cancel_quit();

    if is_next_field_event(event) {
        app.focus_next();
    } else if is_previous_field_event(event) {
        app.focus_previous();
    } else if is_next_value_event(event) {
        app.select_next();
    } else if is_previous_value_event(event) {
        app.select_previous();
    } else if is_up_event(event) {
        app.scroll_up();
    } else if is_down_event(event) {
        app.scroll_down();
    } else if is_chart_toggle_event(event) {
        app.toggle_chart();
    } else if is_export_event(event) {
        let dir = default_export_dir();
        debug!(dir = %dir.display(), "User requested CSV export");
        app.export_to(&dir);
    } else if is_backspace_event(event) {
        app.backspace();
    } else if is_symbol_char_event(event) {
        if let Some(c) = get_char_from_event(event) {
            app.append_char(c);
        }
    }
}

// ============================================================================
// Terminal
// ============================================================================

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
