use color_eyre::Result;
use iptrack_tui::{
    api::GeoProvider,
    app::App,
    config::Config,
    events::{spawn_lookup, Event, EventHandler},
    logging, ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook();

    let config = Config::load();
    let provider = Arc::new(GeoProvider::new(&config.provider)?);

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(&config);
    let mut events = EventHandler::new(config.ui.tick_rate_ms);

    if let Some(ticket) = app.start() {
        spawn_lookup(Arc::clone(&provider), ticket, events.tx.clone());
    }

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        match events.next().await {
            Some(Event::Tick) => app.on_tick(),
            Some(Event::Input(key)) => {
                if let Some(ticket) = app.handle_key(key) {
                    spawn_lookup(Arc::clone(&provider), ticket, events.tx.clone());
                }
            }
            Some(Event::LookupFinished { ticket, outcome }) => {
                app.on_lookup_finished(ticket, outcome)
            }
            None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Shut down cleanly.");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
