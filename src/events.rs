//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks and lookup
//! completions) and the [`EventHandler`], which runs a dedicated thread that
//! polls crossterm for key events and emits periodic [`Event::Tick`]s.
//! Lookup tasks post their results through [`EventHandler::tx`], see
//! [`spawn_lookup`].

use crate::api::GeoProvider;
use crate::error::ProviderError;
use crate::lookup::LookupTicket;
use crate::models::ProviderResponse;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for UI refresh.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// A provider call finished, successfully or not.
    LookupFinished {
        /// The ticket handed out when the lookup began.
        ticket: LookupTicket,
        /// Raw provider outcome; normalization happens in the controller.
        outcome: Result<ProviderResponse, ProviderError>,
    },
}

/// Multiplexes terminal input, ticks and lookup results into a single stream.
///
/// The sender ([`tx`](EventHandler::tx)) can be cloned and given to other
/// tasks, while the receiver is consumed by [`next`](EventHandler::next) in
/// the main loop.
pub struct EventHandler {
    /// Sender for posting events (e.g. from lookup tasks).
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick thread.
    ///
    /// crossterm's `poll`/`read` block, so they run on their own OS thread
    /// rather than a runtime worker; lookup tasks keep making progress even
    /// on a single-worker runtime. The thread polls with a timeout of
    /// `tick_rate_ms`; when a key is pressed it sends [`Event::Input`], and
    /// when the tick interval elapses it sends [`Event::Tick`]. It stops if
    /// the terminal can no longer be read or the receiver is gone.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        // Windows reports releases too
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            if event_tx.send(Event::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Runs the provider call for `ticket` on the runtime and reports back as
/// [`Event::LookupFinished`]. Every ticket produces exactly one event, even if
/// the request task dies.
pub fn spawn_lookup(
    provider: Arc<GeoProvider>,
    ticket: LookupTicket,
    tx: mpsc::UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        let address = ticket.address().map(str::to_owned);
        let request = tokio::spawn(async move { provider.lookup(address.as_deref()).await });

        let outcome = match request.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ProviderError::TaskFailed(e.to_string())),
        };
        debug!("Lookup #{} finished", ticket.id());
        if tx.send(Event::LookupFinished { ticket, outcome }).is_err() {
            debug!("Event loop gone; dropping lookup result");
        }
    });
}
