use crate::config::Config;
use crate::error::ProviderError;
use crate::lookup::{LookupController, LookupTicket};
use crate::map::MapView;
use crate::models::ProviderResponse;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct App {
    pub controller: LookupController,
    pub map: MapView,
    pub tick_count: usize,
    pub should_quit: bool,

    // Footer status
    pub last_update: Option<DateTime<Local>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            controller: LookupController::new(),
            map: MapView::from_config(&config.map),
            tick_count: 0,
            should_quit: false,
            last_update: None,
        }
    }

    /// Kicks off the startup lookup for the caller's own address.
    pub fn start(&mut self) -> Option<LookupTicket> {
        self.controller.begin_initial()
    }

    pub fn on_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Applies a key press. Returns a ticket when the key started a lookup;
    /// the caller is responsible for running it.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<LookupTicket> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.should_quit = true;
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => return self.controller.begin_submit(),
            KeyCode::Backspace => {
                self.controller.pop_char();
            }
            KeyCode::Char(c) => {
                self.controller.push_char(c);
            }
            _ => {}
        }
        None
    }

    /// Feeds a finished lookup into the controller and, if it resolved, into the map.
    pub fn on_lookup_finished(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<ProviderResponse, ProviderError>,
    ) {
        if let Some(result) = self.controller.complete(ticket, outcome) {
            self.map.on_result_changed(Some(result));
            self.last_update = Some(Local::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::QueryState;
    use crate::models::{Coordinate, ProviderLocation};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    fn located(lat: f64, lng: f64) -> ProviderResponse {
        ProviderResponse {
            ip: Some("9.9.9.9".into()),
            isp: None,
            location: Some(ProviderLocation {
                lat: Some(lat),
                lng: Some(lng),
                city: Some("Zurich".into()),
                country: Some("CH".into()),
                timezone: None,
            }),
        }
    }

    #[test]
    fn typing_and_enter_submit_the_query() {
        let mut app = App::new(&Config::default());
        type_text(&mut app, "9.9.9.99");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.controller.query_input(), "9.9.9.9");

        let ticket = app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(ticket.address(), Some("9.9.9.9"));
        assert!(app.controller.is_loading());

        // Input is frozen while loading, and a second Enter is refused.
        type_text(&mut app, "x");
        assert_eq!(app.controller.query_input(), "9.9.9.9");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());

        app.on_lookup_finished(ticket, Ok(located(47.37, 8.54)));
        assert_eq!(app.controller.query_input(), "");
        assert_eq!(app.map.center(), Coordinate { lat: 47.37, lng: 8.54 });
        assert!(app.last_update.is_some());
    }

    #[test]
    fn failed_lookup_keeps_previous_map_position() {
        let mut app = App::new(&Config::default());
        let ticket = app.start().unwrap();
        app.on_lookup_finished(ticket, Ok(located(47.37, 8.54)));
        let stamped = app.last_update;

        let ticket = app.handle_key(key(KeyCode::Enter)).unwrap();
        app.on_lookup_finished(ticket, Ok(ProviderResponse::default()));

        assert!(matches!(app.controller.state(), QueryState::Failed(_)));
        assert_eq!(app.map.center(), Coordinate { lat: 47.37, lng: 8.54 });
        assert_eq!(app.last_update, stamped);
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new(&Config::default());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = App::new(&Config::default());
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
