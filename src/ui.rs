//! TUI rendering
//!
//! This module handles all drawing with `ratatui`: the search box, the
//! four-field results panel, and the map canvas with its marker. The results
//! panel content is computed by [`panel_view`] so it can be checked without a
//! terminal.

use crate::app::App;
use crate::lookup::QueryState;
use crate::map::MapView;
use ratatui::{
    prelude::*,
    widgets::{canvas::*, *},
};

use ratatui::text::Line;

const PLACEHOLDER: &str = "Search for any IP address or domain";
const MISSING: &str = "N/A";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the results panel shows for a given [`QueryState`].
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Loading,
    Error(String),
    Fields(Vec<(&'static str, String)>),
}

pub fn panel_view(state: &QueryState) -> PanelView {
    match state {
        QueryState::Loading => PanelView::Loading,
        QueryState::Failed(reason) => PanelView::Error(reason.to_string()),
        QueryState::Idle => PanelView::Fields(vec![
            ("IP Address", MISSING.to_string()),
            ("Location", MISSING.to_string()),
            ("Timezone", MISSING.to_string()),
            ("ISP", MISSING.to_string()),
        ]),
        QueryState::Resolved(result) => PanelView::Fields(vec![
            ("IP Address", non_empty(Some(result.ip.as_str()))),
            ("Location", result.place_label().unwrap_or_else(|| MISSING.to_string())),
            (
                "Timezone",
                result
                    .timezone
                    .as_deref()
                    .filter(|tz| !tz.trim().is_empty())
                    .map(|tz| format!("UTC {}", tz))
                    .unwrap_or_else(|| MISSING.to_string()),
            ),
            ("ISP", non_empty(result.isp.as_deref())),
        ]),
    }
}

fn non_empty(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Renders one frame.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search box
            Constraint::Length(4), // Results panel
            Constraint::Min(6),    // Map
            Constraint::Length(1), // Footer
        ])
        .split(f.size());

    let title = Paragraph::new(" IP Address Tracker ")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    render_search_box(f, app, chunks[1]);
    render_results_panel(f, app, chunks[2]);
    render_map(f, &app.map, chunks[3]);
    render_footer(f, app, chunks[4]);
}

fn render_search_box(f: &mut Frame, app: &App, area: Rect) {
    let loading = app.controller.is_loading();
    let input = app.controller.query_input();

    let text = if input.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else if loading {
        Span::styled(input, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input)
    };

    let border_style = if loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let search = Paragraph::new(Line::from(text)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    f.render_widget(search, area);

    if !loading {
        let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(1).saturating_add(typed);
        f.set_cursor(cursor_x.min(area.right().saturating_sub(2)), area.y + 1);
    }
}

fn render_results_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel_view(app.controller.state()) {
        PanelView::Loading => {
            let p = Paragraph::new("Loading...").alignment(Alignment::Center);
            f.render_widget(p, inner);
        }
        PanelView::Error(reason) => {
            let p = Paragraph::new(reason)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            f.render_widget(p, inner);
        }
        PanelView::Fields(fields) => {
            let constraints = vec![Constraint::Ratio(1, fields.len() as u32); fields.len()];
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(constraints)
                .split(inner);

            for ((label, value), column) in fields.into_iter().zip(columns.iter()) {
                let cell = Paragraph::new(vec![
                    Line::from(Span::styled(
                        label.to_uppercase(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        value,
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                ])
                .alignment(Alignment::Center);
                f.render_widget(cell, *column);
            }
        }
    }
}

fn render_map(f: &mut Frame, map: &MapView, area: Rect) {
    let viewport = map.viewport();
    let center = map.center();
    let marker = map.marker().cloned();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(
                    " Map  {:.4}, {:.4}  z{} ",
                    center.lat,
                    center.lng,
                    map.zoom()
                ))
                .borders(Borders::ALL),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds)
        .y_bounds(viewport.y_bounds)
        .paint(move |ctx| {
            // Landmass outlines
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });
            ctx.layer();

            match &marker {
                Some(marker) => {
                    let mut spans = vec![Span::styled(
                        format!(" {} ", marker.icon.glyph),
                        Style::default()
                            .fg(marker.icon.color)
                            .add_modifier(Modifier::BOLD),
                    )];
                    if let Some(label) = &marker.label {
                        spans.push(Span::styled(
                            format!(" {} ", label),
                            Style::default().fg(Color::Black).bg(Color::White),
                        ));
                    }
                    ctx.print(
                        marker.coordinate.lng,
                        marker.coordinate.lat,
                        Line::from(spans),
                    );
                }
                None => {
                    ctx.print(
                        center.lng,
                        center.lat,
                        Line::from(Span::styled(" ⌖ ", Style::default().fg(Color::DarkGray))),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.controller.is_loading() {
        Span::styled(
            format!(" {} looking up ", SPINNER[app.tick_count % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )
    } else {
        match app.last_update {
            Some(at) => Span::styled(
                format!(" Updated {} ", at.format("%H:%M:%S")),
                Style::default().fg(Color::Green),
            ),
            None => Span::styled(" No location yet ", Style::default().fg(Color::DarkGray)),
        }
    };

    let footer = Paragraph::new(Line::from(vec![
        status,
        Span::raw("│"),
        Span::styled(
            " Enter search (empty = your IP)   Backspace delete   Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(footer, area);
}
