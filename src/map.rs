//! Map view state kept in sync with the latest resolved location.
//!
//! [`MapView`] owns the single "current center" and the one marker shown on the
//! map canvas. It only ever reads the coordinate (and place label) out of a
//! [`LocationResult`]; everything about lookup lifecycle lives in
//! [`crate::lookup`].

use crate::config::MapConfig;
use crate::models::{Coordinate, LocationResult};
use ratatui::style::Color;
use std::str::FromStr;
use tracing::{debug, warn};

/// Placeholder center shown before any lookup has resolved.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 51.505,
    lng: -0.09,
};
pub const DEFAULT_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 18;

// How many tile widths of longitude are visible across the canvas.
const VISIBLE_TILES: f64 = 4.0;

/// Glyph and color for a marker. Built once from config and handed to every
/// [`Marker`] explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub glyph: String,
    pub color: Color,
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            glyph: "◉".to_string(),
            color: Color::Red,
        }
    }
}

impl MarkerIcon {
    pub fn from_config(config: &MapConfig) -> Self {
        let color = Color::from_str(&config.marker_color).unwrap_or_else(|_| {
            warn!(
                "Unknown marker color '{}', falling back to red",
                config.marker_color
            );
            Color::Red
        });
        let glyph = if config.marker_glyph.trim().is_empty() {
            MarkerIcon::default().glyph
        } else {
            config.marker_glyph.clone()
        };
        Self { glyph, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub label: Option<String>,
    pub icon: MarkerIcon,
}

impl Marker {
    pub fn new(coordinate: Coordinate, label: Option<String>, icon: MarkerIcon) -> Self {
        Self {
            coordinate,
            label,
            icon,
        }
    }
}

/// Longitude (x) and latitude (y) bounds of the visible canvas area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

#[derive(Debug, Clone)]
pub struct MapView {
    center: Coordinate,
    zoom: u8,
    marker: Option<Marker>,
    icon: MarkerIcon,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(MarkerIcon::default())
    }
}

impl MapView {
    pub fn new(icon: MarkerIcon) -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            marker: None,
            icon,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        let mut view = Self::new(MarkerIcon::from_config(config));
        view.set_zoom(config.zoom);
        view
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.min(MAX_ZOOM);
    }

    /// Re-centers on a newly resolved result and moves the marker there.
    ///
    /// Results without a coordinate (or no result at all) leave the current
    /// center and marker untouched. Zoom is never changed here. Returns
    /// whether the view moved.
    pub fn on_result_changed(&mut self, result: Option<&LocationResult>) -> bool {
        let Some((result, coordinate)) = result.and_then(|r| r.coordinate.map(|c| (r, c))) else {
            debug!("Map kept at ({}, {})", self.center.lat, self.center.lng);
            return false;
        };

        self.center = coordinate;
        self.marker = Some(Marker::new(
            coordinate,
            result.place_label(),
            self.icon.clone(),
        ));
        debug!(
            "Map centered at ({}, {}) zoom {}",
            coordinate.lat, coordinate.lng, self.zoom
        );
        true
    }

    /// Visible area around the center for the current zoom. The half-spans
    /// are capped at the globe's extent; the bounds stay centered and may run
    /// past the poles or the antimeridian.
    pub fn viewport(&self) -> Viewport {
        let tile_width = 360.0 / 2f64.powi(i32::from(self.zoom));
        let half_lng = (tile_width * VISIBLE_TILES / 2.0).min(180.0);
        let half_lat = (half_lng / 2.0).min(90.0);

        Viewport {
            x_bounds: [self.center.lng - half_lng, self.center.lng + half_lng],
            y_bounds: [self.center.lat - half_lat, self.center.lat + half_lat],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(lat: f64, lng: f64) -> LocationResult {
        LocationResult {
            ip: "1.2.3.4".into(),
            city: Some("New York".into()),
            country: Some("US".into()),
            timezone: Some("-05:00".into()),
            isp: None,
            coordinate: Coordinate::new(lat, lng),
        }
    }

    #[test]
    fn starts_at_deterministic_placeholder() {
        let view = MapView::default();
        assert_eq!(view.center(), DEFAULT_CENTER);
        assert_eq!(view.center(), Coordinate { lat: 51.505, lng: -0.09 });
        assert_eq!(view.zoom(), DEFAULT_ZOOM);
        assert!(view.marker().is_none());
    }

    #[test]
    fn recenters_and_keeps_zoom() {
        let mut view = MapView::default();
        view.set_zoom(7);

        assert!(view.on_result_changed(Some(&resolved(40.7, -74.0))));
        assert_eq!(view.center(), Coordinate { lat: 40.7, lng: -74.0 });
        assert_eq!(view.zoom(), 7);

        let marker = view.marker().unwrap();
        assert_eq!(marker.coordinate, Coordinate { lat: 40.7, lng: -74.0 });
        assert_eq!(marker.label.as_deref(), Some("New York, US"));
    }

    #[test]
    fn missing_coordinate_is_a_no_op() {
        let mut view = MapView::default();
        view.on_result_changed(Some(&resolved(40.7, -74.0)));
        let before = view.clone();

        let mut no_coord = resolved(0.0, 0.0);
        no_coord.coordinate = None;
        assert!(!view.on_result_changed(Some(&no_coord)));
        assert!(!view.on_result_changed(None));

        assert_eq!(view.center(), before.center());
        assert_eq!(view.marker(), before.marker());
    }

    #[test]
    fn marker_uses_the_configured_icon() {
        let config = MapConfig {
            zoom: 4,
            marker_glyph: "X".into(),
            marker_color: "blue".into(),
        };
        let mut view = MapView::from_config(&config);
        view.on_result_changed(Some(&resolved(1.0, 2.0)));

        let icon = &view.marker().unwrap().icon;
        assert_eq!(icon.glyph, "X");
        assert_eq!(icon.color, Color::Blue);
        assert_eq!(view.zoom(), 4);
    }

    #[test]
    fn bad_marker_color_falls_back() {
        let config = MapConfig {
            marker_color: "not-a-color".into(),
            ..MapConfig::default()
        };
        assert_eq!(MarkerIcon::from_config(&config).color, Color::Red);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = MapView::default();
        view.set_zoom(99);
        assert_eq!(view.zoom(), MAX_ZOOM);
    }

    #[test]
    fn viewport_is_centered_and_shrinks_with_zoom() {
        let mut view = MapView::default();
        view.on_result_changed(Some(&resolved(10.0, 20.0)));

        view.set_zoom(0);
        let wide = view.viewport();
        assert_eq!(wide.x_bounds, [-160.0, 200.0]);
        assert_eq!(wide.y_bounds, [-80.0, 100.0]);

        view.set_zoom(10);
        let narrow = view.viewport();
        let mid_x = (narrow.x_bounds[0] + narrow.x_bounds[1]) / 2.0;
        let mid_y = (narrow.y_bounds[0] + narrow.y_bounds[1]) / 2.0;
        assert!((mid_x - 20.0).abs() < 1e-9);
        assert!((mid_y - 10.0).abs() < 1e-9);
        assert!(narrow.x_bounds[1] - narrow.x_bounds[0] < wide.x_bounds[1] - wide.x_bounds[0]);
    }
}
