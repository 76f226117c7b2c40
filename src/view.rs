//! Seams towards the list view and the map widget, plus terminal stand-ins.

use crate::types::{Coords, Metrics, Workout, WorkoutId, WorkoutKind};
use crate::utils::format_metric;
use std::io::{self, Write};

/// Everything the list needs to draw one workout row.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub description: String,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Pace (running) or speed (cycling).
    pub metric: f64,
    /// Cadence (running) or elevation gain (cycling).
    pub extra: f64,
}

impl From<&Workout> for WorkoutSummary {
    fn from(w: &Workout) -> Self {
        let m: &Metrics = w.metrics();
        Self {
            id: w.id().clone(),
            kind: w.kind(),
            description: w.description().to_string(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            metric: m.derived(),
            extra: m.extra(),
        }
    }
}

impl WorkoutSummary {
    /// Single-line rendering, derived metric to one decimal.
    pub fn to_line(&self) -> String {
        let extra_icon = match self.kind {
            WorkoutKind::Running => "🦶🏼",
            WorkoutKind::Cycling => "⛰",
        };
        format!(
            "{icon} {desc}\t{dist} km\t⏱ {dur} min\t⚡️ {metric} {metric_unit}\t{extra_icon} {extra} {extra_unit}\t[{id}]",
            icon = self.kind.icon(),
            desc = self.description,
            dist = self.distance_km,
            dur = self.duration_min,
            metric = format_metric(self.metric),
            metric_unit = self.kind.metric_unit(),
            extra = self.extra,
            extra_unit = self.kind.extra_unit(),
            id = self.id,
        )
    }
}

/// Marker popup content and styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub class_name: String,
    pub min_width: u32,
    pub max_width: u32,
    pub auto_close: bool,
}

impl From<&Workout> for Popup {
    fn from(w: &Workout) -> Self {
        Self {
            content: w.popup_text(),
            class_name: format!("{}-popup", w.kind()),
            min_width: 100,
            max_width: 250,
            auto_close: false,
        }
    }
}

pub trait WorkoutListView {
    fn render(&mut self, row: &WorkoutSummary);
    fn clear(&mut self);
}

pub trait MapView {
    fn set_view(&mut self, at: Coords, zoom: u8);
    fn place_marker(&mut self, at: Coords, popup: &Popup);
    fn clear_markers(&mut self);
}

/// Writes one line per workout.
pub struct TerminalList<W: Write> {
    out: W,
}

impl TerminalList<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalList<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WorkoutListView for TerminalList<W> {
    fn render(&mut self, row: &WorkoutSummary) {
        if let Err(e) = writeln!(self.out, "{}", row.to_line()) {
            tracing::warn!(err = %e, "could not write workout row");
        }
    }

    fn clear(&mut self) {
        crate::dlog!("list cleared");
    }
}

/// Prints map requests instead of drawing them.
pub struct TerminalMap<W: Write> {
    out: W,
}

impl TerminalMap<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalMap<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MapView for TerminalMap<W> {
    fn set_view(&mut self, at: Coords, zoom: u8) {
        if let Err(e) = writeln!(self.out, "🗺  centered on {at} (zoom {zoom})") {
            tracing::warn!(err = %e, "could not write map view");
        }
    }

    fn place_marker(&mut self, at: Coords, popup: &Popup) {
        if let Err(e) = writeln!(self.out, "📍 {at}  {}", popup.content) {
            tracing::warn!(err = %e, "could not write map marker");
        }
    }

    fn clear_markers(&mut self) {
        crate::dlog!("map markers cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_row_shows_pace_and_cadence() {
        let w = Workout::create(WorkoutKind::Running, Coords::new(39.0, -12.0), 5.2, 24.0, 178.0);
        let row = WorkoutSummary::from(&w);
        assert_eq!(row.metric, 24.0 / 5.2);
        assert_eq!(row.extra, 178.0);
        let line = row.to_line();
        assert!(line.contains("4.6 min/km"), "{line}");
        assert!(line.contains("178 spm"), "{line}");
        assert!(line.contains(w.id().as_str()));
    }

    #[test]
    fn cycling_row_shows_speed_and_elevation() {
        let w = Workout::create(WorkoutKind::Cycling, Coords::new(39.0, -12.0), 27.0, 95.0, 523.0);
        let line = WorkoutSummary::from(&w).to_line();
        assert!(line.contains("17.1 km/h"), "{line}");
        assert!(line.contains("523 m"), "{line}");
    }

    #[test]
    fn popup_is_styled_by_kind() {
        let w = Workout::create(WorkoutKind::Cycling, Coords::new(1.0, 2.0), 1.0, 1.0, 1.0);
        let p = Popup::from(&w);
        assert_eq!(p.class_name, "cycling-popup");
        assert_eq!((p.min_width, p.max_width, p.auto_close), (100, 250, false));
        assert!(p.content.starts_with("🚴‍♀️ Cycling on "));
    }

    #[test]
    fn terminal_map_writes_requests() {
        let mut map = TerminalMap::new(Vec::new());
        map.set_view(Coords::new(39.0, -12.0), 13);
        let out = String::from_utf8(map.into_inner()).unwrap();
        assert!(out.contains("39.00000,-12.00000"));
        assert!(out.contains("zoom 13"));
    }
}
