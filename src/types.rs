use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase name used in storage and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Unit of the derived metric (pace or speed).
    pub const fn metric_unit(self) -> &'static str {
        match self {
            Self::Running => "min/km",
            Self::Cycling => "km/h",
        }
    }

    /// Unit of the kind-specific input (cadence or elevation gain).
    pub const fn extra_unit(self) -> &'static str {
        match self {
            Self::Running => "spm",
            Self::Cycling => "m",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("running") {
            Ok(Self::Running)
        } else if s.eq_ignore_ascii_case("cycling") {
            Ok(Self::Cycling)
        } else {
            Err(s.to_string())
        }
    }
}

/// Latitude/longitude pair, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific input together with the metric derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metrics {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

impl Metrics {
    pub fn running(distance_km: f64, duration_min: f64, cadence: f64) -> Self {
        Self::Running {
            cadence,
            pace: pace_min_per_km(distance_km, duration_min),
        }
    }

    pub fn cycling(distance_km: f64, duration_min: f64, elevation_gain: f64) -> Self {
        Self::Cycling {
            elevation_gain,
            speed: speed_km_per_h(distance_km, duration_min),
        }
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Pace for running, speed for cycling.
    pub const fn derived(&self) -> f64 {
        match *self {
            Self::Running { pace, .. } => pace,
            Self::Cycling { speed, .. } => speed,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub const fn extra(&self) -> f64 {
        match *self {
            Self::Running { cadence, .. } => cadence,
            Self::Cycling { elevation_gain, .. } => elevation_gain,
        }
    }
}

/// Minutes per kilometre.
pub fn pace_min_per_km(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

/// Kilometres per hour.
pub fn speed_km_per_h(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / 60.0)
}

/// `"Running on April 14"`.
pub fn describe(kind: WorkoutKind, date: NaiveDate) -> String {
    format!(
        "{} on {} {}",
        kind.label(),
        MONTHS[date.month0() as usize],
        date.day()
    )
}

/// A single recorded workout.
///
/// Derived fields (pace or speed, description) are fixed at construction and
/// never recomputed, including after a restore from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    metrics: Metrics,
    description: String,
    clicks: u32,
}

impl Workout {
    /// Build a new workout of `kind`. `metric` is the cadence for running and
    /// the elevation gain for cycling. No range checks happen here.
    pub fn create(
        kind: WorkoutKind,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        metric: f64,
    ) -> Self {
        Self::create_at(Utc::now(), kind, coords, distance_km, duration_min, metric)
    }

    pub fn create_at(
        created_at: DateTime<Utc>,
        kind: WorkoutKind,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        metric: f64,
    ) -> Self {
        let metrics = match kind {
            WorkoutKind::Running => Metrics::running(distance_km, duration_min, metric),
            WorkoutKind::Cycling => Metrics::cycling(distance_km, duration_min, metric),
        };
        let local_date = created_at.with_timezone(&Local).date_naive();

        Self {
            id: WorkoutId::generate(),
            created_at,
            coords,
            distance_km,
            duration_min,
            metrics,
            description: describe(kind, local_date),
            clicks: 0,
        }
    }

    /// Reassemble a workout from stored parts, keeping every derived field as given.
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn restore(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        metrics: Metrics,
        description: String,
        clicks: u32,
    ) -> Self {
        Self {
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            metrics,
            description,
            clicks,
        }
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn clicks(&self) -> u32 {
        self.clicks
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { pace, .. } => Some(pace),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed, .. } => Some(speed),
            Metrics::Running { .. } => None,
        }
    }

    pub const fn cadence(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { cadence, .. } => Some(cadence),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { elevation_gain, .. } => Some(elevation_gain),
            Metrics::Running { .. } => None,
        }
    }

    pub const fn click(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }

    /// Map popup text: kind icon followed by the description.
    pub fn popup_text(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}
