//! Stored layout of the workout collection.
//!
//! The blob is a versioned envelope `{"version": 1, "workouts": [...]}`. Each
//! record is tagged by `"type"` and carries its derived fields, so restoring
//! never recomputes pace, speed or description. A bare array of records (the
//! unversioned layout written by earlier releases) is accepted on decode.

use crate::dlog;
use crate::error::{Error, Field, Result};
use crate::types::{Coords, Metrics, Workout, WorkoutId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutRecord {
    Running(RunningRecord),
    Cycling(CyclingRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub cadence: f64,
    pub pace: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclingRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub elevation_gain: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonRecord {
    pub id: WorkoutId,
    pub date: DateTime<Utc>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    pub description: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    workouts: &'a [WorkoutRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Versioned {
        version: u32,
        workouts: Vec<JsonValue>,
    },
    Legacy(Vec<JsonValue>),
}

impl From<&Workout> for WorkoutRecord {
    fn from(w: &Workout) -> Self {
        let common = CommonRecord {
            id: w.id().clone(),
            date: w.created_at(),
            coords: w.coords(),
            distance: w.distance_km(),
            duration: w.duration_min(),
            clicks: w.clicks(),
            description: w.description().to_string(),
        };
        match *w.metrics() {
            Metrics::Running { cadence, pace } => Self::Running(RunningRecord {
                common,
                cadence,
                pace,
            }),
            Metrics::Cycling {
                elevation_gain,
                speed,
            } => Self::Cycling(CyclingRecord {
                common,
                elevation_gain,
                speed,
            }),
        }
    }
}

impl WorkoutRecord {
    /// Rebuild a full workout, dispatching on the stored kind.
    pub fn into_workout(self) -> Workout {
        match self {
            Self::Running(r) => rebuild(
                r.common,
                Metrics::Running {
                    cadence: r.cadence,
                    pace: r.pace,
                },
            ),
            Self::Cycling(r) => rebuild(
                r.common,
                Metrics::Cycling {
                    elevation_gain: r.elevation_gain,
                    speed: r.speed,
                },
            ),
        }
    }
}

fn rebuild(c: CommonRecord, metrics: Metrics) -> Workout {
    Workout::restore(
        c.id,
        c.date,
        c.coords,
        c.distance,
        c.duration,
        metrics,
        c.description,
        c.clicks,
    )
}

/// Serialize the whole ordered collection.
///
/// JSON would write NaN or infinity as `null`, which then fails to decode, so
/// such workouts are refused here instead of being silently lost on restore.
pub fn encode(workouts: &[Workout]) -> Result<String> {
    if let Some((w, field)) = workouts
        .iter()
        .find_map(|w| non_finite_field(w).map(|f| (w, f)))
    {
        return Err(Error::NonFinite {
            id: w.id().to_string(),
            field,
        });
    }

    let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from).collect();
    Ok(serde_json::to_string(&Envelope {
        version: FORMAT_VERSION,
        workouts: &records,
    })?)
}

/// First stored number of `w` that JSON cannot carry.
pub fn non_finite_field(w: &Workout) -> Option<Field> {
    let (derived, extra) = match *w.metrics() {
        Metrics::Running { cadence, pace } => ((Field::Pace, pace), (Field::Cadence, cadence)),
        Metrics::Cycling {
            elevation_gain,
            speed,
        } => ((Field::Speed, speed), (Field::Elevation, elevation_gain)),
    };
    [
        (Field::Latitude, w.coords().lat),
        (Field::Longitude, w.coords().lng),
        (Field::Distance, w.distance_km()),
        (Field::Duration, w.duration_min()),
        extra,
        derived,
    ]
    .into_iter()
    .find_map(|(field, v)| (!v.is_finite()).then_some(field))
}

/// Restore a collection from a stored blob.
///
/// A missing or unreadable blob yields an empty collection. Records that fail
/// to decode are skipped; the rest keep their stored order.
pub fn decode(blob: Option<&str>) -> Vec<Workout> {
    let Some(blob) = blob else {
        dlog!("no stored workouts");
        return Vec::new();
    };

    let values = match serde_json::from_str::<StoredBlob>(blob) {
        Ok(StoredBlob::Versioned { version, workouts }) => {
            if version > FORMAT_VERSION {
                tracing::warn!(
                    version,
                    supported = FORMAT_VERSION,
                    "stored workouts use a newer format; reading what we can"
                );
            }
            workouts
        }
        Ok(StoredBlob::Legacy(workouts)) => {
            dlog!("restoring unversioned workout list len={}", workouts.len());
            workouts
        }
        Err(e) => {
            tracing::warn!(err = %e, "stored workouts are unreadable; starting empty");
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<WorkoutRecord>(value) {
            Ok(record) => out.push(record.into_workout()),
            Err(e) => tracing::warn!(idx, err = %e, "skipping unreadable workout record"),
        }
    }
    out
}
