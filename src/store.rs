use crate::dlog;
use crate::error::{Error, Field, Result};
use crate::record;
use crate::storage::{BlobStore, WORKOUTS_KEY};
use crate::types::{Coords, Workout, WorkoutKind};

/// Raw form fields as typed by the user.
///
/// Only the field matching the chosen kind (`cadence` for running,
/// `elevation` for cycling) is read.
#[derive(Debug, Clone, Default)]
pub struct RawWorkoutInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// Owns the ordered workout collection and its persistence.
///
/// Storage failures never fail an operation: the in-memory collection stays
/// authoritative and the store is marked degraded for the rest of the session.
pub struct WorkoutStore<S> {
    workouts: Vec<Workout>,
    storage: S,
    degraded: bool,
}

impl<S: BlobStore> WorkoutStore<S> {
    /// Restore whatever `storage` holds and take ownership of it.
    pub fn open(storage: S) -> Self {
        let (workouts, degraded) = match storage.get(WORKOUTS_KEY) {
            Ok(blob) => (restore_all(blob.as_deref()), false),
            Err(e) => {
                tracing::warn!(err = %e, "could not read stored workouts; continuing in memory");
                (Vec::new(), true)
            }
        };
        tracing::info!(workouts = workouts.len(), "restored workouts");
        Self {
            workouts,
            storage,
            degraded,
        }
    }

    /// Validate raw input, build the workout, append it and persist.
    ///
    /// Any validation error leaves both the collection and storage untouched.
    pub fn submit(&mut self, input: &RawWorkoutInput, coords: Coords) -> Result<&Workout> {
        let workout = match validate(input, coords) {
            Ok(w) => w,
            Err(e) => {
                dlog!("rejected submission: {e}");
                return Err(e);
            }
        };

        tracing::info!(
            id = %workout.id(),
            kind = %workout.kind(),
            distance_km = workout.distance_km(),
            duration_min = workout.duration_min(),
            "workout added"
        );
        self.workouts.push(workout);
        self.persist();

        let idx = self.workouts.len() - 1;
        Ok(&self.workouts[idx])
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Workout> {
        self.workouts
            .iter()
            .find(|w| w.id().as_str() == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Look up a workout picked from the list and count the click.
    pub fn select(&mut self, id: &str) -> Result<&Workout> {
        let Some(idx) = self.workouts.iter().position(|w| w.id().as_str() == id) else {
            dlog!("select miss id={id}");
            return Err(Error::NotFound(id.to_string()));
        };
        self.workouts[idx].click();
        self.persist();
        Ok(&self.workouts[idx])
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn serialize_all(&self) -> Result<String> {
        record::encode(&self.workouts)
    }

    /// Drop every workout and the stored blob.
    pub fn reset(&mut self) {
        let dropped = self.workouts.len();
        self.workouts.clear();
        if let Err(e) = self.storage.remove(WORKOUTS_KEY) {
            tracing::warn!(err = %e, "could not clear stored workouts");
            self.degraded = true;
        }
        tracing::info!(dropped, "workouts reset");
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Write the whole collection to storage now.
    pub fn save(&mut self) -> Result<()> {
        let blob = self.serialize_all()?;
        self.storage.set(WORKOUTS_KEY, &blob)?;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            tracing::warn!(err = %e, "could not save workouts; continuing in memory");
            self.degraded = true;
        }
    }
}

/// Rebuild a collection from a stored blob; absent or corrupt means empty.
pub fn restore_all(blob: Option<&str>) -> Vec<Workout> {
    record::decode(blob)
}

fn validate(input: &RawWorkoutInput, coords: Coords) -> Result<Workout> {
    let kind: WorkoutKind = input.kind.parse().map_err(Error::UnknownKind)?;

    let distance = parse_finite(Field::Distance, &input.distance)?;
    let duration = parse_finite(Field::Duration, &input.duration)?;
    let metric = match kind {
        WorkoutKind::Running => parse_finite(Field::Cadence, &input.cadence)?,
        WorkoutKind::Cycling => parse_finite(Field::Elevation, &input.elevation)?,
    };

    require_positive(Field::Distance, distance)?;
    require_positive(Field::Duration, duration)?;
    match kind {
        WorkoutKind::Running => require_positive(Field::Cadence, metric)?,
        // Elevation gain is accepted as-is, zero and negative included.
        WorkoutKind::Cycling => {}
    }

    require_finite_coord(Field::Latitude, coords.lat)?;
    require_finite_coord(Field::Longitude, coords.lng)?;

    // A tiny distance or duration can still push pace or speed to infinity.
    let workout = Workout::create(kind, coords, distance, duration, metric);
    let derived = workout.metrics().derived();
    if !derived.is_finite() {
        let field = match kind {
            WorkoutKind::Running => Field::Pace,
            WorkoutKind::Cycling => Field::Speed,
        };
        return Err(Error::Range {
            field,
            value: derived,
        });
    }
    Ok(workout)
}

fn require_finite_coord(field: Field, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Parse {
            field,
            raw: value.to_string(),
        })
    }
}

fn parse_finite(field: Field, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Parse {
            field,
            raw: raw.to_string(),
        })
}

fn require_positive(field: Field, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::Range { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn here() -> Coords {
        Coords::new(39.0, -12.0)
    }

    fn running(distance: &str, duration: &str, cadence: &str) -> RawWorkoutInput {
        RawWorkoutInput {
            kind: "running".into(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            ..Default::default()
        }
    }

    fn cycling(distance: &str, duration: &str, elevation: &str) -> RawWorkoutInput {
        RawWorkoutInput {
            kind: "cycling".into(),
            distance: distance.into(),
            duration: duration.into(),
            elevation: elevation.into(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_accepts_whitespace_and_exponents() {
        assert_eq!(parse_finite(Field::Distance, " 5.2 ").unwrap(), 5.2);
        assert_eq!(parse_finite(Field::Distance, "1e1").unwrap(), 10.0);
    }

    #[test]
    fn parse_rejects_empty_and_non_finite() {
        for raw in ["", "  ", "abc", "inf", "NaN", "-infinity", "5km"] {
            assert!(
                matches!(
                    parse_finite(Field::Duration, raw),
                    Err(Error::Parse { field: Field::Duration, .. })
                ),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn running_submission_is_appended_and_saved() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());
        let w = store.submit(&running("5.2", "24", "178"), here()).unwrap();
        assert_eq!(w.pace(), Some(24.0 / 5.2));
        let id = w.id().clone();

        assert_eq!(store.len(), 1);
        let saved = store.storage().get(WORKOUTS_KEY).unwrap().unwrap();
        assert!(saved.contains(id.as_str()));
        assert!(!store.is_degraded());
    }

    #[test]
    fn cycling_ignores_cadence_field() {
        let mut input = cycling("27", "95", "523");
        input.cadence = "garbage".into();
        let mut store = WorkoutStore::open(MemoryBlobStore::new());
        let w = store.submit(&input, here()).unwrap();
        assert_eq!(w.speed(), Some(27.0 / (95.0 / 60.0)));
    }

    #[test]
    fn zero_elevation_is_accepted() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());
        assert!(store.submit(&cycling("10", "30", "0"), here()).is_ok());
    }

    #[test]
    fn rejections_name_the_rule() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());

        let err = store.submit(&running("0", "24", "178"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Distance, .. }));

        let err = store.submit(&running("5", "-1", "178"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Duration, .. }));

        let err = store.submit(&running("5", "24", "0"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Cadence, .. }));

        let err = store.submit(&cycling("5", "24", ""), here()).unwrap_err();
        assert!(matches!(err, Error::Parse { field: Field::Elevation, .. }));

        let err = store.submit(&cycling("-5", "24", "100"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Distance, .. }));

        let mut swim = running("1", "1", "1");
        swim.kind = "swimming".into();
        let err = store.submit(&swim, here()).unwrap_err();
        assert!(matches!(err, Error::UnknownKind(ref k) if k == "swimming"));
        assert!(err.is_validation());

        assert!(store.is_empty());
        assert_eq!(store.storage().get(WORKOUTS_KEY).unwrap(), None);
    }

    #[test]
    fn infinite_derived_metric_is_rejected() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());

        let err = store.submit(&running("1e-310", "24", "178"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Pace, value } if value.is_infinite()));

        let err = store.submit(&cycling("27", "5e-324", "523"), here()).unwrap_err();
        assert!(matches!(err, Error::Range { field: Field::Speed, .. }));

        assert!(store.is_empty());
        assert_eq!(store.storage().get(WORKOUTS_KEY).unwrap(), None);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());

        let err = store
            .submit(&cycling("27", "95", "523"), Coords::new(f64::NAN, -12.0))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { field: Field::Latitude, .. }));
        assert!(err.is_validation());

        let err = store
            .submit(&running("5", "25", "170"), Coords::new(39.0, f64::INFINITY))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { field: Field::Longitude, .. }));

        assert!(store.is_empty());
        assert_eq!(store.storage().get(WORKOUTS_KEY).unwrap(), None);
    }

    #[test]
    fn select_counts_clicks_and_misses_are_inert() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());
        let id = store
            .submit(&running("3", "15", "170"), here())
            .unwrap()
            .id()
            .clone();

        assert_eq!(store.select(id.as_str()).unwrap().clicks(), 1);
        assert_eq!(store.select(id.as_str()).unwrap().clicks(), 2);
        assert!(matches!(store.select("nope"), Err(Error::NotFound(_))));
        assert!(matches!(store.find_by_id("nope"), Err(Error::NotFound(_))));
        assert_eq!(store.find_by_id(id.as_str()).unwrap().clicks(), 2);
    }

    #[test]
    fn reset_clears_memory_and_storage() {
        let mut store = WorkoutStore::open(MemoryBlobStore::new());
        store.submit(&running("3", "15", "170"), here()).unwrap();
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.storage().get(WORKOUTS_KEY).unwrap(), None);
    }
}
