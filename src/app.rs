use crate::dlog;
use crate::error::Result;
use crate::storage::BlobStore;
use crate::store::{RawWorkoutInput, WorkoutStore};
use crate::types::{Coords, Workout};
use crate::view::{MapView, Popup, WorkoutListView, WorkoutSummary};

pub const DEFAULT_ZOOM: u8 = 13;

/// One running instance of the tracker: the store plus its view and map.
///
/// The map may become ready after the workouts were restored; attaching it
/// then places markers for everything already in the store.
pub struct App<S, V, M> {
    store: WorkoutStore<S>,
    list: V,
    map: Option<M>,
    zoom: u8,
}

impl<S, V, M> App<S, V, M>
where
    S: BlobStore,
    V: WorkoutListView,
    M: MapView,
{
    pub fn new(store: WorkoutStore<S>, list: V, map: Option<M>, zoom: u8) -> Self {
        Self {
            store,
            list,
            map,
            zoom,
        }
    }

    /// Show every restored workout: a list row each, and a marker each if
    /// the map is ready.
    pub fn load(&mut self) {
        for w in self.store.workouts() {
            self.list.render(&WorkoutSummary::from(w));
            if let Some(map) = self.map.as_mut() {
                map.place_marker(w.coords(), &Popup::from(w));
            }
        }
        dlog!("loaded workouts={}", self.store.len());
    }

    /// The map is ready: center it and drop markers for what we already have.
    pub fn attach_map(&mut self, mut map: M, center: Coords) {
        map.set_view(center, self.zoom);
        for w in self.store.workouts() {
            map.place_marker(w.coords(), &Popup::from(w));
        }
        dlog!("map attached markers={}", self.store.len());
        self.map = Some(map);
    }

    pub fn on_submit(&mut self, input: &RawWorkoutInput, at: Coords) -> Result<&Workout> {
        let workout = self.store.submit(input, at)?;
        if let Some(map) = self.map.as_mut() {
            map.place_marker(workout.coords(), &Popup::from(workout));
        }
        self.list.render(&WorkoutSummary::from(workout));
        Ok(workout)
    }

    /// Center the map on the selected workout. Unknown ids are ignored.
    pub fn on_select(&mut self, id: &str) -> Option<&Workout> {
        let Ok(workout) = self.store.select(id) else {
            return None;
        };
        if let Some(map) = self.map.as_mut() {
            map.set_view(workout.coords(), self.zoom);
        }
        Some(workout)
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.list.clear();
        if let Some(map) = self.map.as_mut() {
            map.clear_markers();
        }
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub const fn list(&self) -> &V {
        &self.list
    }

    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn into_parts(self) -> (WorkoutStore<S>, V, Option<M>) {
        (self.store, self.list, self.map)
    }
}
