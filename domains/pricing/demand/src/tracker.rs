use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use pricing_models::{CategoryId, SearchSignal};
use serde::Serialize;
use tracing::trace;

use crate::clock::Clock;

type Window = VecDeque<DateTime<Utc>>;

#[derive(Debug, Default)]
struct SignalState {
    global: Window,
    categories: HashMap<CategoryId, Window>,
    requesters: HashSet<String>,
    returned_rooms: u64,
}

/// Point-in-time view of the tracker, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemandSnapshot {
    pub global: usize,
    pub distinct_requesters: usize,
    pub returned_rooms: u64,
    pub per_category: BTreeMap<CategoryId, usize>,
}

/// Sliding-window search counter, global and per category.
///
/// Each operation holds the lock for its whole body, so a single record or
/// prune is atomic. Sequences such as prune, count, reset are not; callers
/// that need them atomic serialize at a higher level.
pub struct DemandTracker {
    clock: Arc<dyn Clock>,
    state: Mutex<SignalState>,
}

impl DemandTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(SignalState::default()),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> { &self.clock }

    fn state(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one event to the global window and, when known, to the
    /// category window.
    pub fn record(&self, category_id: Option<CategoryId>) {
        let now = self.clock.now_utc();
        let mut state = self.state();
        state.global.push_back(now);
        if let Some(category_id) = category_id {
            state.categories.entry(category_id).or_default().push_back(now);
        }
    }

    /// Records a whole availability search.
    ///
    /// The global window gets one event. An explicit category gets one
    /// event; without one, every returned room marks its own category.
    pub fn record_search(&self, signal: &SearchSignal) {
        let now = self.clock.now_utc();
        let mut state = self.state();

        state.global.push_back(now);
        if let Some(requester) = &signal.requester_id {
            state.requesters.insert(requester.clone());
        }
        state.returned_rooms += signal.result_categories.len() as u64;

        match signal.category_id {
            Some(category_id) => {
                state.categories.entry(category_id).or_default().push_back(now);
            }
            None => {
                for category_id in &signal.result_categories {
                    state
                        .categories
                        .entry(*category_id)
                        .or_default()
                        .push_back(now);
                }
            }
        }
    }

    /// Drops every event older than `now - window`. Category windows left
    /// empty are removed.
    pub fn prune(&self, window: Duration) {
        let cutoff = self.cutoff(window);
        let mut state = self.state();

        drop_before(&mut state.global, cutoff);
        state.categories.retain(|category_id, events| {
            drop_before(events, cutoff);
            if events.is_empty() {
                trace!(category_id, "demand window emptied");
            }
            !events.is_empty()
        });
    }

    /// Event count as of the last prune.
    pub fn count(&self, category_id: Option<CategoryId>) -> usize {
        let state = self.state();
        match category_id {
            None => state.global.len(),
            Some(category_id) => {
                state.categories.get(&category_id).map_or(0, VecDeque::len)
            }
        }
    }

    /// Prunes, then counts, under one lock.
    pub fn recent(
        &self, category_id: Option<CategoryId>, window: Duration,
    ) -> usize {
        let cutoff = self.cutoff(window);
        let mut state = self.state();
        match category_id {
            None => {
                drop_before(&mut state.global, cutoff);
                state.global.len()
            }
            Some(category_id) => {
                let Some(events) = state.categories.get_mut(&category_id)
                else {
                    return 0;
                };
                drop_before(events, cutoff);
                let count = events.len();
                if count == 0 {
                    state.categories.remove(&category_id);
                }
                count
            }
        }
    }

    /// Clears the global window, the distinct requester set and the
    /// returned-room counter. Category windows are left alone.
    pub fn reset(&self) {
        let mut state = self.state();
        state.global.clear();
        state.requesters.clear();
        state.returned_rooms = 0;
    }

    /// Removes a category window after its burst has been consumed.
    pub fn take_category(&self, category_id: CategoryId) -> usize {
        self.state()
            .categories
            .remove(&category_id)
            .map_or(0, |events| events.len())
    }

    /// Categories that currently hold at least one event.
    pub fn categories(&self) -> Vec<CategoryId> {
        let mut ids: Vec<_> = self.state().categories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn distinct_requesters(&self) -> usize { self.state().requesters.len() }

    pub fn snapshot(&self) -> DemandSnapshot {
        let state = self.state();
        DemandSnapshot {
            global: state.global.len(),
            distinct_requesters: state.requesters.len(),
            returned_rooms: state.returned_rooms,
            per_category: state
                .categories
                .iter()
                .map(|(id, events)| (*id, events.len()))
                .collect(),
        }
    }

    fn cutoff(&self, window: Duration) -> DateTime<Utc> {
        let span = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        self.clock
            .now_utc()
            .checked_sub_signed(span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Windows are in insertion order, so stale events sit at the front.
fn drop_before(events: &mut Window, cutoff: DateTime<Utc>) {
    while events.front().is_some_and(|ts| *ts < cutoff) {
        events.pop_front();
    }
}
