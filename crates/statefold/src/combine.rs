//! Combining named reducers into one
//!
//! The combined reducer owns a record state whose keys are exactly the
//! reducer names. Every sub-reducer sees only its own slice. When no slice
//! changes (by identity) the incoming state is handed back untouched, so
//! callers can detect "nothing happened" with [`State::same`].

use crate::action::{action_types, Action};
use crate::diagnostics::Diagnostics;
use crate::error::{Result, StoreError};
use crate::reducer::Reducer;
use crate::state::{Record, State};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

/// Ordered mapping of names to reducers.
///
/// An entry may be registered without a reducer; such entries are dropped
/// when the map is combined (with a diagnostic), not rejected.
#[derive(Clone, Default)]
pub struct ReducerMap {
    entries: IndexMap<String, Option<Reducer>>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a reducer. A replaced entry keeps its position.
    pub fn with(mut self, key: impl Into<String>, reducer: Reducer) -> Self {
        self.insert(key, Some(reducer));
        self
    }

    /// Register a key that has no reducer
    pub fn with_absent(mut self, key: impl Into<String>) -> Self {
        self.insert(key, None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, reducer: Option<Reducer>) {
        self.entries.insert(key.into(), reducer);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Reducer)> for ReducerMap {
    fn from_iter<I: IntoIterator<Item = (K, Reducer)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, reducer) in iter {
            map.insert(key, Some(reducer));
        }
        map
    }
}

impl fmt::Debug for ReducerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.is_some())))
            .finish()
    }
}

/// Combine reducers, reporting diagnostics according to the runtime mode
pub fn combine_reducers(reducers: ReducerMap) -> Reducer {
    combine_reducers_with(reducers, Diagnostics::default())
}

/// Combine reducers, reporting diagnostics to the given sink
pub fn combine_reducers_with(reducers: ReducerMap, diagnostics: Diagnostics) -> Reducer {
    let mut final_reducers: Vec<(String, Reducer)> = Vec::with_capacity(reducers.len());
    for (key, reducer) in reducers.entries {
        match reducer {
            Some(reducer) => final_reducers.push((key, reducer)),
            None => {
                log::debug!("dropping key \"{}\" without reducer", key);
                diagnostics.warn(&format!("No reducer provided for key \"{}\"", key));
            }
        }
    }

    let shape_error = assert_reducer_shape(&final_reducers).err();
    if let Some(err) = &shape_error {
        log::debug!("combined reducer failed its probe: {}", err);
    }
    let unexpected_key_cache = RefCell::new(HashSet::new());

    Reducer::fallible(move |state: Option<State>, action: &Action| {
        // Raised here rather than at build time so it surfaces with the
        // first action that actually reaches this reducer.
        if let Some(err) = &shape_error {
            return Err(err.clone());
        }

        let state = state.unwrap_or_else(|| State::from(Record::new()));

        if diagnostics.is_enabled() {
            let mut cache = unexpected_key_cache.borrow_mut();
            if let Some(message) =
                unexpected_state_shape_warning(&state, &final_reducers, action, &mut cache)
            {
                diagnostics.warn(&message);
            }
        }

        let previous = state.as_record();
        let mut has_changed = false;
        let mut next_state = Record::with_capacity(final_reducers.len());
        for (key, reducer) in &final_reducers {
            let previous_for_key = previous.and_then(|record| record.get(key)).cloned();
            let next_for_key = reducer
                .reduce(previous_for_key.clone(), action)?
                .ok_or_else(|| StoreError::ReducerContract {
                    key: Some(key.clone()),
                    action_type: action.type_name(),
                })?;
            has_changed = has_changed
                || previous_for_key.map_or(true, |previous| !previous.same(&next_for_key));
            next_state.insert(key.clone(), next_for_key);
        }

        Ok(Some(if has_changed {
            State::from(next_state)
        } else {
            state
        }))
    })
}

/// Probe every reducer with the init action and a random unknown action,
/// both with an undefined state.
fn assert_reducer_shape(reducers: &[(String, Reducer)]) -> Result<()> {
    for (key, reducer) in reducers {
        if reducer.reduce(None, &Action::init())?.is_none() {
            return Err(StoreError::ReducerShape {
                key: key.clone(),
                reason: format!(
                    "Reducer \"{}\" returned undefined during initialization. \
                     If the state passed to the reducer is undefined, you must explicitly \
                     return the initial state. The initial state may not be undefined. \
                     If you don't want to set a value for this reducer, you can use null \
                     instead of undefined.",
                    key
                ),
            });
        }

        let probe = Action::new(action_types::probe_unknown());
        if reducer.reduce(None, &probe)?.is_none() {
            return Err(StoreError::ReducerShape {
                key: key.clone(),
                reason: format!(
                    "Reducer \"{}\" returned undefined when probed with a random type. \
                     Don't try to handle {} or other actions in \"@@statefold/*\" namespace. \
                     They are considered private. Instead, you must return the current state \
                     for any unknown actions, unless it is undefined, in which case you must \
                     return the initial state, regardless of the action type. The initial \
                     state may not be undefined, but can be null.",
                    key,
                    action_types::INIT
                ),
            });
        }
    }
    Ok(())
}

fn unexpected_state_shape_warning(
    state: &State,
    reducers: &[(String, Reducer)],
    action: &Action,
    unexpected_key_cache: &mut HashSet<String>,
) -> Option<String> {
    let reducer_keys: Vec<&str> = reducers.iter().map(|(key, _)| key.as_str()).collect();
    let argument_name = if action.is(action_types::INIT) {
        "preloaded state passed to create_store"
    } else {
        "previous state received by the reducer"
    };

    if reducer_keys.is_empty() {
        return Some(
            "Store does not have a valid reducer. Make sure the map passed to \
             combine_reducers contains reducers."
                .to_string(),
        );
    }

    let Some(record) = state.as_record() else {
        return Some(format!(
            "The {} has unexpected type of \"{}\". Expected argument to be an object \
             with the following keys: \"{}\"",
            argument_name,
            state.type_name(),
            reducer_keys.join("\", \"")
        ));
    };

    let unexpected_keys: Vec<&str> = record
        .keys()
        .map(String::as_str)
        .filter(|key| !reducer_keys.contains(key) && !unexpected_key_cache.contains(*key))
        .collect();
    if unexpected_keys.is_empty() {
        return None;
    }
    for key in &unexpected_keys {
        unexpected_key_cache.insert(key.to_string());
    }

    Some(format!(
        "Unexpected {} \"{}\" found in {}. Expected to find one of the known reducer \
         keys instead: \"{}\". Unexpected keys will be ignored.",
        if unexpected_keys.len() > 1 { "keys" } else { "key" },
        unexpected_keys.join("\", \""),
        argument_name,
        reducer_keys.join("\", \"")
    ))
}
