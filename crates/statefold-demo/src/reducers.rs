//! Reducers for the demo store

use statefold::{Action, Reducer, State};

pub const INCREMENT: &str = "INCREMENT";
pub const DECREMENT: &str = "DECREMENT";
pub const ADD_TODO: &str = "ADD_TODO";
pub const TOGGLE_TODO: &str = "TOGGLE_TODO";

/// Counter slice: a plain number
pub fn counter() -> Reducer {
    Reducer::new(|state, action| {
        let count = state.as_ref().and_then(State::as_i64).unwrap_or(0);
        match action.kind().as_str() {
            Some(INCREMENT) => Some(State::from(count + 1)),
            Some(DECREMENT) => Some(State::from(count - 1)),
            // Unhandled actions - no state change
            _ => Some(state.unwrap_or_else(|| State::from(count))),
        }
    })
}

/// Todo slice: a list of `{text, done}` records
pub fn todos() -> Reducer {
    Reducer::new(|state, action| {
        let state = state.unwrap_or_else(|| State::list(Vec::new()));
        match action.kind().as_str() {
            Some(ADD_TODO) => Some(add_todo(&state, action)),
            Some(TOGGLE_TODO) => Some(toggle_todo(state, action)),
            _ => Some(state),
        }
    })
}

fn add_todo(state: &State, action: &Action) -> State {
    let text = action
        .get("text")
        .and_then(|t| t.as_str())
        .unwrap_or_default();
    let mut items = state.as_list().unwrap_or_default().to_vec();
    items.push(State::record([
        ("text", State::from(text)),
        ("done", State::from(false)),
    ]));
    State::from(items)
}

fn toggle_todo(state: State, action: &Action) -> State {
    let Some(index) = action.get("index").and_then(|i| i.as_u64()) else {
        return state;
    };
    let Some(items) = state.as_list() else {
        return state;
    };
    let Some(todo) = items.get(index as usize) else {
        log::debug!("No todo at index {}", index);
        return state;
    };

    let done = todo.get("done").and_then(State::as_bool).unwrap_or(false);
    let mut record = todo.as_record().cloned().unwrap_or_default();
    record.insert("done".to_string(), State::from(!done));

    let mut items = items.to_vec();
    items[index as usize] = State::from(record);
    State::from(items)
}
