use serde_json::{json, Value};
use statefold::{
    action_types, apply_middleware, combine_reducers_with, create_store, Action, Diagnostics,
    Dispatch, Middleware, MiddlewareApi, Reducer, ReducerMap, State, Store, StoreError,
    Subscription,
};
use std::cell::RefCell;
use std::rc::Rc;

fn counter() -> Reducer {
    Reducer::new(|state, action| {
        let count = state.and_then(|s| s.as_i64()).unwrap_or(0);
        if action.is("INCREMENT") {
            Some(State::from(count + 1))
        } else {
            Some(State::from(count))
        }
    })
}

fn todos() -> Reducer {
    Reducer::new(|state, action| {
        let state = state.unwrap_or_else(|| State::list(Vec::new()));
        if action.is("ADD_TODO") {
            let mut items = state.as_list().unwrap_or_default().to_vec();
            let text = action.get("text").cloned().unwrap_or_default();
            items.push(State::from(text));
            Some(State::from(items))
        } else {
            Some(state)
        }
    })
}

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: &str) {
    log.borrow_mut().push(entry.to_string());
}

#[test]
fn test_state_follows_reducer_for_every_dispatch() -> anyhow::Result<()> {
    let reducer = counter();
    let store = create_store(reducer.clone(), None, None)?;
    let actions = ["INCREMENT", "NOOP", "INCREMENT", "INCREMENT"];
    for kind in actions {
        let previous = store.get_state();
        let action = Action::new(kind);
        let expected = reducer.reduce(Some(previous), &action)?;
        store.dispatch(action)?;
        assert_eq!(Some(store.get_state()), expected);
    }
    assert_eq!(store.get_state().as_i64(), Some(3));
    Ok(())
}

#[test]
fn test_dispatch_returns_the_given_action() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    let action = json!({"type": "INCREMENT", "payload": {"nested": [1, 2, 3]}});
    assert_eq!(store.dispatch(action.clone())?, action);
    Ok(())
}

#[test]
fn test_invalid_actions() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    assert!(matches!(store.dispatch(json!({})), Err(StoreError::InvalidAction(_))));
    assert!(matches!(store.dispatch(Value::Null), Err(StoreError::InvalidAction(_))));
    assert!(matches!(
        store.dispatch(json!([{"type": "INCREMENT"}])),
        Err(StoreError::InvalidAction(_))
    ));
    // A `null` type is defined
    store.dispatch(json!({"type": null}))?;
    assert_eq!(store.get_state().as_i64(), Some(0));
    Ok(())
}

#[test]
fn test_store_recovers_after_failed_dispatch() -> anyhow::Result<()> {
    let reducer = Reducer::fallible(|state, action| {
        if action.is("FAIL") {
            return Err(StoreError::Middleware("boom".to_string()));
        }
        Ok(state.or(Some(State::from(0))))
    });
    let store = create_store(reducer, None, None)?;
    assert!(store.dispatch(Action::new("FAIL")).is_err());
    assert_eq!(store.phase(), statefold::Phase::Idle);
    store.dispatch(Action::new("OK"))?;
    Ok(())
}

#[test]
fn test_store_recovers_after_reducer_panic() -> anyhow::Result<()> {
    let reducer = Reducer::new(|state, action| {
        if action.is("PANIC") {
            panic!("reducer exploded");
        }
        state.or(Some(State::from(0)))
    });
    let store = create_store(reducer, None, None)?;
    let panicking = store.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = panicking.dispatch(Action::new("PANIC"));
    }));
    assert!(result.is_err());
    assert_eq!(store.phase(), statefold::Phase::Idle);
    store.dispatch(Action::new("OK"))?;
    assert_eq!(store.get_state().as_i64(), Some(0));
    Ok(())
}

#[test]
fn test_listener_subscribed_during_pass_waits_for_next_pass() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let outer_store = store.clone();
    let outer_log = log.clone();
    let added = Rc::new(RefCell::new(false));
    store.subscribe(move || {
        push(&outer_log, "outer");
        if !*added.borrow() {
            *added.borrow_mut() = true;
            let inner_log = outer_log.clone();
            outer_store.subscribe(move || push(&inner_log, "inner"));
        }
    });

    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(*log.borrow(), vec!["outer"]);

    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(*log.borrow(), vec!["outer", "outer", "inner"]);
    Ok(())
}

#[test]
fn test_listener_removed_during_pass_still_called_once() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let first_log = log.clone();
    let first_second = second.clone();
    store.subscribe(move || {
        push(&first_log, "first");
        if let Some(subscription) = first_second.borrow().as_ref() {
            subscription.unsubscribe();
        }
    });
    let second_log = log.clone();
    *second.borrow_mut() = Some(store.subscribe(move || push(&second_log, "second")));

    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(*log.borrow(), vec!["first", "second"]);

    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(*log.borrow(), vec!["first", "second", "first"]);
    Ok(())
}

#[test]
fn test_listener_unsubscribing_itself() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let own: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let listener_log = log.clone();
    let listener_own = own.clone();
    let subscription = store.subscribe(move || {
        push(&listener_log, "once");
        if let Some(subscription) = listener_own.borrow().as_ref() {
            subscription.unsubscribe();
        }
    });
    *own.borrow_mut() = Some(subscription);

    store.dispatch(Action::new("INCREMENT"))?;
    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(*log.borrow(), vec!["once"]);
    assert_eq!(store.listener_count(), 0);
    Ok(())
}

#[test]
fn test_listeners_called_in_registration_order() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let log = log.clone();
        store.subscribe(move || push(&log, name));
    }
    store.dispatch(Action::new("NOOP"))?;
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_reentrant_dispatch_leaves_state_untouched() -> anyhow::Result<()> {
    let holder: Rc<RefCell<Option<Store>>> = Rc::new(RefCell::new(None));
    let errors: Rc<RefCell<Vec<StoreError>>> = Rc::new(RefCell::new(Vec::new()));

    let reducer_holder = holder.clone();
    let reducer_errors = errors.clone();
    let reducer = Reducer::new(move |state, action| {
        let count = state.and_then(|s| s.as_i64()).unwrap_or(0);
        if action.is("SELF_DISPATCH") {
            if let Some(store) = reducer_holder.borrow().as_ref() {
                if let Err(err) = store.dispatch(Action::new("SELF_DISPATCH")) {
                    reducer_errors.borrow_mut().push(err);
                }
            }
            return Some(State::from(count + 1));
        }
        Some(State::from(count))
    });
    let store = create_store(reducer, None, None)?;
    *holder.borrow_mut() = Some(store.clone());

    store.dispatch(Action::new("SELF_DISPATCH"))?;
    assert_eq!(store.get_state().as_i64(), Some(1));
    assert_eq!(*errors.borrow(), vec![StoreError::Reentrancy]);

    holder.borrow_mut().take();
    Ok(())
}

#[test]
fn test_combined_store_keeps_identity_for_noops() -> anyhow::Result<()> {
    let reducer = combine_reducers_with(
        ReducerMap::new().with("counter", counter()).with("todos", todos()),
        Diagnostics::silent(),
    );
    let store = create_store(reducer, None, None)?;
    let before = store.get_state();
    store.dispatch(Action::new("NOOP"))?;
    assert!(store.get_state().same(&before));

    store.dispatch(Action::new("ADD_TODO").with("text", "write tests"))?;
    let after = store.get_state();
    assert!(!after.same(&before));
    assert!(after.get("counter").unwrap().same(before.get("counter").unwrap()));
    assert_eq!(
        after.to_value(),
        json!({"counter": 0, "todos": ["write tests"]})
    );
    Ok(())
}

#[test]
fn test_combined_store_with_preloaded_state() -> anyhow::Result<()> {
    let reducer = combine_reducers_with(
        ReducerMap::new().with("counter", counter()).with("todos", todos()),
        Diagnostics::silent(),
    );
    let preloaded = State::from(json!({"counter": 41, "todos": ["existing"]}));
    let store = create_store(reducer, Some(preloaded.clone()), None)?;
    // INIT changes nothing, so the preloaded snapshot itself is kept
    assert!(store.get_state().same(&preloaded));
    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(store.get_state().get("counter").and_then(State::as_i64), Some(42));
    Ok(())
}

#[test]
fn test_broken_sub_reducer_fails_store_creation() {
    let reducer = combine_reducers_with(
        ReducerMap::new()
            .with("counter", counter())
            .with("broken", Reducer::new(|_, _| None)),
        Diagnostics::silent(),
    );
    let err = create_store(reducer, None, None).unwrap_err();
    assert!(matches!(err, StoreError::ReducerShape { ref key, .. } if key == "broken"));
}

#[test]
fn test_replace_reducer_with_combined_reducer() -> anyhow::Result<()> {
    let store = create_store(counter(), None, None)?;
    store.dispatch(Action::new("INCREMENT"))?;

    let combined = combine_reducers_with(
        ReducerMap::new().with("todos", todos()),
        Diagnostics::silent(),
    );
    store.replace_reducer(combined)?;
    assert_eq!(store.get_state().to_value(), json!({"todos": []}));
    Ok(())
}

struct Tracer {
    name: &'static str,
    log: Log,
}

impl Middleware for Tracer {
    fn handle(&self, _api: &MiddlewareApi, action: Value, next: &Dispatch) -> statefold::Result<Value> {
        push(&self.log, &format!("{} before", self.name));
        let result = next(action);
        push(&self.log, &format!("{} after", self.name));
        result
    }
}

#[test]
fn test_middleware_order_and_base_dispatch() -> anyhow::Result<()> {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let a: Rc<dyn Middleware> = Rc::new(Tracer { name: "A", log: log.clone() });
    let b: Rc<dyn Middleware> = Rc::new(Tracer { name: "B", log: log.clone() });

    let reducer_log = log.clone();
    let reducer = Reducer::new(move |state, action| {
        if !action_types::is_private(&action.type_name()) {
            push(&reducer_log, "reducer");
        }
        state.or(Some(State::Null))
    });
    let store = create_store(reducer, None, Some(apply_middleware(vec![a, b])))?;
    let action = json!({"type": "PING"});
    assert_eq!(store.dispatch(action.clone())?, action);
    assert_eq!(
        *log.borrow(),
        vec!["A before", "B before", "reducer", "B after", "A after"]
    );
    Ok(())
}

#[test]
fn test_dropping_enhanced_store_releases_chain() -> anyhow::Result<()> {
    let marker = Rc::new(());
    let held = marker.clone();
    let middleware: Rc<dyn Middleware> =
        Rc::new(move |_api: &MiddlewareApi, action: Value, next: &Dispatch| {
            let _ = &held;
            next(action)
        });
    let store = create_store(counter(), None, Some(apply_middleware(vec![middleware])))?;
    store.dispatch(Action::new("INCREMENT"))?;
    assert_eq!(Rc::strong_count(&marker), 2);
    drop(store);
    assert_eq!(Rc::strong_count(&marker), 1);
    Ok(())
}
