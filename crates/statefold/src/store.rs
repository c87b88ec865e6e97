//! The store: one mutable slot holding an immutable state
//!
//! State changes only through `dispatch`, which runs the reducer, commits
//! its result and notifies listeners:
//!
//! ```text
//! dispatch(action) → [middleware…] → reducer(state, action) → commit → listeners
//! ```
//!
//! A store is single threaded and rejects reentrant dispatches: calling
//! `dispatch` from inside a reducer or from a listener during a
//! notification pass returns [`StoreError::Reentrancy`].

use crate::action::Action;
use crate::error::{Result, StoreError};
use crate::listener::{Listener, ListenerId, ListenerRegistry};
use crate::reducer::Reducer;
use crate::state::State;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A dispatch function: takes any value, returns a value or an error.
///
/// The base dispatch returns the action it was given; middleware may return
/// something else.
pub type Dispatch = Rc<dyn Fn(Value) -> Result<Value>>;

/// Builds a store from a reducer and an optional preloaded state
pub type StoreFactory = Rc<dyn Fn(Reducer, Option<State>) -> Result<Store>>;

/// Transforms a store factory, e.g. to install middleware
pub type Enhancer = Rc<dyn Fn(StoreFactory) -> StoreFactory>;

/// What the store is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Reducing,
    Notifying,
}

/// Holds the phase for the duration of a dispatch and resets it to
/// `Idle` on every exit path, including unwinding.
struct PhaseGuard<'a> {
    phase: &'a Cell<Phase>,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Cell<Phase>, next: Phase) -> Result<Self> {
        if phase.get() != Phase::Idle {
            return Err(StoreError::Reentrancy);
        }
        phase.set(next);
        Ok(Self { phase })
    }

    fn advance(&self, next: Phase) {
        self.phase.set(next);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(Phase::Idle);
    }
}

struct StoreCore {
    state: RefCell<Option<State>>,
    reducer: RefCell<Reducer>,
    phase: Cell<Phase>,
    listeners: RefCell<ListenerRegistry>,
}

impl StoreCore {
    fn get_state(&self) -> State {
        self.state.borrow().clone().unwrap_or_default()
    }

    // No RefCell borrow may be held while reducers or listeners run: they
    // are free to call back into get_state/subscribe.
    fn dispatch(&self, value: Value) -> Result<Value> {
        let action = Action::try_from(value)?;
        let guard = PhaseGuard::enter(&self.phase, Phase::Reducing)?;

        log::trace!("dispatch {}", action.type_name());

        let reducer = self.reducer.borrow().clone();
        let previous = self.state.borrow().clone();
        let next = reducer
            .reduce(previous, &action)?
            .ok_or_else(|| StoreError::ReducerContract {
                key: None,
                action_type: action.type_name(),
            })?;
        *self.state.borrow_mut() = Some(next);

        guard.advance(Phase::Notifying);
        let listeners = self.listeners.borrow_mut().snapshot();
        for entry in listeners.iter() {
            (entry.callback)();
        }
        drop(guard);

        Ok(action.into_value())
    }

    fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = self.listeners.borrow_mut().add(listener);
        log::trace!("listener {} subscribed", id);
        id
    }
}

/// Handle returned by `subscribe`.
///
/// The first `unsubscribe` call removes the listener, further calls do
/// nothing. Dropping the handle keeps the listener registered.
pub struct Subscription {
    core: Weak<StoreCore>,
    id: ListenerId,
    active: Cell<bool>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(core) = self.core.upgrade() {
            core.listeners.borrow_mut().remove(self.id);
            log::trace!("listener {} unsubscribed", self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

/// Receives state snapshots from a [`StoreObservable`]
pub trait Observer {
    fn next(&self, state: &State);
}

impl<F: Fn(&State)> Observer for F {
    fn next(&self, state: &State) {
        self(state)
    }
}

/// Minimal push-style view of a store's state, for interop with reactive
/// code. Built on top of [`Store::subscribe`].
pub struct StoreObservable {
    core: Rc<StoreCore>,
}

impl StoreObservable {
    /// Push the current state to `observer` now and after every dispatch
    pub fn subscribe(&self, observer: impl Observer + 'static) -> Subscription {
        let core = Rc::downgrade(&self.core);
        let observe: Listener = Rc::new(move || {
            if let Some(core) = core.upgrade() {
                observer.next(&core.get_state());
            }
        });
        observe();
        let id = self.core.subscribe(observe);
        Subscription {
            core: Rc::downgrade(&self.core),
            id,
            active: Cell::new(true),
        }
    }
}

/// A store handle. Clones share the same underlying store.
#[derive(Clone)]
pub struct Store {
    core: Rc<StoreCore>,
    dispatch: Dispatch,
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Create a plain store and prime it with the init action
    fn create(reducer: Reducer, preloaded_state: Option<State>) -> Result<Self> {
        let core = Rc::new(StoreCore {
            state: RefCell::new(preloaded_state),
            reducer: RefCell::new(reducer),
            phase: Cell::new(Phase::Idle),
            listeners: RefCell::new(ListenerRegistry::new()),
        });
        core.dispatch(Action::init().into_value())?;
        log::debug!("store created");

        let dispatch_core = core.clone();
        let dispatch: Dispatch = Rc::new(move |action: Value| dispatch_core.dispatch(action));
        Ok(Self { core, dispatch })
    }

    /// Current state. Cheap: only a reference count changes.
    pub fn get_state(&self) -> State {
        self.core.get_state()
    }

    /// Send an action through the dispatch chain.
    ///
    /// Without middleware this returns the action value unchanged.
    pub fn dispatch(&self, action: impl Into<Value>) -> Result<Value> {
        (self.dispatch)(action.into())
    }

    /// The dispatch function currently installed on this handle
    pub fn dispatcher(&self) -> Dispatch {
        self.dispatch.clone()
    }

    /// Same store, different dispatch. Used by enhancers.
    pub fn with_dispatch(self, dispatch: Dispatch) -> Self {
        Self {
            core: self.core,
            dispatch,
        }
    }

    /// Register a listener called after every completed dispatch
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let id = self.core.subscribe(Rc::new(listener));
        Subscription {
            core: Rc::downgrade(&self.core),
            id,
            active: Cell::new(true),
        }
    }

    /// Swap the reducer and re-prime the state with the init action.
    ///
    /// Refused with `Reentrancy` while a dispatch is in progress; the old
    /// reducer stays in place in that case.
    pub fn replace_reducer(&self, next_reducer: Reducer) -> Result<()> {
        if self.core.phase.get() != Phase::Idle {
            return Err(StoreError::Reentrancy);
        }
        *self.core.reducer.borrow_mut() = next_reducer;
        log::debug!("reducer replaced");
        self.core.dispatch(Action::init().into_value()).map(|_| ())
    }

    /// A handle that does not keep the store alive.
    ///
    /// Listeners that need the store should capture one of these; a `Store`
    /// captured by its own listener is never freed.
    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            core: Rc::downgrade(&self.core),
            dispatch: Rc::downgrade(&self.dispatch),
        }
    }

    pub fn observable(&self) -> StoreObservable {
        StoreObservable {
            core: self.core.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.core.phase.get()
    }

    pub fn listener_count(&self) -> usize {
        self.core.listeners.borrow().len()
    }
}

/// Non-owning [`Store`] handle, see [`Store::downgrade`]
#[derive(Clone)]
pub struct WeakStore {
    core: Weak<StoreCore>,
    dispatch: Weak<dyn Fn(Value) -> Result<Value>>,
}

impl WeakStore {
    /// The store, if any strong handle to it is still alive
    pub fn upgrade(&self) -> Option<Store> {
        Some(Store {
            core: self.core.upgrade()?,
            dispatch: self.dispatch.upgrade()?,
        })
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.core.state.borrow())
            .field("phase", &self.core.phase.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Create a store.
///
/// With an enhancer, construction is delegated entirely to
/// `enhancer(base_factory)(reducer, preloaded_state)`.
pub fn create_store(
    reducer: Reducer,
    preloaded_state: Option<State>,
    enhancer: Option<Enhancer>,
) -> Result<Store> {
    match enhancer {
        Some(enhancer) => enhancer(base_factory())(reducer, preloaded_state),
        None => Store::create(reducer, preloaded_state),
    }
}

/// The factory enhancers receive: builds an unenhanced store
pub fn base_factory() -> StoreFactory {
    Rc::new(|reducer: Reducer, preloaded_state: Option<State>| {
        Store::create(reducer, preloaded_state)
    })
}

/// Named-argument form of [`create_store`]
#[derive(Default)]
pub struct StoreBuilder {
    reducer: Option<Reducer>,
    preloaded_state: Option<State>,
    enhancer: Option<Enhancer>,
}

impl StoreBuilder {
    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn preloaded_state(mut self, state: impl Into<State>) -> Self {
        self.preloaded_state = Some(state.into());
        self
    }

    pub fn enhancer(mut self, enhancer: Enhancer) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn build(self) -> Result<Store> {
        let reducer = self
            .reducer
            .ok_or_else(|| StoreError::Construction("reducer".to_string()))?;
        create_store(reducer, self.preloaded_state, self.enhancer)
    }
}
