//! Double-buffered listener registry
//!
//! `current` is the frozen list a notification pass iterates over, `next` is
//! what subscribe/unsubscribe touch. Both point at the same allocation right
//! after a flush; the first mutation afterwards copies (`Rc::make_mut`), so a
//! pass in flight never observes registration changes.

use std::rc::Rc;

pub type Listener = Rc<dyn Fn()>;

pub type ListenerId = u64;

#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) callback: Listener,
}

pub(crate) struct ListenerRegistry {
    current: Rc<Vec<ListenerEntry>>,
    next: Rc<Vec<ListenerEntry>>,
    next_id: ListenerId,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        let current = Rc::new(Vec::new());
        Self {
            next: current.clone(),
            current,
            next_id: 0,
        }
    }

    pub(crate) fn add(&mut self, callback: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        Rc::make_mut(&mut self.next).push(ListenerEntry { id, callback });
        id
    }

    /// Remove a listener from `next`; `false` if it was not registered
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        match self.next.iter().position(|entry| entry.id == id) {
            Some(index) => {
                Rc::make_mut(&mut self.next).remove(index);
                true
            }
            None => false,
        }
    }

    /// Publish `next` as the new frozen `current` and hand it out
    pub(crate) fn snapshot(&mut self) -> Rc<Vec<ListenerEntry>> {
        self.current = self.next.clone();
        self.current.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.next.len()
    }
}
