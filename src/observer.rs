//! Module for change notification lists

use std::fmt;

/// Handle of a registered listener, used to unregister it
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

/// A list of listeners notified with a borrowed value
pub struct Observers<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> Observers<T> {
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener
    /// Returns whether it was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);

        self.listeners.len() != len
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Call every listener in registration order
    pub fn notify(&mut self, value: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(value);
        }
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_in_order_until_unsubscribed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::<u32>::default();

        let a = {
            let log = log.clone();
            observers.subscribe(move |v| log.borrow_mut().push(("a", *v)))
        };
        let _b = {
            let log = log.clone();
            observers.subscribe(move |v| log.borrow_mut().push(("b", *v)))
        };

        observers.notify(&1);
        assert!(observers.unsubscribe(a));
        assert!(!observers.unsubscribe(a));
        observers.notify(&2);

        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(observers.len(), 1);
    }
}
