//! Per-element observer lists.

use std::fmt;

use desktop_window_contract::WindowLifecycleEvent;
use platform_host::Vec2;

/// Events delivered to element observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    /// Press and release both happened while this element was the hovered target.
    Click {
        /// Pointer position at release.
        position: Vec2,
    },
    /// The element (or a descendant) became hovered.
    HoverEnter,
    /// The element and all its descendants stopped being hovered.
    HoverLeave,
    /// The element received keyboard focus.
    FocusGained,
    /// The element lost keyboard focus.
    FocusLost,
    /// Window lifecycle transition.
    Lifecycle(WindowLifecycleEvent),
    /// A context-menu item opened on this element was activated.
    MenuAction(String),
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ElementEvent)>;

/// Ordered list of subscribers; each is called once per event, in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn subscribe(&mut self, callback: impl FnMut(&ElementEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    /// Calls every subscriber with `event`.
    pub fn notify(&mut self, event: &ElementEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` when nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_subscriber_sees_the_event_until_unsubscribed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();

        let first = {
            let log = Rc::clone(&log);
            observers.subscribe(move |event| log.borrow_mut().push(("first", event.clone())))
        };
        {
            let log = Rc::clone(&log);
            observers.subscribe(move |event| log.borrow_mut().push(("second", event.clone())));
        }

        observers.notify(&ElementEvent::HoverEnter);
        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        observers.notify(&ElementEvent::HoverLeave);

        assert_eq!(
            *log.borrow(),
            vec![
                ("first", ElementEvent::HoverEnter),
                ("second", ElementEvent::HoverEnter),
                ("second", ElementEvent::HoverLeave),
            ]
        );
        assert_eq!(observers.len(), 1);
    }
}
