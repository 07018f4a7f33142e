/// The result collection: an append-only, observable list of matches.
///
/// Owned by the UI thread. The search worker never touches it directly; its
/// `Match` messages are applied here one at a time, in arrival order.
use crate::model::NodeIndex;

/// Change notification delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// Indices `first..=last` were appended.
    IntervalAdded { first: usize, last: usize },
}

/// Handle returned by [`MatchList::observe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Listener = Box<dyn FnMut(&ListEvent) + Send>;

#[derive(Default)]
pub struct MatchList {
    items: Vec<NodeIndex>,
    listeners: Vec<(ObserverId, Listener)>,
    next_observer: u64,
}

impl MatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match and notify every observer with a one-element interval.
    pub fn append(&mut self, node: NodeIndex) {
        self.items.push(node);
        let index = self.items.len() - 1;
        let event = ListEvent::IntervalAdded {
            first: index,
            last: index,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn observe(&mut self, listener: impl FnMut(&ListEvent) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(oid, _)| *oid != id);
        self.listeners.len() != before
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeIndex> {
        self.items.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.items.iter().copied()
    }
}

impl std::fmt::Debug for MatchList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchList")
            .field("items", &self.items)
            .field("observers", &self.listeners.len())
            .finish()
    }
}
