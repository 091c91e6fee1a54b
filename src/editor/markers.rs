//! Position-tracking markers.
//!
//! A marker remembers a char index and follows it through buffer edits.
//! When an edit removes the text a marker sits in, the marker becomes
//! invalid and every live subscription on it receives one
//! [`MarkerEvent::Invalidated`].

use std::collections::{BTreeMap, VecDeque};

use super::buffer::Edit;

/// Handle to a live marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

/// Handle to a decoration attached to a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(u64);

/// A cancellable registration for a marker's invalidation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription {
    marker: MarkerId,
    id: u64,
}

impl Subscription {
    /// The marker this subscription watches.
    pub const fn marker(&self) -> MarkerId {
        self.marker
    }
}

/// Where a decoration is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    /// Styles the line-number gutter cell of the marker's line.
    LineNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub class: String,
}

impl Decoration {
    pub fn line_number(class: impl Into<String>) -> Self {
        Self {
            kind: DecorationKind::LineNumber,
            class: class.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    Invalidated(Subscription),
}

#[derive(Debug)]
struct Marker {
    pos: usize,
    valid: bool,
    subscriptions: Vec<u64>,
}

/// Owns every marker of one buffer, plus their decorations and pending
/// notifications.
#[derive(Debug, Default)]
pub struct MarkerStore {
    next_id: u64,
    markers: BTreeMap<MarkerId, Marker>,
    decorations: BTreeMap<DecorationId, (MarkerId, Decoration)>,
    events: VecDeque<MarkerEvent>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    const fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of live (not destroyed) markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn create(&mut self, char_idx: usize) -> MarkerId {
        let id = MarkerId(self.next());
        self.markers.insert(
            id,
            Marker {
                pos: char_idx,
                valid: true,
                subscriptions: Vec::new(),
            },
        );
        id
    }

    /// Destroy a marker along with its decorations and subscriptions.
    ///
    /// Queued notifications for the marker are dropped as well.
    pub fn destroy(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_none() {
            return;
        }
        self.decorations.retain(|_, (marker, _)| *marker != id);
        self.events
            .retain(|MarkerEvent::Invalidated(sub)| sub.marker != id);
    }

    pub fn position(&self, id: MarkerId) -> Option<usize> {
        self.markers.get(&id).map(|m| m.pos)
    }

    pub fn set_position(&mut self, id: MarkerId, char_idx: usize) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.pos = char_idx;
        }
    }

    /// Whether the marker exists and no edit has invalidated it.
    pub fn is_valid(&self, id: MarkerId) -> bool {
        self.markers.get(&id).is_some_and(|m| m.valid)
    }

    pub fn subscribe(&mut self, id: MarkerId) -> Subscription {
        let sub = Subscription {
            marker: id,
            id: self.next(),
        };
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.subscriptions.push(sub.id);
        }
        sub
    }

    pub fn cancel(&mut self, subscription: Subscription) {
        if let Some(marker) = self.markers.get_mut(&subscription.marker) {
            marker.subscriptions.retain(|id| *id != subscription.id);
        }
        self.events
            .retain(|MarkerEvent::Invalidated(sub)| *sub != subscription);
    }

    /// Attach a decoration. Returns `None` if the marker does not exist.
    pub fn decorate(&mut self, id: MarkerId, decoration: Decoration) -> Option<DecorationId> {
        if !self.markers.contains_key(&id) {
            return None;
        }
        let deco = DecorationId(self.next());
        self.decorations.insert(deco, (id, decoration));
        Some(deco)
    }

    pub fn remove_decoration(&mut self, id: DecorationId) {
        self.decorations.remove(&id);
    }

    /// Decorations with the char index of the marker they are attached to.
    pub fn decorations(&self) -> impl Iterator<Item = (usize, &Decoration)> {
        self.decorations.values().filter_map(|(marker, decoration)| {
            self.markers.get(marker).map(|m| (m.pos, decoration))
        })
    }

    /// Shift markers to follow `edit`, invalidating those whose text it removed.
    pub fn apply(&mut self, edit: Edit) {
        let mut invalidated = Vec::new();
        for (id, marker) in &mut self.markers {
            match edit {
                Edit::Insert { at, len } => {
                    if marker.pos > at {
                        marker.pos += len;
                    }
                }
                Edit::Remove {
                    start,
                    end,
                    removed_line,
                } => {
                    let on_removed_line = removed_line
                        .is_some_and(|(first, last)| (first..=last).contains(&marker.pos));
                    if on_removed_line || (marker.pos > start && marker.pos < end) {
                        marker.pos = start;
                        if marker.valid {
                            marker.valid = false;
                            invalidated.push(*id);
                        }
                    } else if marker.pos >= end {
                        marker.pos -= end - start;
                    }
                }
            }
        }
        for id in invalidated {
            if let Some(marker) = self.markers.get(&id) {
                self.events.extend(marker.subscriptions.iter().map(|sub| {
                    MarkerEvent::Invalidated(Subscription { marker: id, id: *sub })
                }));
            }
        }
    }

    /// Take every notification queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<MarkerEvent> {
        self.events.drain(..).collect()
    }
}
