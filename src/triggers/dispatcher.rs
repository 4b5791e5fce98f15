//! Trigger registration and dispatch ordering.
//!
//! The dispatcher is an arena of trigger records keyed by stable id,
//! with a per-event index. It owns the registration table and the
//! owner relation, never the triggers' lifetime - skills do.
//!
//! `snapshot` hands the fire loop a copy of the id list taken at entry,
//! so triggers registered or unregistered while an event is being fired
//! only affect subsequent fires; ids removed mid-fire are skipped when
//! the loop fails to fetch them.

use rustc_hash::FxHashMap;
use tracing::trace;

use super::event::GameEvent;
use super::trigger::{Trigger, TriggerId};
use crate::core::PlayerId;

/// One registered trigger: the id, the channel it listens on, the
/// owner relation and the trigger data itself.
#[derive(Clone, Debug)]
pub struct TriggerRecord {
    /// Stable registration id.
    pub id: TriggerId,
    /// The channel this registration listens on.
    pub event: GameEvent,
    /// Owner relation; updated on skill install/uninstall, never an
    /// ownership transfer.
    pub owner: Option<PlayerId>,
    /// Registration sequence, breaks priority ties.
    seq: u64,
    /// The trigger data.
    pub trigger: Trigger,
}

/// The central trigger registry of a game session.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    records: FxHashMap<TriggerId, TriggerRecord>,
    by_event: FxHashMap<GameEvent, Vec<TriggerId>>,
    next_id: u32,
    next_seq: u64,
}

impl Dispatcher {
    /// Create a new empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger for an event channel, returning its id.
    ///
    /// The same trigger may be registered under several events; each
    /// registration gets its own id and record.
    pub fn register(
        &mut self,
        event: GameEvent,
        owner: Option<PlayerId>,
        trigger: Trigger,
    ) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        trace!(?event, %id, ?owner, priority = trigger.priority, "register trigger");

        self.by_event.entry(event).or_default().push(id);
        self.records.insert(
            id,
            TriggerRecord {
                id,
                event,
                owner,
                seq,
                trigger,
            },
        );
        id
    }

    /// Unregister a trigger by identity.
    ///
    /// Idempotent: absent ids and event mismatches are silent no-ops.
    /// Callers rely on this for cleanup-on-uninstall and for one-shot
    /// self-removal.
    pub fn unregister(&mut self, event: GameEvent, id: TriggerId) {
        let Some(record) = self.records.get(&id) else {
            return;
        };
        if record.event != event {
            return;
        }
        self.records.remove(&id);
        if let Some(list) = self.by_event.get_mut(&event) {
            list.retain(|&tid| tid != id);
            if list.is_empty() {
                self.by_event.remove(&event);
            }
        }
        trace!(?event, %id, "unregister trigger");
    }

    /// Update the owner relation of a registration.
    ///
    /// Returns false if the id is not registered.
    pub fn set_owner(&mut self, id: TriggerId, owner: Option<PlayerId>) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.owner = owner;
                true
            }
            None => false,
        }
    }

    /// Check whether an id is currently registered.
    #[must_use]
    pub fn contains(&self, id: TriggerId) -> bool {
        self.records.contains_key(&id)
    }

    /// Stable iteration snapshot for a fire call.
    ///
    /// Ids are ordered by priority descending, then registration order.
    #[must_use]
    pub fn snapshot(&self, event: GameEvent) -> Vec<TriggerId> {
        let Some(ids) = self.by_event.get(&event) else {
            return Vec::new();
        };

        let mut ordered: Vec<(i32, u64, TriggerId)> = ids
            .iter()
            .filter_map(|&id| {
                self.records
                    .get(&id)
                    .map(|r| (r.trigger.priority, r.seq, id))
            })
            .collect();

        ordered.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        ordered.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Fetch a registration's owner and trigger data by id.
    ///
    /// Clones the trigger (cheap: bodies hold `Rc` callbacks) so the
    /// fire loop holds no borrow into the table while actions run.
    #[must_use]
    pub fn fetch(&self, id: TriggerId) -> Option<(Option<PlayerId>, Trigger)> {
        self.records
            .get(&id)
            .map(|r| (r.owner, r.trigger.clone()))
    }

    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dispatcher is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::triggers::{Trigger, TriggerCondition};

    fn noop() -> Trigger {
        Trigger::relay(Rc::new(|_, _| {}), TriggerCondition::Global)
    }

    #[test]
    fn test_register_and_contains() {
        let mut dispatcher = Dispatcher::new();

        let id = dispatcher.register(GameEvent::TurnStart, None, noop());

        assert!(dispatcher.contains(id));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_unregister_idempotent() {
        let mut dispatcher = Dispatcher::new();

        let id = dispatcher.register(GameEvent::TurnStart, None, noop());
        dispatcher.unregister(GameEvent::TurnStart, id);
        assert!(!dispatcher.contains(id));

        // Second removal and wrong-channel removal are no-ops.
        dispatcher.unregister(GameEvent::TurnStart, id);
        dispatcher.unregister(GameEvent::TurnEnd, id);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_unregister_wrong_event_keeps_record() {
        let mut dispatcher = Dispatcher::new();

        let id = dispatcher.register(GameEvent::CardUsed, None, noop());
        dispatcher.unregister(GameEvent::TurnEnd, id);

        assert!(dispatcher.contains(id));
    }

    #[test]
    fn test_snapshot_priority_order() {
        let mut dispatcher = Dispatcher::new();

        let low = dispatcher.register(GameEvent::TurnStart, None, noop().with_priority(-1));
        let high = dispatcher.register(GameEvent::TurnStart, None, noop().with_priority(10));
        let mid = dispatcher.register(GameEvent::TurnStart, None, noop().with_priority(3));

        assert_eq!(dispatcher.snapshot(GameEvent::TurnStart), vec![high, mid, low]);
    }

    #[test]
    fn test_snapshot_ties_by_registration_order() {
        let mut dispatcher = Dispatcher::new();

        let first = dispatcher.register(GameEvent::TurnStart, None, noop());
        let second = dispatcher.register(GameEvent::TurnStart, None, noop());
        let third = dispatcher.register(GameEvent::TurnStart, None, noop());

        assert_eq!(
            dispatcher.snapshot(GameEvent::TurnStart),
            vec![first, second, third]
        );
    }

    #[test]
    fn test_same_trigger_multiple_events() {
        let mut dispatcher = Dispatcher::new();
        let trigger = noop();

        let a = dispatcher.register(GameEvent::TurnStart, None, trigger.clone());
        let b = dispatcher.register(GameEvent::TurnEnd, None, trigger);

        assert_ne!(a, b);
        assert_eq!(dispatcher.snapshot(GameEvent::TurnStart), vec![a]);
        assert_eq!(dispatcher.snapshot(GameEvent::TurnEnd), vec![b]);
    }

    #[test]
    fn test_set_owner() {
        let mut dispatcher = Dispatcher::new();

        let id = dispatcher.register(GameEvent::TurnStart, None, noop());
        assert!(dispatcher.set_owner(id, Some(PlayerId::new(2))));

        let (owner, _) = dispatcher.fetch(id).unwrap();
        assert_eq!(owner, Some(PlayerId::new(2)));

        assert!(!dispatcher.set_owner(TriggerId::new(999), None));
    }

    #[test]
    fn test_snapshot_empty_channel() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.snapshot(GameEvent::PhaseEnd).is_empty());
    }
}
