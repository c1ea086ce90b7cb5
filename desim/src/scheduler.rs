use std::fmt;

use strum::IntoEnumIterator;

use crate::Error;

/// Trait implemented by enums naming the event types of a model.
///
/// The order in which [`IntoEnumIterator::iter`] yields the variants is the order in which the
/// scheduler scans its slots, and therefore decides which event wins a tie.
pub trait EventKind: IntoEnumIterator + Copy + Eq + fmt::Debug + fmt::Display {}

impl<T> EventKind for T where T: IntoEnumIterator + Copy + Eq + fmt::Debug + fmt::Display {}

/// Entry of the event list: the event type, the time when it is supposed to occur, and an
/// optional payload, e.g., a customer number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventEntry<E> {
    kind: E,
    time: f64,
    payload: Option<usize>,
}

impl<E: Copy> EventEntry<E> {
    fn inactive(kind: E) -> Self {
        Self {
            kind,
            time: f64::INFINITY,
            payload: None,
        }
    }

    /// Event type.
    #[must_use]
    pub fn kind(&self) -> E {
        self.kind
    }

    /// Scheduled time. Infinite if the slot is inactive.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Payload attached when scheduling.
    #[must_use]
    pub fn payload(&self) -> Option<usize> {
        self.payload
    }

    /// Whether the slot holds a scheduled event.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.time.is_finite()
    }
}

/// Simulation clock: the current time and the time of the last processed event.
///
/// Both values only ever move forward.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    time: f64,
    last_event: f64,
}

impl SimulationClock {
    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time at which statistics were last brought up to date.
    #[must_use]
    pub fn time_of_last_event(&self) -> f64 {
        self.last_event
    }

    /// Moves the last-event marker to the current time and returns the elapsed interval.
    pub fn mark_event(&mut self) -> f64 {
        let elapsed = self.time - self.last_event;
        self.last_event = self.time;
        elapsed
    }
}

/// Scheduler keeps the clock and one event slot per event type.
pub struct Scheduler<E> {
    slots: Vec<EventEntry<E>>,
    clock: SimulationClock,
}

impl<E: EventKind> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            slots: E::iter().map(EventEntry::inactive).collect(),
            clock: SimulationClock::default(),
        }
    }
}

impl<E: EventKind> Scheduler<E> {
    fn slot_mut(&mut self, kind: E) -> &mut EventEntry<E> {
        self.slots
            .iter_mut()
            .find(|slot| slot.kind == kind)
            .expect("every event type owns a slot")
    }

    /// Schedules `kind` to occur at `self.time() + delay`, replacing any pending occurrence.
    pub fn schedule(&mut self, kind: E, delay: f64) {
        self.schedule_at(kind, self.time() + delay);
    }

    /// Schedules `kind` at `self.time() + delay` carrying `payload`.
    pub fn schedule_with(&mut self, kind: E, delay: f64, payload: usize) {
        let time = self.time() + delay;
        *self.slot_mut(kind) = EventEntry {
            kind,
            time,
            payload: Some(payload),
        };
    }

    /// Schedules `kind` at the absolute simulation time `time`.
    pub fn schedule_at(&mut self, kind: E, time: f64) {
        *self.slot_mut(kind) = EventEntry {
            kind,
            time,
            payload: None,
        };
    }

    /// Removes `kind` from consideration until it is scheduled again.
    pub fn deactivate(&mut self, kind: E) {
        *self.slot_mut(kind) = EventEntry::inactive(kind);
    }

    /// Returns the pending occurrence of `kind`, if any.
    #[must_use]
    pub fn scheduled(&self, kind: E) -> Option<EventEntry<E>> {
        self.slots
            .iter()
            .find(|slot| slot.kind == kind)
            .copied()
            .filter(EventEntry::is_active)
    }

    /// Iterates over all slots in scan order, including inactive ones.
    pub fn slots(&self) -> impl Iterator<Item = &EventEntry<E>> {
        self.slots.iter()
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock.time
    }

    /// Read-only access to the clock.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Mutable access to the clock, used by the driver to mark processed events.
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Selects the earliest event, advances the clock to its time and consumes the slot.
    ///
    /// Slots are scanned in declaration order of `E` and the first one reaching the minimum
    /// wins, so ties are resolved deterministically.
    ///
    /// # Errors
    ///
    /// - [`Error::EventListEmpty`] when no slot is active.
    /// - [`Error::ClockRegression`] when the earliest event lies before the current time.
    pub fn advance(&mut self) -> Result<EventEntry<E>, Error> {
        let mut next: Option<usize> = None;
        let mut min_time = f64::INFINITY;
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.time < min_time {
                min_time = slot.time;
                next = Some(idx);
            }
        }
        let idx = next.ok_or(Error::EventListEmpty {
            time: self.clock.time,
        })?;
        let entry = self.slots[idx];
        if entry.time < self.clock.time {
            return Err(Error::ClockRegression {
                event: entry.kind.to_string(),
                scheduled: entry.time,
                time: self.clock.time,
            });
        }
        self.slots[idx] = EventEntry::inactive(entry.kind);
        self.clock.time = entry.time;
        Ok(entry)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::Display)]
    enum Event {
        A,
        B,
        C,
    }

    #[test]
    fn test_new_scheduler_is_empty() {
        let mut scheduler = Scheduler::<Event>::default();
        assert_eq!(scheduler.time(), 0.0);
        assert_eq!(scheduler.slots().count(), 3);
        assert!(scheduler.slots().all(|s| !s.is_active()));
        match scheduler.advance() {
            Err(Error::EventListEmpty { time }) => assert_eq!(time, 0.0),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_scheduler() {
        let mut scheduler = Scheduler::<Event>::default();
        scheduler.schedule(Event::A, 1.0);
        scheduler.schedule_with(Event::B, 0.5, 17);
        scheduler.schedule_at(Event::C, 2.0);

        let entry = scheduler.advance().unwrap();
        assert_eq!(entry.kind(), Event::B);
        assert_eq!(entry.time(), 0.5);
        assert_eq!(entry.payload(), Some(17));
        assert_eq!(scheduler.time(), 0.5);
        assert!(scheduler.scheduled(Event::B).is_none());

        scheduler.schedule(Event::B, 1.0);
        assert_eq!(scheduler.scheduled(Event::B).map(|e| e.time()), Some(1.5));

        let entry = scheduler.advance().unwrap();
        assert_eq!(entry.kind(), Event::A);
        assert_eq!(entry.payload(), None);
        assert_eq!(scheduler.time(), 1.0);

        assert_eq!(scheduler.advance().unwrap().kind(), Event::B);
        assert_eq!(scheduler.advance().unwrap().kind(), Event::C);
        assert_eq!(scheduler.time(), 2.0);
        assert!(scheduler.advance().is_err());
    }

    #[test]
    fn test_ties_resolved_in_declaration_order() {
        let mut scheduler = Scheduler::<Event>::default();
        scheduler.schedule_at(Event::C, 1.0);
        scheduler.schedule_at(Event::B, 1.0);
        scheduler.schedule_at(Event::A, 1.0);
        assert_eq!(scheduler.advance().unwrap().kind(), Event::A);
        assert_eq!(scheduler.advance().unwrap().kind(), Event::B);
        assert_eq!(scheduler.advance().unwrap().kind(), Event::C);
    }

    #[test]
    fn test_rescheduling_replaces_pending_event() {
        let mut scheduler = Scheduler::<Event>::default();
        scheduler.schedule_with(Event::A, 3.0, 1);
        scheduler.schedule_with(Event::A, 2.0, 2);
        let entry = scheduler.scheduled(Event::A).unwrap();
        assert_eq!(entry.time(), 2.0);
        assert_eq!(entry.payload(), Some(2));
        scheduler.deactivate(Event::A);
        assert!(scheduler.scheduled(Event::A).is_none());
        assert!(scheduler.advance().is_err());
    }

    #[test]
    fn test_clock_regression() {
        let mut scheduler = Scheduler::<Event>::default();
        scheduler.schedule_at(Event::A, 2.0);
        scheduler.advance().unwrap();
        scheduler.schedule_at(Event::B, 1.0);
        assert!(matches!(
            scheduler.advance(),
            Err(Error::ClockRegression { .. })
        ));
    }

    #[test]
    fn test_mark_event() {
        let mut scheduler = Scheduler::<Event>::default();
        scheduler.schedule_at(Event::A, 1.5);
        scheduler.advance().unwrap();
        assert_eq!(scheduler.clock().time_of_last_event(), 0.0);
        assert_eq!(scheduler.clock_mut().mark_event(), 1.5);
        assert_eq!(scheduler.clock().time_of_last_event(), 1.5);
        assert_eq!(scheduler.clock_mut().mark_event(), 0.0);
    }
}
