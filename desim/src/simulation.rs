use rand::RngCore;

use crate::{Error, EventEntry, EventKind, Scheduler, VariateGenerator};

/// A simulation model: its state, statistics, and event handlers.
///
/// The driver calls [`Model::integrate`] exactly once per event, after the clock has advanced
/// but before [`Model::process_event`], so time-weighted statistics always see the state that
/// held over the elapsed interval.
pub trait Model {
    /// Event types of the model.
    type Event: EventKind;

    /// Schedules the initial events.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial events cannot be drawn.
    fn initialize<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Self::Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error>;

    /// Updates time-weighted statistics over `elapsed` time units of unchanged state.
    fn integrate(&mut self, elapsed: f64);

    /// Processes `event`, mutating the state and scheduling future events.
    ///
    /// The slot of the dispatched event has already been consumed; a handler that wants the
    /// event to recur must schedule it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be processed.
    fn process_event<R: RngCore>(
        &mut self,
        event: &EventEntry<Self::Event>,
        scheduler: &mut Scheduler<Self::Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error>;

    /// Termination condition checked before each event.
    fn is_finished(&self) -> bool;
}

/// Owns a model together with its scheduler and variate generator, and runs the event loop.
pub struct Simulation<M: Model, R> {
    model: M,
    scheduler: Scheduler<M::Event>,
    variates: VariateGenerator<R>,
    processed: usize,
}

impl<M: Model, R: RngCore> Simulation<M, R> {
    /// Constructs a simulation and lets the model schedule its initial events.
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails to initialize.
    pub fn new(mut model: M, mut variates: VariateGenerator<R>) -> Result<Self, Error> {
        let mut scheduler = Scheduler::default();
        model.initialize(&mut scheduler, &mut variates)?;
        Ok(Self {
            model,
            scheduler,
            variates,
            processed: 0,
        })
    }

    /// Processes a single event and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the event list is empty or the handler fails.
    pub fn step(&mut self) -> Result<EventEntry<M::Event>, Error> {
        let event = self.scheduler.advance()?;
        let elapsed = self.scheduler.clock_mut().mark_event();
        self.model.integrate(elapsed);
        log::trace!(
            "[{:.4}] Dispatching {} (payload: {:?})",
            event.time(),
            event.kind(),
            event.payload()
        );
        self.model
            .process_event(&event, &mut self.scheduler, &mut self.variates)?;
        self.processed += 1;
        Ok(event)
    }

    /// Runs until the model reports it is finished.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered, most notably [`Error::EventListEmpty`] if the
    /// model runs out of events before finishing.
    pub fn run(&mut self) -> Result<(), Error> {
        while !self.model.is_finished() {
            self.step()?;
        }
        log::debug!(
            "Simulation finished at {} after {} events",
            self.time(),
            self.processed
        );
        Ok(())
    }

    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.scheduler.time()
    }

    /// Number of events processed so far.
    #[must_use]
    pub fn events_processed(&self) -> usize {
        self.processed
    }

    /// The model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The scheduler, e.g., to inspect pending events.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler<M::Event> {
        &self.scheduler
    }

    /// Consumes the simulation, returning the model and the generator so the random stream
    /// can be continued by another run.
    pub fn into_parts(self) -> (M, VariateGenerator<R>) {
        (self.model, self.variates)
    }
}
