#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

//! Small discrete-event simulation engine built around a fixed event list.
//!
//! Each event type owns exactly one slot in the [`Scheduler`]. A slot is either inactive or
//! holds the time at which the event fires, optionally with an integer payload. The
//! [`Simulation`] driver repeatedly selects the earliest slot, advances the clock, lets the
//! [`Model`] integrate its time-weighted statistics over the elapsed interval, and finally
//! dispatches the event to the model.
//!
//! # Examples
//!
//! ```
//! # use desim::{Error, EventEntry, Model, Scheduler, Simulation, VariateGenerator};
//! # use rand::RngCore;
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::Display)]
//! enum Tick {
//!     Tick,
//! }
//!
//! #[derive(Default)]
//! struct Counter {
//!     ticks: usize,
//! }
//!
//! impl Model for Counter {
//!     type Event = Tick;
//!
//!     fn initialize<R: RngCore>(
//!         &mut self,
//!         scheduler: &mut Scheduler<Tick>,
//!         _: &mut VariateGenerator<R>,
//!     ) -> Result<(), Error> {
//!         scheduler.schedule_at(Tick::Tick, 1.0);
//!         Ok(())
//!     }
//!
//!     fn integrate(&mut self, _elapsed: f64) {}
//!
//!     fn process_event<R: RngCore>(
//!         &mut self,
//!         _: &EventEntry<Tick>,
//!         scheduler: &mut Scheduler<Tick>,
//!         _: &mut VariateGenerator<R>,
//!     ) -> Result<(), Error> {
//!         self.ticks += 1;
//!         scheduler.schedule(Tick::Tick, 1.0);
//!         Ok(())
//!     }
//!
//!     fn is_finished(&self) -> bool {
//!         self.ticks == 3
//!     }
//! }
//!
//! let mut sim = Simulation::new(Counter::default(), VariateGenerator::seeded(7))?;
//! sim.run()?;
//! assert_eq!(sim.time(), 3.0);
//! # Ok::<(), Error>(())
//! ```

pub use error::Error;
pub use scheduler::{EventEntry, EventKind, Scheduler, SimulationClock};
pub use simulation::{Model, Simulation};
pub use stats::{Tally, TimeIntegral};
pub use variate::{CumulativeDistribution, VariateError, VariateGenerator};

mod error;
mod scheduler;
mod simulation;
mod stats;
mod variate;
