use crate::VariateError;

/// Fatal simulation errors. Any of these aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No event is scheduled even though the model has not reached its termination condition.
    #[error("Event list empty at time {time}")]
    EventListEmpty {
        /// Simulation time at which the empty list was detected.
        time: f64,
    },
    /// The earliest scheduled event lies in the past.
    #[error("Event {event} scheduled at {scheduled} but the clock already reads {time}")]
    ClockRegression {
        /// Name of the offending event type.
        event: String,
        /// Scheduled time of the event.
        scheduled: f64,
        /// Current simulation time.
        time: f64,
    },
    /// The model received an event it cannot process in its current state.
    #[error("Invalid event type {event} dispatched at time {time}")]
    UnexpectedEvent {
        /// Name of the dispatched event type.
        event: String,
        /// Simulation time of the dispatch.
        time: f64,
    },
    /// Random variate could not be generated.
    #[error(transparent)]
    Variate(#[from] VariateError),
    /// Writing model output, such as an event trace, failed.
    #[error("unable to write simulation output")]
    Io(#[from] std::io::Error),
}
