//! Single-server queueing system with exponential interarrival and service times.

use std::collections::VecDeque;
use std::io::Write;

use derive_more::{Display, From, Into};
use desim::{Error, EventEntry, Model, Scheduler, Simulation, Tally, TimeIntegral, VariateGenerator};
use rand::RngCore;

use crate::QueueParams;

/// Queueing events, in tie-breaking order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::EnumIter, strum::Display)]
pub enum Event {
    /// A customer arrives. Payload: the arriving customer.
    Arrival,
    /// The server completes a service. Payload: the customer being served.
    Departure,
}

/// Customer number, assigned in arrival order starting from 1.
#[derive(From, Into, Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Display)]
pub struct CustomerId(usize);

/// Whether the server is working.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// No customer in service.
    Idle,
    /// Serving a customer.
    Busy,
}

impl ServerStatus {
    fn indicator(self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Busy => 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct WaitingCustomer {
    id: CustomerId,
    arrival_time: f64,
}

/// Measures of performance at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueSummary {
    /// Average delay in queue, in minutes.
    pub average_delay: f64,
    /// Time-average number of customers in queue.
    pub average_number_in_queue: f64,
    /// Proportion of time the server was busy.
    pub server_utilization: f64,
    /// Simulation time at the end of the run, in minutes.
    pub end_time: f64,
    /// Number of customers whose delay was observed.
    pub customers_delayed: usize,
}

/// Single-server FIFO queue.
///
/// A customer arriving to an idle server is served immediately with a delay of zero; otherwise
/// it waits in the queue. Statistics cover the delays in queue, the area under the
/// number-in-queue function, and the area under the server-busy indicator.
pub struct SingleServerQueue {
    params: QueueParams,
    server: ServerStatus,
    queue: VecDeque<WaitingCustomer>,
    delays: Tally,
    area_num_in_q: TimeIntegral,
    area_server_status: TimeIntegral,
    trace: Option<Box<dyn Write>>,
    traced_events: usize,
}

impl SingleServerQueue {
    /// Constructs an empty system with an idle server.
    #[must_use]
    pub fn new(params: QueueParams) -> Self {
        Self {
            params,
            server: ServerStatus::Idle,
            queue: VecDeque::new(),
            delays: Tally::default(),
            area_num_in_q: TimeIntegral::default(),
            area_server_status: TimeIntegral::default(),
            trace: None,
            traced_events: 0,
        }
    }

    /// Writes a numbered line for each event, and a separator each time a delay is recorded.
    #[must_use]
    pub fn with_trace(mut self, trace: Box<dyn Write>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Model parameters.
    #[must_use]
    pub fn params(&self) -> &QueueParams {
        &self.params
    }

    /// Current server status.
    #[must_use]
    pub fn server_status(&self) -> ServerStatus {
        self.server
    }

    /// Number of customers waiting, not counting the one in service.
    #[must_use]
    pub fn number_in_queue(&self) -> usize {
        self.queue.len()
    }

    /// Number of customers whose delay in queue has been recorded.
    #[must_use]
    pub fn customers_delayed(&self) -> usize {
        self.delays.count()
    }

    /// Sum of all recorded delays.
    #[must_use]
    pub fn total_of_delays(&self) -> f64 {
        self.delays.sum()
    }

    /// Area under the number-in-queue function so far.
    #[must_use]
    pub fn area_num_in_q(&self) -> f64 {
        self.area_num_in_q.area()
    }

    /// Area under the server-busy indicator so far.
    #[must_use]
    pub fn area_server_status(&self) -> f64 {
        self.area_server_status.area()
    }

    /// Computes the measures of performance for a run that ended at `end_time`.
    #[must_use]
    pub fn summary(&self, end_time: f64) -> QueueSummary {
        QueueSummary {
            average_delay: self.delays.mean(),
            average_number_in_queue: self.area_num_in_q.average(end_time),
            server_utilization: self.area_server_status.average(end_time),
            end_time,
            customers_delayed: self.delays.count(),
        }
    }

    /// Flushes the event trace, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace cannot be written.
    pub fn flush_trace(&mut self) -> std::io::Result<()> {
        if let Some(trace) = &mut self.trace {
            trace.flush()?;
        }
        Ok(())
    }

    fn trace_event(&mut self, customer: CustomerId, event: Event) -> std::io::Result<()> {
        if let Some(trace) = &mut self.trace {
            self.traced_events += 1;
            writeln!(
                trace,
                "{}. Next event: Customer {} {}",
                self.traced_events, customer, event
            )?;
        }
        Ok(())
    }

    fn record_delay(&mut self, delay: f64) -> std::io::Result<()> {
        self.delays.record(delay);
        if let Some(trace) = &mut self.trace {
            writeln!(
                trace,
                "\n---------No. of customers delayed: {}--------\n",
                self.delays.count()
            )?;
        }
        Ok(())
    }

    fn arrive<R: RngCore>(
        &mut self,
        customer: CustomerId,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        let now = scheduler.time();
        scheduler.schedule_with(
            Event::Arrival,
            variates.exponential(self.params.mean_interarrival)?,
            usize::from(customer) + 1,
        );
        match self.server {
            ServerStatus::Busy => {
                log::trace!("[{:.4}] Customer {} joins the queue", now, customer);
                self.queue.push_back(WaitingCustomer {
                    id: customer,
                    arrival_time: now,
                });
            }
            ServerStatus::Idle => {
                log::trace!("[{:.4}] Customer {} served immediately", now, customer);
                self.server = ServerStatus::Busy;
                self.record_delay(0.0)?;
                scheduler.schedule_with(
                    Event::Departure,
                    variates.exponential(self.params.mean_service)?,
                    customer.into(),
                );
            }
        }
        Ok(())
    }

    fn depart<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        let now = scheduler.time();
        if let Some(next) = self.queue.pop_front() {
            let delay = now - next.arrival_time;
            log::trace!(
                "[{:.4}] Customer {} starts service after {:.4}",
                now,
                next.id,
                delay
            );
            self.record_delay(delay)?;
            scheduler.schedule_with(
                Event::Departure,
                variates.exponential(self.params.mean_service)?,
                next.id.into(),
            );
        } else {
            log::trace!("[{:.4}] Server becomes idle", now);
            self.server = ServerStatus::Idle;
        }
        Ok(())
    }
}

impl Model for SingleServerQueue {
    type Event = Event;

    fn initialize<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        scheduler.schedule_with(
            Event::Arrival,
            variates.exponential(self.params.mean_interarrival)?,
            1,
        );
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn integrate(&mut self, elapsed: f64) {
        self.area_num_in_q
            .accumulate(self.queue.len() as f64, elapsed);
        self.area_server_status
            .accumulate(self.server.indicator(), elapsed);
    }

    fn process_event<R: RngCore>(
        &mut self,
        event: &EventEntry<Event>,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        let customer = CustomerId::from(event.payload().ok_or_else(|| {
            Error::UnexpectedEvent {
                event: format!("{} without a customer", event.kind()),
                time: event.time(),
            }
        })?);
        self.trace_event(customer, event.kind())?;
        match event.kind() {
            Event::Arrival => self.arrive(customer, scheduler, variates),
            Event::Departure => self.depart(scheduler, variates),
        }
    }

    fn is_finished(&self) -> bool {
        self.delays.count() >= self.params.num_delays_required
    }
}

/// Runs the queue until the required number of delays is observed and returns the summary.
///
/// # Errors
///
/// Returns an error if the model fails or the trace cannot be written.
pub fn run_queue<R: RngCore>(
    params: &QueueParams,
    variates: VariateGenerator<R>,
    trace: Option<Box<dyn Write>>,
) -> Result<QueueSummary, Error> {
    let mut model = SingleServerQueue::new(params.clone());
    if let Some(trace) = trace {
        model = model.with_trace(trace);
    }
    let mut sim = Simulation::new(model, variates)?;
    log::info!(
        "Simulating single-server queue until {} customers are delayed",
        params.num_delays_required
    );
    sim.run()?;
    let end_time = sim.time();
    let (mut model, _) = sim.into_parts();
    model.flush_trace()?;
    Ok(model.summary(end_time))
}
