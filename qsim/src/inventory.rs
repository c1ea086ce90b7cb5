//! Single-product inventory system under `(s, S)` reorder policies.

use std::rc::Rc;

use desim::{
    CumulativeDistribution, Error, EventEntry, Model, Scheduler, Simulation, TimeIntegral,
    VariateGenerator,
};
use rand::RngCore;

use crate::{ConfigError, InventoryParams, Parameters, Policy};

/// Inventory events, in tie-breaking order.
///
/// An evaluation due at the end of the horizon never runs because [`Event::EndSimulation`] is
/// declared before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::EnumIter, strum::Display)]
pub enum Event {
    /// The outstanding order is delivered.
    OrderArrival,
    /// A customer demands a random number of items.
    Demand,
    /// The horizon has been reached.
    EndSimulation,
    /// Monthly review of the inventory level.
    Evaluate,
}

/// Average monthly costs of one policy run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyReport {
    /// Evaluated policy.
    pub policy: Policy,
    /// Sum of the other three averages.
    pub average_total_cost: f64,
    /// Setup and incremental costs of all orders, per month.
    pub average_ordering_cost: f64,
    /// Holding cost per month.
    pub average_holding_cost: f64,
    /// Shortage cost per month.
    pub average_shortage_cost: f64,
}

/// State and statistics of a single policy run.
///
/// Positive levels are items on hand, negative levels are backlogged demand.
pub struct InventorySystem {
    params: Rc<InventoryParams>,
    demand: Rc<CumulativeDistribution>,
    policy: Policy,
    level: i64,
    order_amount: i64,
    area_holding: TimeIntegral,
    area_shortage: TimeIntegral,
    total_ordering_cost: f64,
    finished: bool,
}

impl InventorySystem {
    /// Constructs a system at the initial inventory level with no outstanding order.
    #[must_use]
    pub fn new(
        params: Rc<InventoryParams>,
        demand: Rc<CumulativeDistribution>,
        policy: Policy,
    ) -> Self {
        Self {
            level: params.initial_inv_level,
            params,
            demand,
            policy,
            order_amount: 0,
            area_holding: TimeIntegral::default(),
            area_shortage: TimeIntegral::default(),
            total_ordering_cost: 0.0,
            finished: false,
        }
    }

    /// Evaluated policy.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Current inventory level.
    #[must_use]
    pub fn level(&self) -> i64 {
        self.level
    }

    /// Amount of the order placed most recently, delivered or not.
    #[must_use]
    pub fn order_amount(&self) -> i64 {
        self.order_amount
    }

    /// Ordering cost accrued so far.
    #[must_use]
    pub fn total_ordering_cost(&self) -> f64 {
        self.total_ordering_cost
    }

    /// Area under the positive part of the level.
    #[must_use]
    pub fn area_holding(&self) -> f64 {
        self.area_holding.area()
    }

    /// Area under the negative part of the level.
    #[must_use]
    pub fn area_shortage(&self) -> f64 {
        self.area_shortage.area()
    }

    /// Computes average monthly costs over the whole horizon.
    #[must_use]
    pub fn report(&self) -> PolicyReport {
        let months = f64::from(self.params.num_months);
        let average_ordering_cost = self.total_ordering_cost / months;
        let average_holding_cost =
            self.params.holding_cost * self.area_holding.average(months);
        let average_shortage_cost =
            self.params.shortage_cost * self.area_shortage.average(months);
        PolicyReport {
            policy: self.policy,
            average_total_cost: average_ordering_cost
                + average_holding_cost
                + average_shortage_cost,
            average_ordering_cost,
            average_holding_cost,
            average_shortage_cost,
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn demand<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        let size = variates.discrete(&self.demand)?;
        self.level -= size as i64;
        scheduler.schedule(
            Event::Demand,
            variates.exponential(self.params.mean_interdemand)?,
        );
        Ok(())
    }

    fn evaluate<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        if self.level < self.policy.small {
            if let Some(pending) = scheduler.scheduled(Event::OrderArrival) {
                log::warn!(
                    "[{:.4}] Order of {} items due at {:.4} replaced by a new order",
                    scheduler.time(),
                    self.order_amount,
                    pending.time()
                );
            }
            self.order_amount = self.policy.big - self.level;
            #[allow(clippy::cast_precision_loss)]
            let amount = self.order_amount as f64;
            self.total_ordering_cost +=
                self.params.setup_cost + self.params.incremental_cost * amount;
            let lag = variates.uniform(self.params.minlag, self.params.maxlag)?;
            log::trace!(
                "[{:.4}] Level {} below {}, ordering {} items, lag {:.4}",
                scheduler.time(),
                self.level,
                self.policy.small,
                self.order_amount,
                lag
            );
            scheduler.schedule(Event::OrderArrival, lag);
        }
        scheduler.schedule(Event::Evaluate, 1.0);
        Ok(())
    }
}

impl Model for InventorySystem {
    type Event = Event;

    fn initialize<R: RngCore>(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        scheduler.schedule(
            Event::Demand,
            variates.exponential(self.params.mean_interdemand)?,
        );
        scheduler.schedule_at(Event::EndSimulation, f64::from(self.params.num_months));
        scheduler.schedule_at(Event::Evaluate, 0.0);
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn integrate(&mut self, elapsed: f64) {
        if self.level < 0 {
            self.area_shortage.accumulate(-self.level as f64, elapsed);
        } else {
            self.area_holding.accumulate(self.level as f64, elapsed);
        }
    }

    fn process_event<R: RngCore>(
        &mut self,
        event: &EventEntry<Event>,
        scheduler: &mut Scheduler<Event>,
        variates: &mut VariateGenerator<R>,
    ) -> Result<(), Error> {
        if self.finished {
            return Err(Error::UnexpectedEvent {
                event: format!("{} after the end of the run", event.kind()),
                time: event.time(),
            });
        }
        match event.kind() {
            Event::OrderArrival => {
                self.level += self.order_amount;
                Ok(())
            }
            Event::Demand => self.demand(scheduler, variates),
            Event::EndSimulation => {
                self.finished = true;
                Ok(())
            }
            Event::Evaluate => self.evaluate(scheduler, variates),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Evaluates policies one after another on a single random stream.
pub struct InventoryRunner<R> {
    params: Rc<InventoryParams>,
    demand: Rc<CumulativeDistribution>,
    variates: VariateGenerator<R>,
}

impl<R: RngCore> InventoryRunner<R> {
    /// Validates the parameters and builds the demand distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn new(params: InventoryParams, variates: VariateGenerator<R>) -> Result<Self, ConfigError> {
        params.validate()?;
        let demand = params.demand_distribution()?;
        Ok(Self {
            params: Rc::new(params),
            demand: Rc::new(demand),
            variates,
        })
    }

    /// Inventory parameters.
    #[must_use]
    pub fn params(&self) -> &InventoryParams {
        &self.params
    }

    /// Runs `policy` from fresh state, continuing the random stream of previous runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation fails.
    pub fn run_policy(&mut self, policy: Policy) -> Result<PolicyReport, Error> {
        let model = InventorySystem::new(Rc::clone(&self.params), Rc::clone(&self.demand), policy);
        let mut sim = Simulation::new(model, self.variates.by_ref())?;
        sim.run()?;
        let report = sim.model().report();
        log::debug!(
            "Policy {} finished after {} events: average total cost {:.2}",
            policy,
            sim.events_processed(),
            report.average_total_cost
        );
        Ok(report)
    }

    /// Runs all configured policies in order, passing each report to `on_report` as soon as it
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns the first error of either a simulation or `on_report`.
    pub fn run_all<E, F>(&mut self, mut on_report: F) -> Result<Vec<PolicyReport>, E>
    where
        E: From<Error>,
        F: FnMut(&PolicyReport) -> Result<(), E>,
    {
        let policies = self.params.policies.clone();
        let mut reports = Vec::with_capacity(policies.len());
        for policy in policies {
            let report = self.run_policy(policy)?;
            on_report(&report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::approx_eq;
    use rstest::{fixture, rstest};
    use testing::ScriptedRng;

    #[fixture]
    fn params() -> InventoryParams {
        InventoryParams::parse_tokens(include_str!("../data/inventory.in")).unwrap()
    }

    fn system(params: InventoryParams, policy: Policy) -> InventorySystem {
        let demand = params.demand_distribution().unwrap();
        InventorySystem::new(Rc::new(params), Rc::new(demand), policy)
    }

    #[rstest]
    fn test_evaluation_places_order(params: InventoryParams) {
        let mut model = system(params, Policy::new(80, 100));
        let mut scheduler = Scheduler::<Event>::default();
        let mut variates = VariateGenerator::seeded(1);
        model.initialize(&mut scheduler, &mut variates).unwrap();
        let event = scheduler.advance().unwrap();
        assert_eq!(event.kind(), Event::Evaluate);
        assert_eq!(event.time(), 0.0);
        model
            .process_event(&event, &mut scheduler, &mut variates)
            .unwrap();
        assert_eq!(model.order_amount(), 40);
        assert!(approx_eq!(f64, model.total_ordering_cost(), 32.0 + 3.0 * 40.0));
        let arrival = scheduler.scheduled(Event::OrderArrival).unwrap();
        assert!(arrival.time() >= 0.5 && arrival.time() <= 1.0);
        assert_eq!(
            scheduler.scheduled(Event::Evaluate).map(|e| e.time()),
            Some(1.0)
        );
        assert_eq!(
            scheduler.scheduled(Event::EndSimulation).map(|e| e.time()),
            Some(120.0)
        );
    }

    #[rstest]
    fn test_no_order_at_or_above_reorder_point(params: InventoryParams) {
        let mut model = system(params, Policy::new(60, 100));
        let mut scheduler = Scheduler::<Event>::default();
        let mut variates = VariateGenerator::seeded(1);
        model.initialize(&mut scheduler, &mut variates).unwrap();
        let event = scheduler.advance().unwrap();
        model
            .process_event(&event, &mut scheduler, &mut variates)
            .unwrap();
        assert_eq!(model.order_amount(), 0);
        assert_eq!(model.total_ordering_cost(), 0.0);
        assert!(scheduler.scheduled(Event::OrderArrival).is_none());
    }

    #[rstest]
    fn test_delivery_never_exceeds_order_up_to_level(params: InventoryParams) {
        let mut sim =
            Simulation::new(system(params, Policy::new(20, 80)), VariateGenerator::seeded(42))
                .unwrap();
        let mut deliveries = 0;
        while !sim.model().is_finished() {
            let event = sim.step().unwrap();
            assert!(event.time() <= 120.0);
            if event.kind() == Event::OrderArrival {
                deliveries += 1;
                assert!(sim.model().level() <= 80);
            }
        }
        assert!(deliveries > 0);
        assert_eq!(sim.time(), 120.0);
        // The evaluation due at the horizon loses the tie against the end of the run.
        assert_eq!(
            sim.scheduler().scheduled(Event::Evaluate).map(|e| e.time()),
            Some(120.0)
        );
        let report = sim.model().report();
        assert!(approx_eq!(
            f64,
            report.average_total_cost,
            report.average_ordering_cost + report.average_holding_cost + report.average_shortage_cost,
            ulps = 4
        ));
        assert!(sim.model().area_holding() > 0.0);
    }

    #[rstest]
    fn test_delivery_restores_order_up_to_level(mut params: InventoryParams) {
        params.initial_inv_level = 10;
        // First demand at 2.0 (mean 0.1), then a lag of 0.75 for the order placed at 0.
        let draws = [(-20.0_f64).exp(), 0.5];
        let mut sim = Simulation::new(
            system(params, Policy::new(20, 80)),
            VariateGenerator::new(ScriptedRng::from_uniforms(&draws)),
        )
        .unwrap();

        let evaluate = sim.step().unwrap();
        assert_eq!(evaluate.kind(), Event::Evaluate);
        assert_eq!(sim.model().level(), 10);
        assert_eq!(sim.model().order_amount(), 70);

        let arrival = sim.step().unwrap();
        assert_eq!(arrival.kind(), Event::OrderArrival);
        assert!(approx_eq!(f64, arrival.time(), 0.75, epsilon = 1e-9));
        assert_eq!(sim.model().level(), 80);
        let demand = sim.scheduler().scheduled(Event::Demand).unwrap();
        assert!(approx_eq!(f64, demand.time(), 2.0, epsilon = 1e-6));
    }

    #[rstest]
    fn test_policy_that_never_orders(mut params: InventoryParams) {
        params.holding_cost = 0.0;
        let mut runner =
            InventoryRunner::new(params, VariateGenerator::seeded(5)).unwrap();
        let report = runner.run_policy(Policy::new(-1_000_000, -1_000_000)).unwrap();
        assert_eq!(report.average_ordering_cost, 0.0);
        assert_eq!(report.average_holding_cost, 0.0);
        // Demand keeps draining the stock, so shortage eventually accrues.
        assert!(report.average_shortage_cost > 0.0);
        assert!(approx_eq!(
            f64,
            report.average_total_cost,
            report.average_shortage_cost,
            ulps = 2
        ));
    }

    #[rstest]
    fn test_stream_continues_across_policies(params: InventoryParams) {
        let policies = params.policies.clone();
        let mut runner =
            InventoryRunner::new(params.clone(), VariateGenerator::seeded(42)).unwrap();
        let mut streamed = Vec::new();
        let reports = runner
            .run_all(|report| -> Result<(), Error> {
                streamed.push(*report);
                Ok(())
            })
            .unwrap();
        assert_eq!(reports, streamed);
        assert_eq!(
            reports.iter().map(|r| r.policy).collect::<Vec<_>>(),
            policies
        );

        // Rerunning the second policy on a fresh stream gives a different result.
        let mut fresh = InventoryRunner::new(params, VariateGenerator::seeded(42)).unwrap();
        let first = fresh.run_policy(policies[0]).unwrap();
        assert_eq!(first, reports[0]);
        let mut restarted =
            InventoryRunner::new(fresh.params().clone(), VariateGenerator::seeded(42)).unwrap();
        assert_ne!(restarted.run_policy(policies[1]).unwrap(), reports[1]);
    }

    #[rstest]
    fn test_invalid_params_rejected(mut params: InventoryParams) {
        params.policies.clear();
        assert!(matches!(
            InventoryRunner::new(params, VariateGenerator::seeded(0)),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[rstest]
    fn test_event_after_end_is_rejected(params: InventoryParams) {
        let mut model = system(params, Policy::new(20, 40));
        let mut scheduler = Scheduler::<Event>::default();
        let mut variates = VariateGenerator::seeded(0);
        scheduler.schedule_at(Event::EndSimulation, 1.0);
        scheduler.schedule_at(Event::Evaluate, 1.0);
        let end = scheduler.advance().unwrap();
        assert_eq!(end.kind(), Event::EndSimulation);
        model.process_event(&end, &mut scheduler, &mut variates).unwrap();
        assert!(model.is_finished());
        let late = scheduler.advance().unwrap();
        assert!(matches!(
            model.process_event(&late, &mut scheduler, &mut variates),
            Err(Error::UnexpectedEvent { .. })
        ));
    }
}
