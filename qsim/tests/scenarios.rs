use std::path::Path;
use std::process::Command;

use desim::{Error, Model, Simulation, VariateGenerator};
use qsim::inventory::Event as InventoryEvent;
use qsim::{
    load, report, run_queue, InventoryParams, InventoryRunner, InventorySystem, Parameters,
    Policy, QueueParams,
};
use quickcheck_macros::quickcheck;
use rstest::{fixture, rstest};

const QUEUE_INPUT: &str = include_str!("../data/mm1.in");
const INVENTORY_INPUT: &str = include_str!("../data/inventory.in");

#[fixture]
fn queue_params() -> QueueParams {
    QueueParams::parse_tokens(QUEUE_INPUT).unwrap()
}

#[fixture]
fn inventory_params() -> InventoryParams {
    InventoryParams::parse_tokens(INVENTORY_INPUT).unwrap()
}

fn inventory_report(params: &InventoryParams, seed: u64) -> eyre::Result<String> {
    let mut output = Vec::new();
    report::write_inventory_header(&mut output, params)?;
    let mut runner = InventoryRunner::new(params.clone(), VariateGenerator::seeded(seed))?;
    runner.run_all(|row| -> eyre::Result<()> {
        report::write_policy_row(&mut output, row)?;
        Ok(())
    })?;
    report::write_inventory_footer(&mut output)?;
    Ok(String::from_utf8(output)?)
}

fn queue_report(params: &QueueParams, seed: u64) -> eyre::Result<String> {
    let mut output = Vec::new();
    report::write_queue_header(&mut output, params)?;
    let summary = run_queue(params, VariateGenerator::seeded(seed), None)?;
    report::write_queue_summary(&mut output, &summary)?;
    Ok(String::from_utf8(output)?)
}

#[rstest]
fn test_queue_observes_exactly_required_delays(queue_params: QueueParams) -> eyre::Result<()> {
    let summary = run_queue(&queue_params, VariateGenerator::seeded(2021), None)?;
    assert_eq!(summary.customers_delayed, 1000);
    assert!(summary.end_time > 0.0);
    assert!(summary.average_delay >= 0.0);
    assert!(summary.average_number_in_queue >= 0.0);
    assert!(summary.server_utilization > 0.0 && summary.server_utilization <= 1.0);
    Ok(())
}

#[rstest]
fn test_reports_are_reproducible(
    queue_params: QueueParams,
    inventory_params: InventoryParams,
) -> eyre::Result<()> {
    assert_eq!(queue_report(&queue_params, 1)?, queue_report(&queue_params, 1)?);
    assert_eq!(
        inventory_report(&inventory_params, 1)?,
        inventory_report(&inventory_params, 1)?
    );
    assert_ne!(
        inventory_report(&inventory_params, 1)?,
        inventory_report(&inventory_params, 2)?
    );
    Ok(())
}

#[rstest]
fn test_inventory_report_lists_every_policy(inventory_params: InventoryParams) -> eyre::Result<()> {
    let report = inventory_report(&inventory_params, 42)?;
    for policy in &inventory_params.policies {
        assert_eq!(report.matches(&format!("{} ", policy)).count(), 1);
    }
    Ok(())
}

#[rstest]
fn test_inventory_order_up_to_level(inventory_params: InventoryParams) -> eyre::Result<()> {
    let demand = inventory_params.demand_distribution()?;
    let model = InventorySystem::new(
        std::rc::Rc::new(inventory_params),
        std::rc::Rc::new(demand),
        Policy::new(20, 80),
    );
    let mut sim = Simulation::new(model, VariateGenerator::seeded(7))?;
    while !sim.model().is_finished() {
        let event = sim.step()?;
        if event.kind() == InventoryEvent::OrderArrival {
            assert!(sim.model().level() <= 80);
        }
    }
    assert_eq!(sim.time(), 120.0);
    Ok(())
}

#[test]
fn test_invalid_mean_fails_before_first_event() {
    let params = QueueParams {
        mean_interarrival: f64::INFINITY,
        mean_service: 0.5,
        num_delays_required: 1,
    };
    assert!(matches!(
        run_queue(&params, VariateGenerator::seeded(0), None),
        Err(Error::Variate(_))
    ));
}

#[quickcheck]
fn queue_terminates_for_any_seed(seed: u64) -> bool {
    let params = QueueParams {
        mean_interarrival: 1.0,
        mean_service: 0.9,
        num_delays_required: 50,
    };
    match run_queue(&params, VariateGenerator::seeded(seed), None) {
        Ok(summary) => {
            summary.customers_delayed == 50
                && (0.0..=1.0).contains(&summary.server_utilization)
        }
        Err(_) => false,
    }
}

fn run_binary(name: &str, dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(name)
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_mm1_binary() -> eyre::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("in.txt"), QUEUE_INPUT)?;
    let output = run_binary(
        env!("CARGO_BIN_EXE_mm1"),
        dir.path(),
        &["--trace", "trace.txt", "--no-stderr"],
    );
    assert!(output.status.success());
    let report = std::fs::read_to_string(dir.path().join("out.txt"))?;
    assert!(report.starts_with("Single-server queueing system\n"));
    assert!(report.contains("Average delay in queue:"));
    let trace = std::fs::read_to_string(dir.path().join("trace.txt"))?;
    assert!(trace.starts_with("1. Next event: Customer 1 Arrival\n"));
    assert!(trace.contains("---------No. of customers delayed: 1000--------"));
    Ok(())
}

#[test]
fn test_invsim_binary() -> eyre::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let params: InventoryParams = InventoryParams::parse_tokens(INVENTORY_INPUT)?;
    std::fs::write(dir.path().join("params.json"), serde_json::to_string(&params)?)?;
    let output = run_binary(
        env!("CARGO_BIN_EXE_invsim"),
        dir.path(),
        &["-i", "params.json", "-o", "costs.txt", "--seed", "3"],
    );
    assert!(output.status.success());
    let report = std::fs::read_to_string(dir.path().join("costs.txt"))?;
    let params: InventoryParams = load(&dir.path().join("params.json"))?;
    assert_eq!(report, inventory_report(&params, 3)?);
    Ok(())
}

#[test]
fn test_binary_fails_on_invalid_input() -> eyre::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("in.txt"), "1.0 -0.5 1000")?;
    let output = run_binary(env!("CARGO_BIN_EXE_mm1"), dir.path(), &["--no-stderr"]);
    assert!(!output.status.success());
    let output = run_binary(env!("CARGO_BIN_EXE_invsim"), dir.path(), &["-i", "missing.txt"]);
    assert!(!output.status.success());
    Ok(())
}
