//! Plain text reports of both models.

use std::io::{self, Write};

use itertools::Itertools;

use crate::{InventoryParams, PolicyReport, QueueParams, QueueSummary};

const LABEL_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 10;
const COST_WIDTH: usize = 20;
const RULE_WIDTH: usize = 98;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn queue_line<W: Write>(
    writer: &mut W,
    label: &str,
    value: impl std::fmt::Display,
    unit: &str,
) -> io::Result<()> {
    writeln!(
        writer,
        "{:<lw$}{:>vw$}{}",
        label,
        value.to_string(),
        unit,
        lw = LABEL_WIDTH,
        vw = VALUE_WIDTH
    )
}

/// Writes the heading and echoes the queue parameters.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_queue_header<W: Write>(writer: &mut W, params: &QueueParams) -> io::Result<()> {
    writeln!(writer, "Single-server queueing system\n")?;
    queue_line(
        writer,
        "Mean interarrival time:",
        format!("{:.6}", params.mean_interarrival),
        " minutes",
    )?;
    queue_line(
        writer,
        "Mean service time:",
        format!("{:.6}", params.mean_service),
        " minutes",
    )?;
    queue_line(writer, "Number of customers:", params.num_delays_required, "")
}

/// Writes the measures of performance of a finished run.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_queue_summary<W: Write>(writer: &mut W, summary: &QueueSummary) -> io::Result<()> {
    writeln!(writer, "\n")?;
    queue_line(
        writer,
        "Average delay in queue:",
        format!("{:.6}", summary.average_delay),
        " minutes",
    )?;
    queue_line(
        writer,
        "Average number in queue:",
        format!("{:.6}", summary.average_number_in_queue),
        "",
    )?;
    queue_line(
        writer,
        "Server utilization:",
        format!("{:.6}", summary.server_utilization),
        "",
    )?;
    queue_line(
        writer,
        "Time simulation ended:",
        format!("{:.6}", summary.end_time),
        " minutes",
    )
}

/// Writes the heading, the echoed inventory parameters, and the head of the cost table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_inventory_header<W: Write>(writer: &mut W, params: &InventoryParams) -> io::Result<()> {
    writeln!(writer, "------Single-Product Inventory System------\n")?;
    writeln!(
        writer,
        "Initial inventory level: {} items\n",
        params.initial_inv_level
    )?;
    writeln!(
        writer,
        "Number of demand sizes: {}\n",
        params.demand_cumulative.len()
    )?;
    writeln!(
        writer,
        "Distribution function of demand sizes: {}\n",
        params
            .demand_cumulative
            .iter()
            .map(|p| format!("{:.2}", p))
            .format(" ")
    )?;
    writeln!(
        writer,
        "Mean inter-demand time: {:.2} months\n",
        params.mean_interdemand
    )?;
    writeln!(
        writer,
        "Delivery lag range: {:.2} to {:.2} months\n",
        params.minlag, params.maxlag
    )?;
    writeln!(writer, "Length of simulation: {} months\n", params.num_months)?;
    writeln!(writer, "Costs:")?;
    writeln!(writer, "K = {:.2}", params.setup_cost)?;
    writeln!(writer, "i = {:.2}", params.incremental_cost)?;
    writeln!(writer, "h = {:.2}", params.holding_cost)?;
    writeln!(writer, "pi = {:.2}\n", params.shortage_cost)?;
    writeln!(writer, "Number of policies: {}\n", params.policies.len())?;
    writeln!(writer, "Policies:")?;
    writeln!(writer, "{}", rule())?;
    writeln!(
        writer,
        " Policy{:>cost$}{:>cost$}{:>cost$}{:>cost$}",
        "Avg_total_cost",
        "Avg_ordering_cost",
        "Avg_holding_cost",
        "Avg_shortage_cost",
        cost = COST_WIDTH + 2
    )?;
    writeln!(writer, "{}\n", rule())
}

/// Writes one row of the cost table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_policy_row<W: Write>(writer: &mut W, report: &PolicyReport) -> io::Result<()> {
    writeln!(
        writer,
        "{}{:>cost$.2}{:>cost$.2}{:>cost$.2}{:>cost$.2}\n",
        report.policy,
        report.average_total_cost,
        report.average_ordering_cost,
        report.average_holding_cost,
        report.average_shortage_cost,
        cost = COST_WIDTH
    )
}

/// Closes the cost table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_inventory_footer<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", rule())
}
