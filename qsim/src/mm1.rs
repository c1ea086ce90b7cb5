//! Single-server queueing simulation.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;

use desim::VariateGenerator;
use qsim::{load, report, run_queue, set_up_logger, QueueParams};

/// Runs a single-server queue until the requested number of customers have been delayed.
#[derive(Parser)]
#[clap(version, author)]
struct Opt {
    /// Input file with the mean interarrival time, mean service time, and number of customers.
    /// JSON is accepted if the extension is `.json`.
    #[clap(short, long, default_value = "in.txt")]
    input: PathBuf,

    /// Report file.
    #[clap(short, long, default_value = "out.txt")]
    output: PathBuf,

    /// Event trace file.
    #[clap(long)]
    trace: Option<PathBuf>,

    /// Seed of the random stream.
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Verbosity.
    #[clap(short, long, parse(from_occurrences))]
    verbose: u64,

    /// Store the logs this file.
    #[clap(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[clap(long)]
    no_stderr: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();
    set_up_logger(opt.verbose, opt.log_output.as_deref(), opt.no_stderr)?;

    let params: QueueParams = load(&opt.input)?;
    let mut output = BufWriter::new(
        File::create(&opt.output)
            .wrap_err_with(|| format!("unable to create report file {}", opt.output.display()))?,
    );
    let trace: Option<Box<dyn Write>> = match &opt.trace {
        Some(path) => Some(Box::new(BufWriter::new(
            File::create(path)
                .wrap_err_with(|| format!("unable to create trace file {}", path.display()))?,
        ))),
        None => None,
    };

    report::write_queue_header(&mut output, &params)?;
    let summary = run_queue(&params, VariateGenerator::seeded(opt.seed), trace)
        .wrap_err("queueing simulation failed")?;
    report::write_queue_summary(&mut output, &summary)?;
    output.flush().wrap_err("unable to write report")?;
    log::info!(
        "Average delay {:.4} over {} customers, report written to {}",
        summary.average_delay,
        summary.customers_delayed,
        opt.output.display()
    );
    Ok(())
}
