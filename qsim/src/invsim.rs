//! Single-product inventory simulation comparing `(s, S)` policies.
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
use indicatif::{ProgressBar, ProgressStyle};

use desim::VariateGenerator;
use qsim::{load, report, set_up_logger, InventoryParams, InventoryRunner};

/// Simulates the inventory system once per policy and tabulates average monthly costs.
#[derive(Parser)]
#[clap(version, author)]
struct Opt {
    /// Input file with the system parameters, demand distribution, and policies.
    /// JSON is accepted if the extension is `.json`.
    #[clap(short, long, default_value = "in.txt")]
    input: PathBuf,

    /// Report file.
    #[clap(short, long, default_value = "out.txt")]
    output: PathBuf,

    /// Seed of the random stream shared by all policies.
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Show a progress bar over the policies.
    #[clap(long)]
    progress: bool,

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

fn progress_bar(enabled: bool, len: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    ProgressBar::new(len as u64)
        .with_style(ProgressStyle::default_bar().template("{msg} {wide_bar} {pos}/{len}"))
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();
    set_up_logger(opt.verbose, opt.log_output.as_deref(), opt.no_stderr)?;

    let params: InventoryParams = load(&opt.input)?;
    let mut output = BufWriter::new(
        File::create(&opt.output)
            .wrap_err_with(|| format!("unable to create report file {}", opt.output.display()))?,
    );
    report::write_inventory_header(&mut output, &params)?;

    let pb = progress_bar(opt.progress, params.policies.len());
    let mut runner = InventoryRunner::new(params, VariateGenerator::seeded(opt.seed))?;
    runner.run_all(|row| -> eyre::Result<()> {
        report::write_policy_row(&mut output, row).wrap_err("unable to write report")?;
        pb.set_message(&format!("{}", row.policy));
        pb.inc(1);
        Ok(())
    })?;
    pb.finish();

    report::write_inventory_footer(&mut output)?;
    output.flush().wrap_err("unable to write report")?;
    log::info!("Report written to {}", opt.output.display());
    Ok(())
}
