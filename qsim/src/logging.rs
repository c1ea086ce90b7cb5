use std::path::Path;

/// Maps the number of `-v` flags to a level filter; warnings are always shown.
fn level_filter(verbose: u64) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Installs the global logger, writing to `log_output` (truncated first) and, unless
/// `no_stderr` is set, to the standard error.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a logger is already installed.
pub fn set_up_logger(
    verbose: u64,
    log_output: Option<&Path>,
    no_stderr: bool,
) -> Result<(), fern::InitError> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level_filter(verbose));
    let dispatch = if let Some(path) = log_output {
        dispatch.chain(
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        )
    } else {
        dispatch
    };
    let dispatch = if no_stderr {
        dispatch
    } else {
        dispatch.chain(std::io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}
