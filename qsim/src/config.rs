//! Simulation parameters and their input formats.
//!
//! Parameters are read either from a plain text file of whitespace-separated values, in the
//! order documented on each parameter type, or from JSON if the file name ends with `.json`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use desim::{CumulativeDistribution, VariateError};
use eyre::WrapErr;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors raised while parsing or validating parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input ended before the value was read.
    #[error("missing value for `{0}`")]
    Missing(&'static str),
    /// The token could not be parsed.
    #[error("invalid value `{value}` for `{name}`")]
    Parse {
        /// Parameter name.
        name: &'static str,
        /// Offending token.
        value: String,
    },
    /// The value was parsed but is not acceptable.
    #[error("invalid parameter `{name}`: {reason}")]
    Invalid {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Demand distribution is malformed.
    #[error("invalid demand distribution: {0}")]
    Distribution(#[from] VariateError),
    /// JSON input could not be parsed.
    #[error("unable to parse parameters in JSON format: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid<T: fmt::Display>(name: &'static str, reason: T) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, format!("must be positive, got {}", value)))
    }
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, format!("must be non-negative, got {}", value)))
    }
}

/// Whitespace-separated token stream.
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    fn next<T: FromStr>(&mut self, name: &'static str) -> Result<T, ConfigError> {
        let token = self.inner.next().ok_or(ConfigError::Missing(name))?;
        token.parse().map_err(|_| ConfigError::Parse {
            name,
            value: token.to_string(),
        })
    }
}

/// Implemented by parameter sets that can be loaded with [`load`].
pub trait Parameters: Sized + DeserializeOwned {
    /// Parses the plain text format.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is missing or cannot be parsed.
    fn parse_tokens(input: &str) -> Result<Self, ConfigError>;

    /// Checks that the values describe a model that can run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first offending parameter.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Loads and validates parameters from the file at `path`.
///
/// If the file's extension is `.json`, it is parsed as JSON. Otherwise, it is treated as a plain
/// text file of whitespace-separated values.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load<P: Parameters>(path: &Path) -> eyre::Result<P> {
    let input = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("unable to read input file: {}", path.display()))?;
    let params = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&input).map_err(ConfigError::from)
    } else {
        P::parse_tokens(&input)
    }
    .wrap_err_with(|| format!("unable to parse input file: {}", path.display()))?;
    params
        .validate()
        .wrap_err_with(|| format!("invalid parameters in {}", path.display()))?;
    Ok(params)
}

/// Parameters of the single-server queue.
///
/// Plain text order: `mean_interarrival mean_service num_delays_required`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueParams {
    /// Mean time between customer arrivals, in minutes.
    pub mean_interarrival: f64,
    /// Mean service time, in minutes.
    pub mean_service: f64,
    /// The simulation ends once this many customers have started service.
    pub num_delays_required: usize,
}

impl Parameters for QueueParams {
    fn parse_tokens(input: &str) -> Result<Self, ConfigError> {
        let mut tokens = Tokens::new(input);
        Ok(Self {
            mean_interarrival: tokens.next("mean_interarrival")?,
            mean_service: tokens.next("mean_service")?,
            num_delays_required: tokens.next("num_delays_required")?,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("mean_interarrival", self.mean_interarrival)?;
        ensure_positive("mean_service", self.mean_service)?;
        if self.num_delays_required == 0 {
            return Err(invalid("num_delays_required", "must be at least 1"));
        }
        Ok(())
    }
}

/// Inventory policy: order up to `big` whenever the level drops below `small`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[display(fmt = "({}, {})", small, big)]
pub struct Policy {
    /// Reorder point `s`.
    pub small: i64,
    /// Order-up-to level `S`.
    pub big: i64,
}

impl Policy {
    /// Constructs a policy.
    #[must_use]
    pub fn new(small: i64, big: i64) -> Self {
        Self { small, big }
    }
}

/// Parameters of the inventory system.
///
/// Plain text order:
///
/// ```text
/// initial_inv_level num_months num_policies num_values_demand
/// mean_interdemand setup_cost incremental_cost holding_cost shortage_cost minlag maxlag
/// <num_values_demand cumulative probabilities>
/// <num_policies pairs of s S>
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryParams {
    /// Inventory level at the start of every policy run.
    pub initial_inv_level: i64,
    /// Length of each policy run, in months.
    pub num_months: u32,
    /// Mean time between demands, in months.
    pub mean_interdemand: f64,
    /// Fixed cost `K` of placing an order.
    pub setup_cost: f64,
    /// Cost `i` per ordered item.
    pub incremental_cost: f64,
    /// Holding cost `h` per item per month.
    pub holding_cost: f64,
    /// Shortage cost `pi` per backlogged item per month.
    pub shortage_cost: f64,
    /// Minimum delivery lag, in months.
    pub minlag: f64,
    /// Maximum delivery lag, in months.
    pub maxlag: f64,
    /// Cumulative probabilities of demand sizes `1..=len`.
    pub demand_cumulative: Vec<f64>,
    /// Policies to evaluate, one run each.
    pub policies: Vec<Policy>,
}

impl InventoryParams {
    /// Builds the demand size distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the cumulative probabilities do not form a distribution.
    pub fn demand_distribution(&self) -> Result<CumulativeDistribution, VariateError> {
        CumulativeDistribution::new(self.demand_cumulative.clone())
    }
}

impl Parameters for InventoryParams {
    fn parse_tokens(input: &str) -> Result<Self, ConfigError> {
        let mut tokens = Tokens::new(input);
        let initial_inv_level = tokens.next("initial_inv_level")?;
        let num_months = tokens.next("num_months")?;
        let num_policies: usize = tokens.next("num_policies")?;
        let num_values_demand: usize = tokens.next("num_values_demand")?;
        let mean_interdemand = tokens.next("mean_interdemand")?;
        let setup_cost = tokens.next("setup_cost")?;
        let incremental_cost = tokens.next("incremental_cost")?;
        let holding_cost = tokens.next("holding_cost")?;
        let shortage_cost = tokens.next("shortage_cost")?;
        let minlag = tokens.next("minlag")?;
        let maxlag = tokens.next("maxlag")?;
        let demand_cumulative: Vec<f64> = (0..num_values_demand)
            .map(|_| tokens.next::<f64>("demand_cumulative"))
            .collect::<Result<_, ConfigError>>()?;
        let policies: Vec<Policy> = (0..num_policies)
            .map(|_| -> Result<Policy, ConfigError> {
                Ok(Policy::new(tokens.next("small")?, tokens.next("big")?))
            })
            .collect::<Result<_, ConfigError>>()?;
        Ok(Self {
            initial_inv_level,
            num_months,
            mean_interdemand,
            setup_cost,
            incremental_cost,
            holding_cost,
            shortage_cost,
            minlag,
            maxlag,
            demand_cumulative,
            policies,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_months == 0 {
            return Err(invalid("num_months", "must be at least 1"));
        }
        ensure_positive("mean_interdemand", self.mean_interdemand)?;
        ensure_non_negative("setup_cost", self.setup_cost)?;
        ensure_non_negative("incremental_cost", self.incremental_cost)?;
        ensure_non_negative("holding_cost", self.holding_cost)?;
        ensure_non_negative("shortage_cost", self.shortage_cost)?;
        ensure_non_negative("minlag", self.minlag)?;
        ensure_non_negative("maxlag", self.maxlag)?;
        if self.minlag > self.maxlag {
            return Err(invalid(
                "maxlag",
                format!("must not be less than minlag ({})", self.minlag),
            ));
        }
        self.demand_distribution()?;
        if self.policies.is_empty() {
            return Err(invalid("policies", "at least one policy is required"));
        }
        if let Some(policy) = self.policies.iter().find(|p| p.small > p.big) {
            return Err(invalid("policies", format!("s > S in policy {}", policy)));
        }
        Ok(())
    }
}
