use crate::Utils::logger::is_valid_loglevel;
use crate::Utils::task_parser::{Value, parse_document};
use crate::numerical::newton_errors::NewtonError;
use crate::somelinalg::dense_solvers::LinearSolverStrategy;
use std::path::Path;
use std::str::FromStr;

/// Tunables of the Newton-Raphson driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// stop when ||F(x)|| <= tolerance
    pub tolerance: f64,
    pub max_iterations: usize,
    pub linear_solver: LinearSolverStrategy,
    /// relative size of a triangular-factor diagonal entry below which J counts as rank deficient
    pub rank_threshold: f64,
    /// debug, info, warn, error, off/none
    pub loglevel: Option<String>,
    pub log_to_file: bool,
    /// warn when the condition number of J exceeds this value
    pub condition_warning: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            tolerance: 1e-9,
            max_iterations: 100,
            linear_solver: LinearSolverStrategy::QR,
            rank_threshold: 1e-12,
            loglevel: Some("info".to_string()),
            log_to_file: false,
            condition_warning: None,
        }
    }
}

impl SolverConfig {
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<SolverConfig, NewtonError> {
        SolverConfig::default()
            .with_tolerance(tolerance)?
            .with_max_iterations(max_iterations)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, NewtonError> {
        if !(tolerance >= 0.0) {
            return Err(NewtonError::InvalidConfig(
                "tolerance should be a non-negative number".to_string(),
            ));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Result<Self, NewtonError> {
        if max_iterations == 0 {
            return Err(NewtonError::InvalidConfig(
                "max_iterations should be a positive number".to_string(),
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    pub fn with_linear_solver(mut self, linear_solver: LinearSolverStrategy) -> Self {
        self.linear_solver = linear_solver;
        self
    }

    pub fn with_rank_threshold(mut self, rank_threshold: f64) -> Result<Self, NewtonError> {
        if !(rank_threshold > 0.0 && rank_threshold < 1.0) {
            return Err(NewtonError::InvalidConfig(
                "rank_threshold should be between 0.0 and 1.0".to_string(),
            ));
        }
        self.rank_threshold = rank_threshold;
        Ok(self)
    }

    pub fn with_loglevel(mut self, loglevel: Option<&str>) -> Result<Self, NewtonError> {
        if let Some(level) = loglevel {
            if !is_valid_loglevel(level) {
                return Err(NewtonError::InvalidConfig(format!(
                    "loglevel must be debug, info, warn, error, off or none, got {}",
                    level
                )));
            }
        }
        self.loglevel = loglevel.map(|l| l.to_lowercase());
        Ok(self)
    }

    pub fn with_log_to_file(mut self, log_to_file: bool) -> Self {
        self.log_to_file = log_to_file;
        self
    }

    pub fn with_condition_warning(mut self, threshold: Option<f64>) -> Self {
        self.condition_warning = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), NewtonError> {
        self.clone()
            .with_tolerance(self.tolerance)?
            .with_max_iterations(self.max_iterations)?
            .with_rank_threshold(self.rank_threshold)?
            .with_loglevel(self.loglevel.as_deref())?;
        Ok(())
    }

    pub fn logging_enabled(&self) -> bool {
        self.loglevel
            .as_deref()
            .map(|level| level != "off" && level != "none")
            .unwrap_or(false)
    }

    /// Settings from a task document, see `Utils::task_parser`. Keys not present keep their
    /// default values.
    ///
    /// ```
    /// use RustedNewtonAD::numerical::solver_config::SolverConfig;
    /// use RustedNewtonAD::somelinalg::dense_solvers::LinearSolverStrategy;
    /// let config = SolverConfig::from_document("tolerance: 1e-12\nlinear_solver: lu").unwrap();
    /// assert_eq!(config.tolerance, 1e-12);
    /// assert_eq!(config.linear_solver, LinearSolverStrategy::LU);
    /// assert_eq!(config.max_iterations, 100);
    /// ```
    pub fn from_document(document: &str) -> Result<SolverConfig, NewtonError> {
        let parsed = parse_document(document).map_err(NewtonError::InvalidConfig)?;
        let mut config = SolverConfig::default();
        for (key, value) in parsed {
            config = match key.as_str() {
                "tolerance" => config.with_tolerance(expect_float(&key, &value)?)?,
                "max_iterations" => {
                    let n = value
                        .as_integer()
                        .filter(|n| *n >= 0)
                        .ok_or_else(|| wrong_type(&key, &value, "a non-negative integer"))?;
                    config.with_max_iterations(n as usize)?
                }
                "linear_solver" => {
                    let name = value
                        .as_string()
                        .ok_or_else(|| wrong_type(&key, &value, "qr or lu"))?;
                    let strategy = LinearSolverStrategy::from_str(name)
                        .map_err(|_| wrong_type(&key, &value, "qr or lu"))?;
                    config.with_linear_solver(strategy)
                }
                "rank_threshold" => config.with_rank_threshold(expect_float(&key, &value)?)?,
                "loglevel" => {
                    let level = value.to_string();
                    config.with_loglevel(Some(level.as_str()))?
                }
                "log_to_file" => {
                    let flag = value
                        .as_boolean()
                        .ok_or_else(|| wrong_type(&key, &value, "true or false"))?;
                    config.with_log_to_file(flag)
                }
                "condition_warning" => {
                    config.with_condition_warning(Some(expect_float(&key, &value)?))
                }
                _ => {
                    return Err(NewtonError::InvalidConfig(format!("unknown key {}", key)));
                }
            };
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SolverConfig, NewtonError> {
        let document = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NewtonError::InvalidConfig(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        SolverConfig::from_document(&document)
    }
}

fn expect_float(key: &str, value: &Value) -> Result<f64, NewtonError> {
    value
        .as_float()
        .ok_or_else(|| wrong_type(key, value, "a number"))
}

fn wrong_type(key: &str, value: &Value, expected: &str) -> NewtonError {
    NewtonError::InvalidConfig(format!("{}: expected {}, got {}", key, expected, value))
}
