use log::info;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_millis();
    if time < 1000 {
        info!("Elapsed {} ms", time);
        (" ms ".to_string(), time as f64)
    } else if time < 60_000 {
        info!("Elapsed {} s", elapsed.as_secs());
        (" s".to_string(), elapsed.as_secs() as f64)
    } else if time < 3600_000 {
        info!("Elapsed {} min", elapsed.as_secs() / 60);
        (" min".to_string(), elapsed.as_secs() as f64 / 60.0)
    } else {
        info!("Elapsed {} h", elapsed.as_secs() / 3600);
        (" h".to_string(), elapsed.as_secs() as f64 / 3600.0)
    }
}

/// accumulates the time spent in the parts of a Newton solve
#[derive(Debug, Clone)]
pub struct SolverTimer {
    pub start: Instant,
    pub jac_time: Instant,
    pub jac: Duration,
    pub linear_system_time: Instant,
    pub linear_system: Duration,
}

impl Default for SolverTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverTimer {
    pub fn new() -> SolverTimer {
        SolverTimer {
            start: Instant::now(),
            jac_time: Instant::now(),
            jac: Duration::from_secs(0),
            linear_system_time: Instant::now(),
            linear_system: Duration::from_secs(0),
        }
    }
    pub fn start(&mut self) {
        *self = SolverTimer::new();
    }
    pub fn jac_tic(&mut self) {
        self.jac_time = Instant::now();
    }
    pub fn jac_tac(&mut self) {
        self.jac += self.jac_time.elapsed();
    }
    pub fn linear_system_tic(&mut self) {
        self.linear_system_time = Instant::now();
    }
    pub fn linear_system_tac(&mut self) {
        self.linear_system += self.linear_system_time.elapsed();
    }

    /// share of total wall time per stage, in percent
    pub fn get_all(&self) -> HashMap<String, String> {
        let total = self.start.elapsed();
        let total_ns = total.as_nanos().max(1) as f64;
        let percent = |d: Duration| 100.0 * d.as_nanos() as f64 / total_ns;
        let other = total
            .saturating_sub(self.jac)
            .saturating_sub(self.linear_system);

        let mut timer_data: HashMap<String, String> = HashMap::new();
        timer_data.insert(
            "time elapsed, ms".to_string(),
            format!("{:.3}", total.as_secs_f64() * 1e3),
        );
        timer_data.insert("jacobian time, %".to_string(), format!("{:.2}", percent(self.jac)));
        timer_data.insert(
            "linear system time, %".to_string(),
            format!("{:.2}", percent(self.linear_system)),
        );
        timer_data.insert("other time, %".to_string(), format!("{:.2}", percent(other)));
        for (k, v) in &timer_data {
            info!("{}: {}", k, v);
        }
        timer_data
    }
}
