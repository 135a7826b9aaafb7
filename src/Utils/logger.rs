//! logger set up for solver runs: terminal output and, optionally, a time-stamped log file
use chrono::Local;
use simplelog::*;
use std::fs::File;

/// map a loglevel name to a filter; `None` means logging is switched off
pub fn level_filter(loglevel: &str) -> Option<LevelFilter> {
    match loglevel.to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        _ => None,
    }
}

pub fn is_valid_loglevel(loglevel: &str) -> bool {
    matches!(
        loglevel.to_lowercase().as_str(),
        "debug" | "info" | "warn" | "error" | "off" | "none"
    )
}

/// Installs the global logger. Returns false when logging is off or a logger is already installed
/// (the usual case for the second solve in one process); the solve goes on either way.
pub fn init_logger(loglevel: &str, log_to_file: bool) -> bool {
    let Some(log_option) = level_filter(loglevel) else {
        return false;
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        match File::create(&name) {
            Ok(file) => loggers.push(WriteLogger::new(log_option, Config::default(), file)),
            Err(e) => eprintln!("could not create log file {}: {}", name, e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}
