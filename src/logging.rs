//! Minimal stderr backend for the `log` facade.
//!
//! stdout carries the JSON document, so every log line goes to stderr.

use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Level from a config string, falling back to `warn` for unknown names
pub fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Warn)
}

/// Each `-v` raises the base level by one step, up to `trace`
pub fn level_for(base: LevelFilter, verbosity: u8) -> LevelFilter {
    const STEPS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let start = STEPS.iter().position(|&l| l == base).unwrap_or(2);
    STEPS[(start + verbosity as usize).min(STEPS.len() - 1)]
}

/// Install the stderr logger; a second call only updates the level
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}
