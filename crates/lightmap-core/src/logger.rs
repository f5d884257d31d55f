//! Stage-aware stderr logger.
//!
//! Prints `[elapsed LEVEL stage] message`, where the stage is the record
//! target without the `lightmap_` crate prefix (`triangulate::engine`).
//! Levels come from a string such as `warn,photo=debug,triangulate::refine=trace`:
//! a bare level sets the default, `stage=level` overrides it for every target
//! under that stage. [`init_from_env`] reads it from `LIGHTMAP_LOG`.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

use crate::CoreError;

/// Environment variable read by [`init_from_env`].
pub const LOG_ENV: &str = "LIGHTMAP_LOG";

const CRATE_PREFIX: &str = "lightmap_";

/// Default level plus per-stage overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct LogSpec {
    pub default: LevelFilter,
    /// `(stage, level)` pairs; the longest matching stage wins.
    pub stages: Vec<(String, LevelFilter)>,
}

impl LogSpec {
    pub fn new(default: LevelFilter) -> Self {
        Self {
            default,
            stages: Vec::new(),
        }
    }

    /// Level that applies to records from `target`.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        let stage = stage_of(target);
        self.stages
            .iter()
            .filter(|(prefix, _)| {
                stage == prefix
                    || stage
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or(self.default, |(_, level)| *level)
    }

    /// Most verbose level any target can reach.
    pub fn max_level(&self) -> LevelFilter {
        self.stages
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

impl FromStr for LogSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = |v: &str| {
            v.trim()
                .parse::<LevelFilter>()
                .map_err(|_| CoreError::InvalidLogSpec(s.to_string()))
        };
        let mut spec = LogSpec::new(LevelFilter::Info);
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((stage, v)) => {
                    let stage = stage.trim();
                    let stage = stage.strip_prefix(CRATE_PREFIX).unwrap_or(stage);
                    spec.stages.push((stage.to_string(), level(v)?));
                }
                None => spec.default = level(part)?,
            }
        }
        Ok(spec)
    }
}

/// Record target without the workspace crate prefix.
fn stage_of(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

fn format_line(elapsed: f64, record: &Record) -> String {
    format!(
        "[{:7.3}s {:>5} {}] {}",
        elapsed,
        record.level(),
        stage_of(record.target()),
        record.args()
    )
}

struct StderrLogger {
    spec: LogSpec,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.spec.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(self.started.elapsed().as_secs_f64(), record);
        let _ = writeln!(std::io::stderr(), "{line}");
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with `spec`.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_spec(spec: LogSpec) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let max = spec.max_level();
        let logger = LOGGER.get_or_init(|| StderrLogger {
            spec,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(max);
    }
    Ok(())
}

/// Install the stderr logger with one level for every stage.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_with_spec(LogSpec::new(level))
}

/// Install the stderr logger from `LIGHTMAP_LOG`, or `info` when unset.
pub fn init_from_env() -> Result<(), CoreError> {
    let spec = match std::env::var(LOG_ENV) {
        Ok(v) => v.parse()?,
        Err(_) => LogSpec::new(LevelFilter::Info),
    };
    Ok(init_with_spec(spec)?)
}

#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let spans = fmt().with_env_filter(filter).with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = spans.json().flatten_event(true).finish().try_init();
    } else {
        let _ = spans
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
