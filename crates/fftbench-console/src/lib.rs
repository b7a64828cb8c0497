//! Colorful console output for harness events.
//!
//! Provides a custom `tracing` layer that formats sweep events with colors.
//! Everything goes to stderr; stdout carries only the result table.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (sweep/size start and end, wisdom I/O)
//! - **DEBUG**: Buffer and plan setup, plan strategy, every repetition
//! - **WARN**: Non-fatal failures such as unreadable wisdom

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SWEEP_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Initializes console logging.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG`
/// takes precedence; otherwise harness events are shown at `info`, or at
/// `debug` when `verbose` is set.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        let mut filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();

        if std::env::var_os("RUST_LOG").is_none() {
            let level = if verbose { "debug" } else { "info" };
            if let Ok(directive) = format!("fftbench={}", level).parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(HarnessConsoleLayer)
            .try_init();
    });
}

// Marks the start of the sweep for elapsed time tracking.
fn mark_sweep_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SWEEP_START_NANOS.store(nanos, Ordering::Relaxed);
}

// Returns elapsed time since sweep start.
fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SWEEP_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

/// A tracing layer that formats harness events with colors.
pub struct HarnessConsoleLayer;

impl<S: Subscriber> Layer<S> for HarnessConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("fftbench") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    domain: Option<String>,
    precision: Option<String>,
    engine: Option<String>,
    effort: Option<String>,
    strategy: Option<String>,
    source: Option<String>,
    path: Option<String>,
    error: Option<String>,
    threads: Option<u64>,
    min_size: Option<u64>,
    max_size: Option<u64>,
    loops: Option<u64>,
    rows: Option<u64>,
    cols: Option<u64>,
    repetition: Option<u64>,
    repetitions: Option<u64>,
    bytes: Option<u64>,
    sizes: Option<u64>,
    lines: Option<u64>,
    duration_ms: Option<u64>,
    elapsed: Option<f64>,
    rate: Option<f64>,
    aliased: Option<bool>,
    inverse: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value).trim_matches('"').to_string();
        self.record_text(field, s);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "threads" => self.threads = Some(value),
            "min_size" => self.min_size = Some(value),
            "max_size" => self.max_size = Some(value),
            "loops" => self.loops = Some(value),
            "rows" => self.rows = Some(value),
            "cols" => self.cols = Some(value),
            "repetition" => self.repetition = Some(value),
            "repetitions" => self.repetitions = Some(value),
            "bytes" => self.bytes = Some(value),
            "sizes" => self.sizes = Some(value),
            "lines" => self.lines = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "elapsed" => self.elapsed = Some(value),
            "rate" => self.rate = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "aliased" => self.aliased = Some(value),
            "inverse" => self.inverse = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }
}

impl EventVisitor {
    fn record_text(&mut self, field: &Field, value: String) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "message" => &mut self.message,
            "domain" => &mut self.domain,
            "precision" => &mut self.precision,
            "engine" => &mut self.engine,
            "effort" => &mut self.effort,
            "strategy" => &mut self.strategy,
            "source" => &mut self.source,
            "path" => &mut self.path,
            "error" => &mut self.error,
            _ => return,
        };
        *slot = Some(value);
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "sweep_start" => format_sweep_start(v),
        "sweep_end" => format_sweep_end(v),
        "size_start" => format_size_start(v),
        "setup_buffers" => format_setup_buffers(v),
        "setup_plan" => format_setup_plan(v),
        "plan_strategy" => format_plan_strategy(v),
        "repetition" => format_repetition(v),
        "wisdom_loaded" | "wisdom_saved" => format_wisdom(v, event),
        "report_written" => format_report(v),
        _ if level == Level::WARN || level == Level::ERROR => format_warning(v, event),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_shape(v: &EventVisitor) -> String {
    format!(
        "{} x {}",
        v.rows.unwrap_or(0).to_formatted_string(&Locale::en),
        v.cols.unwrap_or(0).to_formatted_string(&Locale::en)
    )
}

fn format_sweep_start(v: &EventVisitor) -> String {
    mark_sweep_start();
    format!(
        "{} {} Sweep │ {} │ {} │ {} │ {} threads │ {}..{} │ {} loops",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.domain.as_deref().unwrap_or("?").white().bold(),
        v.precision.as_deref().unwrap_or("?").white(),
        v.engine.as_deref().unwrap_or("?").bright_cyan(),
        v.threads.unwrap_or(1).to_formatted_string(&Locale::en).bright_yellow(),
        v.min_size.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.max_size.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
        v.loops.unwrap_or(0).to_formatted_string(&Locale::en).bright_yellow(),
    )
}

fn format_sweep_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Sweep complete │ {} sizes │ {} lines │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        v.sizes.unwrap_or(0).to_formatted_string(&Locale::en).white(),
        v.lines.unwrap_or(0).to_formatted_string(&Locale::en).white(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_size_start(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ {} repetitions",
        format_elapsed(),
        "▶".bright_blue(),
        format_shape(v).white().bold(),
        v.repetitions.unwrap_or(0).to_formatted_string(&Locale::en),
    )
}

fn format_setup_buffers(v: &EventVisitor) -> String {
    let aliasing = if v.aliased.unwrap_or(false) {
        "aliased"
    } else {
        "separate"
    };
    format!(
        "{} {} {} │ {} bytes │ {}",
        format_elapsed(),
        "·".bright_black(),
        format_shape(v).bright_black(),
        v.bytes.unwrap_or(0).to_formatted_string(&Locale::en).bright_magenta(),
        aliasing.bright_black(),
    )
}

fn format_setup_plan(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ plans built │ {}",
        format_elapsed(),
        "·".bright_black(),
        format_shape(v).bright_black(),
        v.effort.as_deref().unwrap_or("?").bright_black(),
    )
}

fn format_plan_strategy(v: &EventVisitor) -> String {
    format!(
        "{} {} column strategy {} ({})",
        format_elapsed(),
        "·".bright_black(),
        v.strategy.as_deref().unwrap_or("?").bright_magenta(),
        v.source.as_deref().unwrap_or("?").bright_black(),
    )
}

fn format_repetition(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ rep {}/{} │ {:.6}s │ {} CTGs",
        format_elapsed(),
        "⚡".bright_cyan(),
        format_shape(v).white(),
        v.repetition.unwrap_or(0),
        v.repetitions.unwrap_or(0),
        v.elapsed.unwrap_or(0.0),
        format!("{:.3}", v.rate.unwrap_or(0.0)).bright_magenta().bold(),
    )
}

fn format_wisdom(v: &EventVisitor, event: &str) -> String {
    let verb = if event == "wisdom_loaded" {
        "Loaded"
    } else {
        "Saved"
    };
    format!(
        "{} {} {} wisdom │ {} │ {} bytes",
        format_elapsed(),
        "◆".bright_green(),
        verb,
        v.path.as_deref().unwrap_or("?").white(),
        v.bytes.unwrap_or(0).to_formatted_string(&Locale::en),
    )
}

fn format_report(v: &EventVisitor) -> String {
    format!(
        "{} {} Wrote {}",
        format_elapsed(),
        "◆".bright_green(),
        v.path.as_deref().unwrap_or("?").white(),
    )
}

fn format_warning(v: &EventVisitor, event: &str) -> String {
    let mut output = format!("{} {} ", format_elapsed(), "!".bright_yellow().bold());
    let text = v.message.as_deref().unwrap_or(event);
    output.push_str(&text.yellow().to_string());
    if let Some(path) = &v.path {
        output.push_str(&format!(" │ {}", path));
    }
    if let Some(error) = &v.error {
        output.push_str(&format!(" │ {}", error.bright_red()));
    }
    output
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_info_event_is_silent() {
        let v = EventVisitor {
            event: Some("something_else".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&v, Level::INFO).is_empty());
        assert!(!format_event(&v, Level::WARN).is_empty());
    }

    #[test]
    fn test_size_start_mentions_shape() {
        let v = EventVisitor {
            event: Some("size_start".to_string()),
            rows: Some(1024),
            cols: Some(2048),
            repetitions: Some(5),
            ..EventVisitor::default()
        };
        let line = format_event(&v, Level::INFO);
        assert!(line.contains("1,024 x 2,048"));
        assert!(line.contains("5 repetitions"));
    }

    #[test]
    fn test_warning_carries_error() {
        let v = EventVisitor {
            event: Some("wisdom_save_failed".to_string()),
            error: Some("read-only file system".to_string()),
            ..EventVisitor::default()
        };
        let line = format_event(&v, Level::WARN);
        assert!(line.contains("wisdom_save_failed"));
        assert!(line.contains("read-only file system"));
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
