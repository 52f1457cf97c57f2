//! Colorful console output for search metrics.
//!
//! Provides a custom `tracing` layer that formats search events with colors.
//! Auto-initialized by [`run_search`](crate::run_search) when the `console`
//! feature is enabled.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (search start/end, time limit)
//! - **DEBUG**: Progress updates every `progress.interval` combinations

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "armory_search=info";

/// Initializes the search console output.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG`
/// overrides the default `armory_search=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SearchConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let banner = r#"
    _
   / \   _ __ _ __ ___   ___  _ __ _   _
  / _ \ | '__| '_ ` _ \ / _ \| '__| | | |
 / ___ \| |  | | | | | | (_) | |  | |_| |
/_/   \_\_|  |_| |_| |_|\___/|_|   \__, |
                                   |___/
"#;

    let version_line = format!(
        "          v{} - Loadout Search\n",
        env!("CARGO_PKG_VERSION")
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats search events with colors.
pub struct SearchConsoleLayer;

impl<S: Subscriber> Layer<S> for SearchConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();

        // Only handle search events
        if !target.starts_with("armory_search") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_search_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    status: Option<String>,
    search_space: Option<String>,
    abilities: Option<u64>,
    candidates: Option<u64>,
    combinations: Option<u64>,
    matches: Option<u64>,
    duration_ms: Option<u64>,
    speed: Option<u64>,
    limit_ms: Option<u64>,
    truncated: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        match field.name() {
            "event" => self.event = Some(s.trim_matches('"').to_string()),
            "status" => self.status = Some(s.trim_matches('"').to_string()),
            "search_space" => self.search_space = Some(s.trim_matches('"').to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "abilities" => self.abilities = Some(value),
            "candidates" => self.candidates = Some(value),
            "combinations" => self.combinations = Some(value),
            "matches" => self.matches = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "speed" => self.speed = Some(value),
            "limit_ms" => self.limit_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "truncated" {
            self.truncated = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_search_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "search_start" => format_search_start(v),
        "search_progress" => format_search_progress(v),
        "search_end" => format_search_end(v),
        "time_limit_reached" => format_time_limit(v),
        _ => String::new(),
    }
}

fn format_search_start(v: &EventVisitor) -> String {
    let abilities = v.abilities.unwrap_or(0);
    let candidates = v.candidates.unwrap_or(0);
    let space = v.search_space.as_deref().unwrap_or("0");

    format!(
        "{} {} {} {} abilities │ {} candidates │ {} combinations",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Search]".bright_cyan(),
        abilities.to_formatted_string(&Locale::en).bright_yellow(),
        candidates.to_formatted_string(&Locale::en).bright_yellow(),
        format_search_space(space).bright_magenta()
    )
}

fn format_search_progress(v: &EventVisitor) -> String {
    let combinations = v.combinations.unwrap_or(0);
    let matches = v.matches.unwrap_or(0);
    let duration_ms = v.duration_ms.unwrap_or(0);

    format!(
        "    {} {:>14} explored │ {:>8} matches │ {}",
        "->".bright_blue(),
        combinations.to_formatted_string(&Locale::en).white(),
        matches.to_formatted_string(&Locale::en).bright_green(),
        format_duration_ms(duration_ms).yellow()
    )
}

fn format_search_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("UNKNOWN");
    let combinations = v.combinations.unwrap_or(0);
    let matches = v.matches.unwrap_or(0);
    let duration_ms = v.duration_ms.unwrap_or(0);
    let speed = v.speed.unwrap_or(0);

    let mut output = format!(
        "{} {} {} Search ended ({}): time spent ({}), {} combinations ({}/sec), {} matches",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Search]".bright_cyan(),
        status.white().bold(),
        format_duration_ms(duration_ms).yellow(),
        combinations.to_formatted_string(&Locale::en).white(),
        speed.to_formatted_string(&Locale::en).bright_magenta().bold(),
        matches.to_formatted_string(&Locale::en).bright_green()
    );
    if v.truncated == Some(true) {
        output.push_str(&format!(" {}", "(result limit reached)".yellow()));
    }

    let (headline, found) = match (status, matches) {
        ("CANCELLED", _) => ("SEARCH CANCELLED", matches > 0),
        (_, 0) => ("NO MATCHING LOADOUT", false),
        _ => ("MATCHING LOADOUTS FOUND", true),
    };
    output.push_str("\n\n");
    output.push_str(&summary_box(headline, found, matches));
    output
}

fn format_time_limit(v: &EventVisitor) -> String {
    let limit_ms = v.limit_ms.unwrap_or(0);
    format!(
        "{} {} {} time limit ({}) reached, cancelling",
        timestamp().bright_black(),
        "WARN".bright_yellow(),
        "[Search]".bright_cyan(),
        format_duration_ms(limit_ms).yellow()
    )
}

fn summary_box(headline: &str, found: bool, matches: u64) -> String {
    let mut output = String::new();
    output.push_str(&"╔══════════════════════════════════════════════════════════╗".bright_cyan().to_string());
    output.push('\n');

    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(headline.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let colored = if found {
        headline.bright_green().bold().to_string()
    } else {
        headline.bright_red().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(&"╠══════════════════════════════════════════════════════════╣".bright_cyan().to_string());
    output.push('\n');

    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Matches:",
        matches.to_formatted_string(&Locale::en),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(&"╚══════════════════════════════════════════════════════════╝".bright_cyan().to_string());
    output.push('\n');
    output
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
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

/// Groups digits of the search space; values beyond `u128` stay as given.
fn format_search_space(space: &str) -> String {
    match space.parse::<u128>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => space.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(40), "40ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_format_search_space_groups_digits() {
        assert_eq!(format_search_space("972"), "972");
        assert_eq!(format_search_space("4750104241"), "4,750,104,241");
        assert_eq!(format_search_space("n/a"), "n/a");
    }

    #[test]
    fn test_unknown_events_are_silent() {
        let visitor = EventVisitor {
            event: Some("candidates".into()),
            ..EventVisitor::default()
        };
        assert!(format_search_event(&visitor).is_empty());
    }
}
