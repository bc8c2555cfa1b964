//! Console display logic for dns-check CLI.
//!
//! Everything here goes to stderr so that stdout can carry the result
//! list untouched.

use console::{style, Term};
use dns_check_lib::CandidateSource;
use std::time::Duration;

/// Print the run header.
pub fn print_header(total: usize, concurrency: usize, hostname: &str, source: &CandidateSource) {
    let term = Term::stderr();
    let _ = term.write_line(&format!(
        "{} Probing {} resolvers from {} (concurrency {}, resolving {})",
        style("→").cyan().bold(),
        style(total).bold(),
        source,
        concurrency,
        style(hostname).green(),
    ));
}

/// Print the end-of-run summary.
pub fn print_summary(total: usize, usable: usize, target: &str, duration: Duration) {
    let term = Term::stderr();
    let failed = total.saturating_sub(usable);
    let _ = term.write_line(&format!(
        "{} {} usable, {} failed of {} probed in {}; results written to {}",
        style("✓").green().bold(),
        style(usable).green().bold(),
        style(failed).red(),
        total,
        format_duration(duration),
        target,
    ));
}

/// Print a warning line.
pub fn print_warning(message: &str) {
    let _ = Term::stderr().write_line(&format!("{} {}", style("!").yellow().bold(), message));
}

/// Format a duration as `850ms` or `4.2s`.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(4200)), "4.2s");
        assert_eq!(format_duration(Duration::from_secs(60)), "60.0s");
    }
}
