use crate::domain::model::{BatchResult, LookupOutcome, LookupStatus};

const HEADER: &str = "List of Numbers Checked:";

/// Renders one line per outcome followed by the count block. The `Errors`
/// line only appears when at least one lookup failed.
pub fn format(result: &BatchResult) -> String {
    let mut report = String::from(HEADER);
    report.push('\n');

    for outcome in result.outcomes() {
        report.push_str(&status_line(outcome));
        report.push('\n');
    }

    report.push_str("\nSummary:\n");
    report.push_str(&format!("Registered: {}\n", result.registered_count()));
    report.push_str(&format!("Not Registered: {}", result.not_registered_count()));
    if result.error_count() > 0 {
        report.push_str(&format!("\nErrors: {}", result.error_count()));
    }

    report
}

pub fn status_line(outcome: &LookupOutcome) -> String {
    let identifier = outcome.identifier();
    match outcome.status() {
        LookupStatus::Registered => format!("{} is registered on WhatsApp.", identifier),
        LookupStatus::NotRegistered => format!("{} is NOT registered on WhatsApp.", identifier),
        LookupStatus::Error => format!(
            "Error checking {}: {}",
            identifier,
            outcome.error_detail().unwrap_or("unknown error")
        ),
    }
}
