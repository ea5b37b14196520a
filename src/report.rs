use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::analysis;
use crate::models::{ClassifiedRow, Status};
use crate::periods::Period;

/// Display text for the newest active period of a row.
pub fn last_active_label(row: &ClassifiedRow, periods: &[Period]) -> String {
    if row.status() != Status::Stopped {
        return String::new();
    }
    row.classification
        .last_active
        .and_then(|index| periods.get(index))
        .map(|period| period.label.clone())
        .unwrap_or_else(|| "long ago".to_string())
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn build_report(
    source: &str,
    periods: &[Period],
    rows: &[ClassifiedRow],
    top: usize,
    generated_at: DateTime<Utc>,
) -> String {
    let summaries = analysis::summarize_by_status(rows);

    let mut output = String::new();

    let _ = writeln!(output, "# Client Sales Trend Report");
    let _ = writeln!(
        output,
        "Generated from {} at {} ({} clients)",
        source,
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        rows.len()
    );
    if let (Some(first), Some(last)) = (periods.first(), periods.last()) {
        let _ = writeln!(
            output,
            "Periods: {} to {}",
            first.display_month(),
            last.display_month()
        );
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No clients match the current filters.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} clients ({:.1}%)",
                summary.status.label(),
                summary.count,
                summary.share * 100.0
            );
        }
    }

    let _ = writeln!(output);
    match periods.last() {
        Some(latest) => {
            let _ = writeln!(output, "## Latest Period by Manager ({})", latest.label);
            let totals = analysis::manager_totals(rows, periods.len() - 1);
            if totals.is_empty() {
                let _ = writeln!(output, "No sales recorded for this period.");
            } else {
                for total in totals.iter() {
                    let _ = writeln!(
                        output,
                        "- {} / {}: {}",
                        total.manager,
                        total.status.label(),
                        format_amount(total.total)
                    );
                }
            }
        }
        None => {
            let _ = writeln!(output, "## Latest Period by Manager");
            let _ = writeln!(output, "No periods available.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Client Detail");

    if rows.is_empty() {
        let _ = writeln!(output, "No clients match the current filters.");
        return output;
    }

    let period_headers: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
    let _ = writeln!(
        output,
        "| Manager | Client | {} | Status | Last active |",
        period_headers.join(" | ")
    );
    let _ = writeln!(output, "|{}", "---|".repeat(periods.len() + 4));

    for row in rows.iter().take(top) {
        let values: Vec<String> = row.values.iter().map(|v| format_amount(*v)).collect();
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} |",
            row.manager,
            row.client,
            values.join(" | "),
            row.status().label(),
            last_active_label(row, periods)
        );
    }

    if rows.len() > top {
        let _ = writeln!(output);
        let _ = writeln!(output, "{} more clients not shown.", rows.len() - top);
    }

    output
}
