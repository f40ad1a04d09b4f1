//! End-of-run summary printout

use crate::state::StatusTally;
use std::fmt::Write;

/// Renders the tally as the text shown at the end of a run
pub fn format_summary(tally: &StatusTally) -> String {
    let mut out = String::new();
    let total = tally.total();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Mirror Summary ===\n");
    let _ = writeln!(out, "Dataset outcomes:");
    for (outcome, count) in tally.counts() {
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Remote sync:");
    let _ = writeln!(out, "  uploaded: {}", tally.uploaded());
    let _ = writeln!(out, "  unchanged: {}", tally.unchanged());
    let _ = writeln!(out, "  failed: {}", tally.sync_failed());
    if tally.uploaded() == 0 && tally.sync_failed() == 0 && tally.unchanged() > 0 {
        let _ = writeln!(out, "  no updates");
    }

    out
}

/// Prints the summary to stdout
pub fn print_summary(tally: &StatusTally) {
    print!("{}", format_summary(tally));
}
