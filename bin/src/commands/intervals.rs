//! Intervals command implementation.

use tickbar_lib::Interval;

/// Print the supported bar intervals.
pub(crate) fn list_intervals() {
    println!("{:<10} {:>10}", "INTERVAL", "SECONDS");
    println!("{}", "-".repeat(21));

    for interval in Interval::all() {
        println!("{:<10} {:>10}", interval.as_str(), interval.seconds());
    }
}
