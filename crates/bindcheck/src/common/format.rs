use std::fmt::Display;
use std::time::Duration;

use itertools::Itertools;

/// Format a duration as a Slurm time string, e.g. 01:05:02
pub fn format_duration(duration: &Duration) -> String {
    let mut seconds = duration.as_secs();
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats items as a set literal, e.g. `{0, 1, 2}`.
pub fn format_set<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    format!("{{{}}}", items.into_iter().join(", "))
}

/// Formats items as a list literal, e.g. `[a, b]`.
pub fn format_list<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    format!("[{}]", items.into_iter().join(", "))
}
