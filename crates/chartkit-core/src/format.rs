//! Number formatting for labels and tooltips.

const SUFFIXES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Format a value with a compact magnitude suffix: `1.2K`, `3.4M`, `5.6B`.
///
/// Values below a thousand print with `decimals` places. Non-finite values
/// print as `-`.
#[must_use]
pub fn format_value(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let magnitude = value.abs();
    for (scale, suffix) in SUFFIXES {
        if magnitude >= scale {
            return format!("{:.*}{suffix}", decimals, value / scale);
        }
    }
    format!("{value:.decimals$}")
}

/// Format a percentage change with an explicit sign: `+1.5%`, `-0.3%`.
///
/// Changes that round to zero print unsigned.
#[must_use]
pub fn format_percent(change: f64, decimals: usize) -> String {
    if !change.is_finite() {
        return "-".to_string();
    }
    let body = format!("{:.*}", decimals, change.abs());
    let is_zero = body.chars().all(|c| c == '0' || c == '.');
    if is_zero {
        format!("{body}%")
    } else if change > 0.0 {
        format!("+{body}%")
    } else {
        format!("-{body}%")
    }
}
