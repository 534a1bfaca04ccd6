// Utility functions

/// Formats a number with two decimals and comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return format_decimal(value);
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Two decimals; NaN and infinities print as `NaN`, `inf` and `-inf`.
pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}
