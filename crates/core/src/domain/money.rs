/// Rounds to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Human-friendly rate: `5`, `1.5`, `2.25`.
pub fn format_rate(rate: f64) -> String {
    let s = format!("{:.2}", rate);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Dollar amount with thousands separators; cents only when present (`$25,000`, `$0.10`).
pub fn format_dollars(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}
