//! Money and quantity formatting for reports and terminal tables.

/// Thousands-separated fixed-point, e.g. `1234.5` → `"1,234.50"` for 2 decimals.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3 + 1);
    for (i, &d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(d as char);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    // No "-0.00" for values that round to zero
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `"$1,234.50"`, `"-$1,234.50"`, or `"n/a"` for undefined amounts.
pub fn format_currency(value: Option<f64>, symbol: &str) -> String {
    match value {
        None => "n/a".to_string(),
        Some(v) if v.is_nan() => "n/a".to_string(),
        Some(v) => {
            let grouped = format_grouped(v, 2);
            match grouped.strip_prefix('-') {
                Some(abs) => format!("-{symbol}{abs}"),
                None => format!("{symbol}{grouped}"),
            }
        }
    }
}

/// Quantity with two decimals, `"n/a"` when undefined.
pub fn format_quantity(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format_grouped(v, 2),
        _ => "n/a".to_string(),
    }
}
