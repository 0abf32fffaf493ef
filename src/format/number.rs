/// Format `v` rounded to an integer with `,` thousands separators (`1234.6` -> `"1,235"`).
///
/// Halves round towards positive infinity.
pub fn format_grouped_int(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded = (v + 0.5).floor();
    let neg = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = group_thousands(&digits);
    if neg {
        out.insert(0, '-');
    }
    out
}

/// Format an axis tick value with precision implied by the tick `step`.
///
/// Steps of 1 or more print integers, a step of 0.2 prints one decimal, and so on.
pub fn format_tick(v: f64, step: f64) -> String {
    let precision = tick_precision(step);
    let s = format!("{:.*}", precision, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut out = group_thousands(int_part);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    if v < 0.0 && out.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.insert(0, '-');
    }
    out
}

fn tick_precision(step: f64) -> usize {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    let exponent = step.log10().floor();
    if exponent >= 0.0 {
        0
    } else {
        (-exponent) as usize
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/format/number.rs"]
mod tests;
