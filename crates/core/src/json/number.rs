//! Number-to-text conversion for the signing encoding.
//!
//! Follows the ECMAScript `Number::toString` rules, which is how the corpus
//! consumers render numbers: shortest round-trip digits, plain notation for
//! decimal exponents in `[-6, 21)`, scientific notation with an explicit
//! exponent sign otherwise.

/// Render a number the way the signing encoding expects.
///
/// Non-finite values render as `null`, the only JSON form they have.
/// Negative zero renders as `0`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let (digits, exponent) = shortest_digits(value.abs());
    let mut out = String::with_capacity(digits.len() + 8);
    if value < 0.0 {
        out.push('-');
    }

    let k = digits.len() as i32;
    // `n` is the position of the decimal point relative to the digit string.
    let n = exponent + 1;

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if n - 1 < 0 { '-' } else { '+' });
        out.push_str(&(n - 1).abs().to_string());
    }
    out
}

/// Split a positive finite value into its shortest round-trip decimal digits
/// and the decimal exponent of the first digit.
fn shortest_digits(value: f64) -> (String, i32) {
    // `{:e}` yields the shortest representation that round-trips, e.g. `1.2345e3`.
    let formatted = format!("{value:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let mut digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    break_tie_to_even(value, &mut digits, exponent);
    (digits, exponent)
}

/// When `value` sits exactly halfway between two shortest candidates, pick
/// the one whose last digit is even. `{:e}` rounds such ties up.
fn break_tie_to_even(value: f64, digits: &mut String, exponent: i32) {
    let Some(&last) = digits.as_bytes().last() else {
        return;
    };
    if (last - b'0') % 2 == 0 {
        return;
    }

    let stem = &digits[..digits.len() - 1];
    for neighbor in [last - 1, last + 1] {
        if neighbor > b'9' || (stem.is_empty() && neighbor == b'0') {
            continue;
        }
        let mut candidate = String::with_capacity(digits.len());
        candidate.push_str(stem);
        candidate.push(neighbor as char);

        let lower = if neighbor < last { &candidate } else { &*digits };
        if is_exact_midpoint(value, lower, exponent) && round_trips(value, &candidate, exponent) {
            *digits = candidate;
            return;
        }
    }
}

/// Whether the exact binary value equals `lower` with a trailing `5` appended,
/// i.e. the midpoint between `lower` and its successor at the same precision.
fn is_exact_midpoint(value: f64, lower: &str, exponent: i32) -> bool {
    // Every finite f64 has a terminating decimal expansion of at most 767
    // significant digits, so this precision prints it exactly.
    let exact = format!("{value:.800e}");
    let Some((mantissa, exact_exponent)) = exact.split_once('e') else {
        return false;
    };
    if exact_exponent.parse::<i32>().ok() != Some(exponent) {
        return false;
    }
    let exact_digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let exact_digits = exact_digits.trim_end_matches('0');
    exact_digits.len() == lower.len() + 1
        && exact_digits.starts_with(lower)
        && exact_digits.ends_with('5')
}

fn round_trips(value: f64, digits: &str, exponent: i32) -> bool {
    let scale = exponent - (digits.len() as i32 - 1);
    let text = format!("{digits}e{scale}");
    text.parse::<f64>().map_or(false, |parsed| parsed == value)
}
