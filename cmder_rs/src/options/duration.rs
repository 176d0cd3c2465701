//! Compound duration literals: `300ms`, `1h30m`, `1.5h`, `-2m45s`.

use chrono::TimeDelta;

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Parse a signed sequence of `<number><unit>` pairs.
///
/// A bare `0` is accepted without a unit. Fractions are allowed on every
/// component. The total must fit in an `i64` count of nanoseconds.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, String> {
    let invalid = || format!("invalid duration {raw:?}");

    let (negative, mut rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let first = rest.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_digits = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(format!("missing unit in duration {raw:?}"));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];
        let scale = unit_nanos(unit)
            .ok_or_else(|| format!("unknown unit {unit:?} in duration {raw:?}"))?;

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(invalid)?;
        if !frac_digits.is_empty() {
            component = component
                .checked_add(fraction_nanos(frac_digits, scale))
                .ok_or_else(invalid)?;
        }
        total = total.checked_add(component).ok_or_else(invalid)?;
        if total > i64::MAX as u128 + u128::from(negative) {
            return Err(invalid());
        }
    }

    let nanos = if negative {
        0i128 - total as i128
    } else {
        total as i128
    };
    let nanos = i64::try_from(nanos).map_err(|_| invalid())?;
    Ok(TimeDelta::nanoseconds(nanos))
}

/// Nanoseconds contributed by the fractional digits of one component.
///
/// Digits beyond what an `f64` can carry are dropped.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let mut value: u64 = 0;
    let mut divisor: f64 = 1.0;
    for b in digits.bytes().take(18) {
        value = value * 10 + u64::from(b - b'0');
        divisor *= 10.0;
    }
    (value as f64 * (scale as f64 / divisor)) as u128
}
