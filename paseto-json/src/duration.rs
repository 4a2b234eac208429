//! Human readable time spans, eg `"2h"`, `"1 day"`, `"2.5 weeks"`.

use paseto_core::PasetoError;

const SECOND: f64 = 1000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const YEAR: f64 = DAY * 365.25;

/// Parse a span into whole milliseconds.
///
/// `<number>[ ]<unit>`, where the number is an unsigned integer or decimal
/// and the unit is one of (case insensitive) `sec secs second seconds s`,
/// `min mins minute minutes m`, `hr hrs hour hours h`, `day days d`,
/// `week weeks w`, `yr yrs year years y`.
pub fn parse_duration(s: &str) -> Result<i64, PasetoError> {
    let invalid = || PasetoError::Usage(format!("invalid time span {s:?}").into());

    let (number, rest) = split_number(s).ok_or_else(invalid)?;
    let unit = rest.strip_prefix(' ').unwrap_or(rest);
    let scale = unit_scale(unit).ok_or_else(invalid)?;

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let ms = (value * scale).round();
    if !ms.is_finite() || ms >= i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(ms as i64)
}

/// `\d+` or `\d+\.\d+`
fn split_number(s: &str) -> Option<(&str, &str)> {
    let int = s.bytes().take_while(u8::is_ascii_digit).count();
    if int == 0 {
        return None;
    }

    let Some(frac) = s[int..].strip_prefix('.') else {
        return Some(s.split_at(int));
    };
    let frac = frac.bytes().take_while(u8::is_ascii_digit).count();
    if frac == 0 {
        return None;
    }
    Some(s.split_at(int + 1 + frac))
}

fn unit_scale(unit: &str) -> Option<f64> {
    let scale = match &*unit.to_ascii_lowercase() {
        "sec" | "secs" | "second" | "seconds" | "s" => SECOND,
        "min" | "mins" | "minute" | "minutes" | "m" => MINUTE,
        "hr" | "hrs" | "hour" | "hours" | "h" => HOUR,
        "day" | "days" | "d" => DAY,
        "week" | "weeks" | "w" => WEEK,
        "yr" | "yrs" | "year" | "years" | "y" => YEAR,
        _ => return None,
    };
    Some(scale)
}
