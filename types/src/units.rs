//! 18-decimal fixed-point text conversion.
//!
//! Amounts and rates are written by humans as decimals (`"1.5"`) and held
//! as raw integers scaled by `10^18`.

use crate::error::TypeError;

/// Number of fractional decimal digits in a raw fixed-point value.
pub const DECIMALS: u32 = 18;

/// `10^DECIMALS`.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Parse a non-negative decimal such as `"0.1"`, `"25"` or `".5"` into raw units.
pub fn parse_units(s: &str) -> Result<u128, TypeError> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err(TypeError::Negative(s.to_string()));
    }
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(TypeError::InvalidDecimal(format!("{s:?} is empty")));
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(TypeError::InvalidDecimal(format!("{s:?} is not a decimal number")));
    }
    if frac_part.len() > DECIMALS as usize {
        return Err(TypeError::InvalidDecimal(format!(
            "{s:?} has more than {DECIMALS} fractional digits"
        )));
    }

    let out_of_range = || TypeError::InvalidDecimal(format!("{s:?} is out of range"));
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| out_of_range())?
    };
    let frac: u128 = if frac_part.is_empty() {
        0
    } else {
        format!("{frac_part:0<width$}", width = DECIMALS as usize)
            .parse()
            .map_err(|_| out_of_range())?
    };
    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(out_of_range)
}

/// Render raw units as the shortest exact decimal.
pub fn format_units(raw: u128) -> String {
    let whole = raw / UNIT;
    let frac = raw % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0>width$}", width = DECIMALS as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
