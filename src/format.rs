//! Display formatting for monetary values, counts and percentages.
//!
//! Monetary inputs are billions of IDR. IDR renders in `id-ID` style with
//! rupiah magnitude suffixes (`T`, `M`, `jt`); USD converts at a fixed rate and
//! renders in compact `en-US` notation (`$833M`). Rounding is half away from
//! zero throughout.

use crate::model::Currency;

/// Default conversion used when no configuration overrides it.
pub const DEFAULT_IDR_PER_USD: f64 = 15_000.0;

const BILLION: f64 = 1_000_000_000.0;

const IDR_UNITS: [(f64, &str); 3] = [
    (1_000_000_000_000.0, " T"),
    (1_000_000_000.0, " M"),
    (1_000_000.0, " jt"),
];

const COMPACT_UNITS: [(f64, &str); 4] = [
    (1_000_000_000_000.0, "T"),
    (1_000_000_000.0, "B"),
    (1_000_000.0, "M"),
    (1_000.0, "K"),
];

/// Format a value in billions of IDR for display in `currency`.
pub fn format_currency(value_bn: f64, currency: Currency, idr_per_usd: f64) -> String {
    let actual = value_bn * BILLION;
    match currency {
        Currency::Idr => format_idr(actual),
        Currency::Usd => format_usd_compact(actual / idr_per_usd),
    }
}

fn format_idr(actual: f64) -> String {
    let abs = actual.abs();
    let (number, suffix) = match IDR_UNITS.iter().find(|(scale, _)| abs >= *scale) {
        Some((scale, suffix)) => (group_fixed(abs / scale, 2, 0, '.', ','), *suffix),
        None => (group_fixed(abs, 0, 0, '.', ','), ""),
    };
    let sign = if actual < 0.0 { "-" } else { "" };
    format!("{}Rp {}{}", sign, number, suffix)
}

fn format_usd_compact(usd: f64) -> String {
    let abs = usd.abs();
    let mut unit = COMPACT_UNITS.iter().position(|(scale, _)| abs >= *scale);
    loop {
        let (scale, suffix) = match unit {
            Some(i) => COMPACT_UNITS[i],
            None => (1.0, ""),
        };
        let scaled = abs / scale;
        let decimals = compact_decimals(scaled);
        let rounded = round_to(scaled, decimals);
        // 999.7K rounds to 1000K; promote to the next unit
        let promote = match unit {
            Some(0) => None,
            Some(i) => Some(i - 1),
            None => Some(COMPACT_UNITS.len() - 1),
        };
        if rounded >= 1000.0 {
            if let Some(next) = promote {
                unit = Some(next);
                continue;
            }
        }
        let sign = if usd < 0.0 { "-" } else { "" };
        return format!(
            "{}${}{}",
            sign,
            group_fixed(scaled, decimals, 0, ',', '.'),
            suffix
        );
    }
}

/// Compact notation keeps whichever is more precise: integer rounding or two
/// significant digits.
fn compact_decimals(x: f64) -> usize {
    if x >= 10.0 || x == 0.0 || !x.is_finite() {
        return 0;
    }
    let magnitude = x.log10().floor() as i32;
    (1 - magnitude).clamp(0, 12) as usize
}

/// Thousands-grouped `en-US` number with up to three fraction digits.
pub fn format_number(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_fixed(value.abs(), 3, 0, ',', '.'))
}

/// Percentage from a 0–100 value, one decimal place.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}%", sign, group_fixed(value.abs(), 1, 1, ',', '.'))
}

/// Signed percentage delta, e.g. `+2.1%` / `-1.5%`.
pub fn format_signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_percent(value))
    } else {
        format_percent(value)
    }
}

pub fn format_days(days: f64) -> String {
    format!("{}d", round_to(days, 0) as i64)
}

/// Ratios are `None` when their denominator is zero.
pub fn format_ratio(ratio: Option<f64>, render: impl Fn(f64) -> String) -> String {
    match ratio {
        Some(v) if v.is_finite() => render(v),
        _ => "n/a".to_string(),
    }
}

/// Approximate inverse of [`format_currency`], returning billions of IDR.
pub fn parse_currency(text: &str, currency: Currency, idr_per_usd: f64) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let actual = match currency {
        Currency::Idr => {
            let body = body.strip_prefix("Rp")?.trim();
            let (number, multiplier) = split_idr_suffix(body);
            let normalized: String = number.replace('.', "").replace(',', ".");
            normalized.trim().parse::<f64>().ok()? * multiplier
        }
        Currency::Usd => {
            let body = body.strip_prefix('$')?;
            let (number, multiplier) = match body.chars().last() {
                Some(c) if c.is_ascii_alphabetic() => {
                    let scale = COMPACT_UNITS.iter().find(|(_, s)| s.starts_with(c))?.0;
                    (&body[..body.len() - 1], scale)
                }
                _ => (body, 1.0),
            };
            number.replace(',', "").parse::<f64>().ok()? * multiplier * idr_per_usd
        }
    };
    let value = actual / BILLION;
    Some(if negative { -value } else { value })
}

fn split_idr_suffix(body: &str) -> (&str, f64) {
    for (scale, suffix) in IDR_UNITS {
        if let Some(number) = body.strip_suffix(suffix) {
            return (number, scale);
        }
    }
    (body, 1.0)
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Fixed-point rendering of a non-negative value with digit grouping.
/// Trailing fraction zeros are trimmed down to `min_frac` digits.
fn group_fixed(value: f64, max_frac: usize, min_frac: usize, group: char, decimal: char) -> String {
    if !value.is_finite() {
        return "∞".to_string();
    }
    let factor = 10u64.pow(max_frac as u32);
    let scaled = (value * factor as f64).round() as u64;
    let int_part = scaled / factor;
    let frac_part = scaled % factor;

    let mut out = group_digits(&int_part.to_string(), group);
    if max_frac > 0 {
        let mut frac = format!("{:0width$}", frac_part, width = max_frac);
        while frac.len() > min_frac && frac.ends_with('0') {
            frac.pop();
        }
        if !frac.is_empty() {
            out.push(decimal);
            out.push_str(&frac);
        }
    }
    out
}

fn group_digits(digits: &str, sep: char) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idr(v: f64) -> String {
        format_currency(v, Currency::Idr, DEFAULT_IDR_PER_USD)
    }

    fn usd(v: f64) -> String {
        format_currency(v, Currency::Usd, DEFAULT_IDR_PER_USD)
    }

    #[test]
    fn usd_converts_at_fixed_rate_compact() {
        // 12 500 bn IDR / 15 000 = 833.33M USD
        assert_eq!(usd(12500.0), "$833M");
        assert_eq!(usd(75900.0), "$5.1B");
        assert_eq!(usd(150.0), "$10M");
    }

    #[test]
    fn negative_sign_precedes_symbol() {
        assert_eq!(idr(-50.0), "-Rp 50 M");
        assert_eq!(usd(-50.0), "-$3.3M");
        assert_eq!(idr(-120.0), "-Rp 120 M");
    }

    #[test]
    fn idr_magnitude_branches() {
        assert_eq!(idr(12500.0), "Rp 12,5 T");
        assert_eq!(idr(75900.0), "Rp 75,9 T");
        assert_eq!(idr(1500.0), "Rp 1,5 T");
        assert_eq!(idr(800.0), "Rp 800 M");
        assert_eq!(idr(0.25), "Rp 250 jt");
        assert_eq!(idr(0.0001), "Rp 100.000");
        assert_eq!(idr(1_234_567.0), "Rp 1.234,57 T");
    }

    #[test]
    fn zero_has_no_sign_or_suffix() {
        assert_eq!(idr(0.0), "Rp 0");
        assert_eq!(usd(0.0), "$0");
        assert_eq!(idr(-0.0), "Rp 0");
    }

    #[test]
    fn compact_promotes_when_rounding_reaches_next_unit() {
        // 999.97K USD
        let value_bn = 999_970.0 * DEFAULT_IDR_PER_USD / BILLION;
        assert_eq!(usd(value_bn), "$1M");
    }

    #[test]
    fn compact_small_values_keep_two_significant_digits() {
        let value_bn = 1.26 * DEFAULT_IDR_PER_USD / BILLION;
        assert_eq!(usd(value_bn), "$1.3");
        let value_bn = 12.6 * DEFAULT_IDR_PER_USD / BILLION;
        assert_eq!(usd(value_bn), "$13");
    }

    #[test]
    fn numbers_and_percents() {
        assert_eq!(format_number(59150.0), "59,150");
        assert_eq!(format_number(1234.5678), "1,234.568");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_percent(25.6), "25.6%");
        assert_eq!(format_percent(8.333), "8.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(1234.56), "1,234.6%");
        assert_eq!(format_percent(-2.68), "-2.7%");
        assert_eq!(format_percent(-0.04), "-0.0%");
        assert_eq!(format_percent(-0.0), "0.0%");
        assert_eq!(format_signed_percent(-0.04), "-0.0%");
        assert_eq!(format_signed_percent(1.3), "+1.3%");
        assert_eq!(format_days(23.36), "23d");
    }

    #[test]
    fn ratio_none_renders_not_applicable() {
        assert_eq!(format_ratio(None, format_percent), "n/a");
        assert_eq!(format_ratio(Some(f64::INFINITY), format_percent), "n/a");
        assert_eq!(format_ratio(Some(12.0), format_percent), "12.0%");
    }

    #[test]
    fn parse_recovers_magnitude() {
        for value in [1.0, 50.0, 833.0, 1500.0, 12500.0, 75900.0, -120.0] {
            for currency in [Currency::Idr, Currency::Usd] {
                let text = format_currency(value, currency, DEFAULT_IDR_PER_USD);
                let back = parse_currency(&text, currency, DEFAULT_IDR_PER_USD)
                    .unwrap_or_else(|| panic!("unparseable {}", text));
                let tolerance = value.abs() * 0.05;
                assert!(
                    (back - value).abs() <= tolerance,
                    "{} -> {} -> {}",
                    value,
                    text,
                    back
                );
            }
        }
    }

    #[test]
    fn parse_rejects_foreign_symbol() {
        assert!(parse_currency("$5M", Currency::Idr, DEFAULT_IDR_PER_USD).is_none());
        assert!(parse_currency("Rp 5 M", Currency::Usd, DEFAULT_IDR_PER_USD).is_none());
    }
}
