use crate::types::Unit;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NumberLocale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_group_separator")]
    pub group_separator: String,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_group_separator() -> String {
    ",".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            group_separator: default_group_separator(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn sign(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

const COMPACT_STEPS: [(f64, &str); 3] = [(1e3, "K"), (1e6, "M"), (1e9, "B")];

/// Scale a non-negative value to its K/M/B form, or `None` below 1e3.
fn compact_abs(abs: f64) -> Option<String> {
    let mut step = COMPACT_STEPS.iter().rposition(|&(t, _)| abs >= t)?;
    let mut scaled = (abs / COMPACT_STEPS[step].0 * 10.0).round() / 10.0;
    // 999_990 rounds to 1000.0K; promote it to 1M.
    if scaled >= 1000.0 && step + 1 < COMPACT_STEPS.len() {
        step += 1;
        scaled = (abs / COMPACT_STEPS[step].0 * 10.0).round() / 10.0;
    }
    let text = format!("{scaled:.1}");
    Some(format!("{}{}", trim_fraction(&text), COMPACT_STEPS[step].1))
}

// ---------------------------------------------------------------------------
// Formatters
// ---------------------------------------------------------------------------

/// Shown in place of NaN and infinities by every formatter.
pub const NON_FINITE: &str = "-";

/// Whole currency units with grouping, e.g. `-$1,500`.
pub fn format_currency(value: f64, locale: &NumberLocale) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let rounded = value.round();
    if rounded == 0.0 {
        return format!("{}0", locale.currency_symbol);
    }
    let digits = format!("{:.0}", rounded.abs());
    format!(
        "{}{}{}",
        sign(rounded),
        locale.currency_symbol,
        group_digits(&digits, &locale.group_separator)
    )
}

/// Grouped number with up to two decimals, trailing zeros dropped.
pub fn format_number(value: f64, locale: &NumberLocale) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let trimmed = trim_fraction(&fixed);
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (trimmed, None),
    };
    if int_part == "0" && frac_part.is_none() {
        return "0".to_string();
    }
    let mut out = String::new();
    out.push_str(sign(value));
    out.push_str(&group_digits(int_part, &locale.group_separator));
    if let Some(frac) = frac_part {
        out.push_str(&locale.decimal_separator);
        out.push_str(frac);
    }
    out
}

/// `1500` -> `1.5K`, `2_000_000` -> `2M`. Below 1,000 the plain number.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    match compact_abs(value.abs()) {
        Some(text) => format!("{}{text}", sign(value)),
        None => format_number(value, &NumberLocale::default()),
    }
}

/// `1_500_000` -> `$1.5M`. Below 1,000 the full currency form.
pub fn format_compact_currency(value: f64, locale: &NumberLocale) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    match compact_abs(value.abs()) {
        Some(text) => format!("{}{}{text}", sign(value), locale.currency_symbol),
        None => format_currency(value, locale),
    }
}

/// `is_fraction` means the input is 0..1 rather than 0..100.
pub fn format_percentage(value: f64, decimals: usize, is_fraction: bool) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let pct = if is_fraction { value * 100.0 } else { value };
    format!("{pct:.decimals$}%")
}

/// Render a day count in the coarsest unit that fits: days, then weeks,
/// then 30-day months, then 365-day years, each with a day remainder.
pub fn format_days(days: f64) -> String {
    if !days.is_finite() {
        return NON_FINITE.to_string();
    }
    let total = days.round() as i64;
    if total < 0 {
        return format!("-{}", format_whole_days(total.unsigned_abs()));
    }
    format_whole_days(total.unsigned_abs())
}

fn format_whole_days(d: u64) -> String {
    let with_rest = |n: u64, unit: &str, rest: u64| {
        if rest == 0 {
            format!("{n}{unit}")
        } else {
            format!("{n}{unit} {rest}d")
        }
    };
    match d {
        1 => "1 day".to_string(),
        0..=6 => format!("{d} days"),
        7..=29 => with_rest(d / 7, "w", d % 7),
        30..=364 => with_rest(d / 30, "mo", d % 30),
        _ => with_rest(d / 365, "y", d % 365),
    }
}

pub fn format_ratio(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    format!("{value:.1}x")
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn format_kpi_value(value: f64, unit: Unit, compact: bool) -> String {
    format_kpi_value_with(&NumberLocale::default(), value, unit, compact)
}

pub fn format_kpi_value_with(
    locale: &NumberLocale,
    value: f64,
    unit: Unit,
    compact: bool,
) -> String {
    match unit {
        Unit::Currency if compact => format_compact_currency(value, locale),
        Unit::Currency => format_currency(value, locale),
        Unit::Percentage => format_percentage(value, 1, false),
        Unit::Days => format_days(value),
        Unit::Ratio => format_ratio(value),
        Unit::Number | Unit::Score if compact => format_compact(value),
        Unit::Number | Unit::Score => format_number(value, locale),
    }
}

/// Format by unit tag as stored in external data. Tags that don't name a
/// known unit fall back to number formatting.
pub fn format_value_for_tag(
    locale: &NumberLocale,
    value: f64,
    tag: &str,
    compact: bool,
) -> String {
    match tag.parse::<Unit>() {
        Ok(unit) => format_kpi_value_with(locale, value, unit, compact),
        Err(_) if compact => format_compact(value),
        Err(_) => format_number(value, locale),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
