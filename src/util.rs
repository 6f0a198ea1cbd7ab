// Utility helpers for parsing, basic statistics and number formatting.
//
// Parsing here distinguishes "missing" (empty cell) from "unreadable" so the
// loader can record coercion failures instead of silently dropping them.
use num_format::{Locale, ToFormattedString};

/// Outcome of reading one numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<T> {
    Missing,
    Value(T),
    Invalid,
}

/// Parse a CSV cell into `f64`.
///
/// - Trims whitespace; an empty cell is `Missing`.
/// - Rejects values with alphabetic characters (`NaN`, `inf`, `12abc`).
/// - Strips thousands separators like `","` before parsing.
pub fn parse_f64_cell(s: Option<&str>) -> Cell<f64> {
    let Some(s) = s.map(str::trim) else {
        return Cell::Missing;
    };
    if s.is_empty() {
        return Cell::Missing;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return Cell::Invalid;
    }
    match s.replace(',', "").parse::<f64>() {
        Ok(v) => Cell::Value(v),
        Err(_) => Cell::Invalid,
    }
}

/// Arithmetic mean; `NaN` for an empty slice so callers never mistake "no
/// data" for zero.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Sample standard deviation (n - 1); `NaN` below two values.
pub fn sample_std(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return f64::NAN;
    }
    let m = mean(v);
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
    var.sqrt()
}

/// Quantile of an ascending slice by linear interpolation between closest
/// ranks (`q` in 0..=1).
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = q * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Pearson correlation of paired observations. `NaN` when fewer than two
/// pairs or either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Fixed-decimal rendering with `NaN` for undefined values.
pub fn format_float(n: f64, decimals: usize) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    format!("{:.*}", decimals, n)
}

pub fn format_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format_float(x, decimals))
        .unwrap_or_else(|| "NaN".to_string())
}

/// Format a value with a fixed number of decimals and locale-aware thousands
/// separators (e.g. `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return format_float(n, decimals);
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
