use chrono::{Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// Parses a spreadsheet amount such as `"1,234.50"`, `"$90"` or `"(50)"`.
///
/// Parenthesised amounts are negative. Returns `None` for anything that is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "").replace('$', "").replace('"', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some(inner) = cleaned.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Renders a number the way it is compared against dimension literals:
/// integral values lose their fractional part, so `2023.0` reads as `"2023"`.
pub fn canonical_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Absolute-value transform applied to signed ledger amounts.
pub fn magnitude(value: f64) -> f64 {
    value.abs()
}
