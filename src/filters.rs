use askama::Result;
use rust_decimal::Decimal;

// Custom filters for the dashboard template, used as `|money` and `|percent`.
#[allow(clippy::unnecessary_wraps)]
pub fn money(value: &Decimal) -> Result<String> {
    Ok(format!("${:.2}", value.round_dp(2)))
}

#[allow(clippy::unnecessary_wraps)]
pub fn percent(ratio: &f64) -> Result<String> {
    Ok(format!("{:.0}%", ratio * 100.0))
}
