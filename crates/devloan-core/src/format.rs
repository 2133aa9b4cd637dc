use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Currency formatting with thousands separators: `-$1,234.50`.
pub fn format_money(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp(dp);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", dp as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 2);
    if negative {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Rate as a percentage: 0.125 => `12.50%`.
pub fn format_percent(rate: Decimal, dp: u32) -> String {
    let pct = (rate * dec!(100)).round_dp(dp);
    let pct = if pct.is_zero() { Decimal::ZERO } else { pct };
    format!("{:.*}%", dp as usize, pct)
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
