// src/services/format.rs

/// Round to two decimals, the precision the backend reports rates in.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Difference between two yields or rates, e.g. 10Y - 2Y.
pub fn spread(long: f64, short: f64) -> f64 {
    round2(long - short)
}

/// Policy rate minus inflation.
pub fn real_rate(policy_rate: f64, inflation_rate: f64) -> f64 {
    round2(policy_rate - inflation_rate)
}

/// `+5.50%` for gains when `show_sign` is set, `-3.25%` / `0.00%` otherwise.
pub fn format_change(value: f64, show_sign: bool) -> String {
    // Anything that rounds to zero prints unsigned, including -0.0.
    let value = if round2(value) == 0.0 { 0.0 } else { value };
    if show_sign && value > 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Colour token for a percentage move.
pub fn change_color(value: f64) -> &'static str {
    if value > 0.0 {
        "text-emerald-400"
    } else if value < 0.0 {
        "text-red-400"
    } else {
        "text-gray-400"
    }
}

/// `$1.25T`, `$340.00B`, `$12.50M` for large dollar amounts.
pub fn format_large_number(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("{}${:.2}T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.2}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.2}K", sign, abs / 1e3)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_change_literals() {
        assert_eq!(format_change(5.5, true), "+5.50%");
        assert_eq!(format_change(-3.25, true), "-3.25%");
        assert_eq!(format_change(0.0, true), "0.00%");
        assert_eq!(format_change(5.5, false), "5.50%");
    }

    #[test]
    fn format_change_near_zero_is_unsigned() {
        assert_eq!(format_change(-0.0, true), "0.00%");
        assert_eq!(format_change(-0.004, true), "0.00%");
        assert_eq!(format_change(0.004, true), "0.00%");
        assert_eq!(format_change(-0.004, false), "0.00%");
        assert_eq!(format_change(-0.006, true), "-0.01%");
    }

    #[test]
    fn change_color_by_direction() {
        assert!(change_color(1.2).contains("emerald"));
        assert!(change_color(-0.1).contains("red"));
        let neutral = change_color(0.0);
        assert!(!neutral.contains("emerald") && !neutral.contains("red"));
    }

    #[test]
    fn derived_rates() {
        assert_eq!(spread(4.55, 4.85), -0.3);
        assert_eq!(real_rate(5.5, 3.4), 2.1);
        assert_eq!(round2(1.005_f64 + 0.0001), 1.01);
    }

    #[test]
    fn large_numbers() {
        assert_eq!(format_large_number(1.25e12), "$1.25T");
        assert_eq!(format_large_number(-3.4e8), "-$340.00M");
        assert_eq!(format_large_number(950.0), "$950.00");
    }
}
