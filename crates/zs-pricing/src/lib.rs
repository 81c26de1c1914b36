use zs_order_types::{Quantity, SelectedOptions};

/// Keep only the digits of `raw` and parse them; anything unparsable is 0.
///
/// Accepts display strings such as `"30.000 Đ"` or `"+5,000đ"`.
pub fn parse_price(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

pub fn sum_option_prices(options: &SelectedOptions) -> u64 {
    options.surcharge()
}

pub fn compute_total(base_price: u64, options: &SelectedOptions, quantity: Quantity) -> u64 {
    base_price
        .saturating_add(sum_option_prices(options))
        .saturating_mul(u64::from(quantity.get()))
}

/// Rounded percentage saved relative to `original`, or 0 when there is no discount.
pub fn discount_percent(current: u64, original: u64) -> u8 {
    if current == 0 || original <= current {
        return 0;
    }
    let saved = (original - current) as f64 / original as f64 * 100.0;
    saved.round().clamp(0.0, 100.0) as u8
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Cart and modal display format, e.g. `70.000 Đ`.
pub fn format_price(value: u64) -> String {
    format!("{} Đ", group_thousands(value))
}

/// Product card display format, e.g. `30.000đ`.
pub fn format_card_price(value: u64) -> String {
    format!("{}đ", group_thousands(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zs_order_types::OptionChoice;

    #[test]
    fn parse_price_strips_formatting() {
        assert_eq!(parse_price("30.000 Đ"), 30000);
        assert_eq!(parse_price("+5,000đ"), 5000);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("free"), 0);
        assert_eq!(parse_price("99999999999999999999999"), 0);
    }

    #[test]
    fn total_includes_single_and_multi_surcharges() {
        let mut options = SelectedOptions::default();
        options
            .single
            .insert("size".to_owned(), OptionChoice::new("L", 4000));
        options
            .multi
            .insert("topping".to_owned(), vec![OptionChoice::new("Pearl", 1000)]);

        assert_eq!(sum_option_prices(&options), 5000);
        assert_eq!(compute_total(30000, &options, Quantity::clamped(2)), 70000);
    }

    #[test]
    fn total_saturates_on_absurd_prices() {
        let options = SelectedOptions::default();
        assert_eq!(compute_total(u64::MAX - 1, &options, Quantity::clamped(3)), u64::MAX);
    }

    #[test]
    fn discount_percent_rounds_and_guards() {
        assert_eq!(discount_percent(30000, 40000), 25);
        assert_eq!(discount_percent(20000, 30000), 33);
        assert_eq!(discount_percent(40000, 30000), 0);
        assert_eq!(discount_percent(0, 30000), 0);
        assert_eq!(discount_percent(30000, 30000), 0);
    }

    #[test]
    fn formats_vietnamese_grouping() {
        assert_eq!(format_price(0), "0 Đ");
        assert_eq!(format_price(700), "700 Đ");
        assert_eq!(format_price(70000), "70.000 Đ");
        assert_eq!(format_price(1234567), "1.234.567 Đ");
        assert_eq!(format_card_price(30000), "30.000đ");
    }
}
