//! Product card pricing and badge.

use zs_pricing::{discount_percent, format_card_price, parse_price};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBadge {
    SoldOut,
    Discount(u8),
    Hidden,
}

impl CardBadge {
    pub fn text(&self) -> Option<String> {
        match self {
            CardBadge::SoldOut => Some("Tạm hết".to_owned()),
            CardBadge::Discount(p) => Some(format!("Giảm {}%", p)),
            CardBadge::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPricing {
    pub current: u64,
    pub original: u64,
    pub sold_out: bool,
}

impl CardPricing {
    /// Build from the card's raw `data-*` values; either may carry formatting.
    pub fn from_attrs(current: &str, original: &str, sold_out: bool) -> Self {
        Self {
            current: parse_price(current),
            original: parse_price(original),
            sold_out,
        }
    }

    pub fn current_text(&self) -> String {
        format_card_price(self.current)
    }

    /// Struck-through original price, shown only when it is higher.
    pub fn original_text(&self) -> Option<String> {
        (self.original > self.current && self.original > 0)
            .then(|| format_card_price(self.original))
    }

    pub fn badge(&self) -> CardBadge {
        if self.sold_out {
            return CardBadge::SoldOut;
        }
        match discount_percent(self.current, self.original) {
            0 => CardBadge::Hidden,
            p => CardBadge::Discount(p),
        }
    }
}

pub fn is_sold_out(sold_out_attr: Option<&str>, availability_attr: Option<&str>) -> bool {
    sold_out_attr == Some("true") || availability_attr == Some("sold_out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_card() {
        let card = CardPricing::from_attrs("30000", "40.000đ", false);
        assert_eq!(card.current_text(), "30.000đ");
        assert_eq!(card.original_text().as_deref(), Some("40.000đ"));
        assert_eq!(card.badge(), CardBadge::Discount(25));
        assert_eq!(card.badge().text().as_deref(), Some("Giảm 25%"));
    }

    #[test]
    fn sold_out_beats_discount() {
        let card = CardPricing::from_attrs("30000", "40000", true);
        assert_eq!(card.badge(), CardBadge::SoldOut);
        assert_eq!(card.badge().text().as_deref(), Some("Tạm hết"));
    }

    #[test]
    fn no_original_price_hides_badge() {
        let card = CardPricing::from_attrs("30000", "", false);
        assert_eq!(card.original_text(), None);
        assert_eq!(card.badge(), CardBadge::Hidden);
    }

    #[test]
    fn sold_out_attributes() {
        assert!(is_sold_out(Some("true"), None));
        assert!(is_sold_out(None, Some("sold_out")));
        assert!(!is_sold_out(Some("false"), Some("available")));
    }
}
