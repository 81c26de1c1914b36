//! View model for the cart panel (desktop) and cart drawer (mobile).

use tracing::info;
use zs_order_types::{CheckoutSnapshot, LineItem};
use zs_pricing::format_price;

pub const EMPTY_CART_TEXT: &str = "Giỏ hàng trống, đặt gì uống giải khát nha bạn ơi";
const BADGE_CAP: u64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,
    pub item_count: u64,
}

impl CartSummary {
    pub fn compute(cart: &[LineItem], loyalty_enabled: bool, loyalty_points: u64) -> Self {
        let subtotal = cart
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.total));
        let item_count: u64 = cart.iter().map(|item| u64::from(item.quantity.get())).sum();
        let discount = if loyalty_enabled { loyalty_points } else { 0 };
        Self {
            subtotal,
            discount,
            total: subtotal.saturating_sub(discount),
            item_count,
        }
    }

    /// `(n)` next to the cart heading; blank when empty.
    pub fn count_label(&self) -> String {
        if self.item_count > 0 {
            format!("({})", self.item_count)
        } else {
            String::new()
        }
    }

    /// Mobile nav badge; `None` hides it.
    pub fn badge_label(&self) -> Option<String> {
        match self.item_count {
            0 => None,
            n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
            n => Some(n.to_string()),
        }
    }

    pub fn subtotal_label(&self) -> String {
        if self.item_count > 0 {
            format!("Tạm tính ({} phần)", self.item_count)
        } else {
            "Tạm tính".to_owned()
        }
    }

    /// `None` hides the discount row.
    pub fn discount_label(&self) -> Option<String> {
        (self.discount > 0).then(|| format!("- {}", format_price(self.discount)))
    }

    pub fn snapshot(&self, cart: &[LineItem], timestamp_epoch_ms: u64) -> CheckoutSnapshot {
        let snapshot = CheckoutSnapshot {
            cart: cart.to_vec(),
            subtotal: self.subtotal,
            loyalty_points_used: self.discount,
            discount: self.discount,
            total: self.total,
            timestamp_epoch_ms,
        };
        info!(
            "checkout requested: {} lines, total {}",
            snapshot.cart.len(),
            snapshot.total
        );
        snapshot
    }
}

/// One "Label: value" line under a cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRow {
    pub label: String,
    pub value: String,
    pub is_note: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub index: usize,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price_text: String,
    pub meta: Vec<MetaRow>,
}

impl CartRow {
    pub fn from_item(index: usize, item: &LineItem) -> Self {
        let mut meta = Vec::new();
        for (group, choice) in &item.options.single {
            if !choice.label.is_empty() {
                meta.push(MetaRow {
                    label: capitalize(group),
                    value: choice.label.clone(),
                    is_note: false,
                });
            }
        }
        for (group, choices) in &item.options.multi {
            if !choices.is_empty() {
                let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                meta.push(MetaRow {
                    label: capitalize(group),
                    value: labels.join(", "),
                    is_note: false,
                });
            }
        }
        if !item.note.is_empty() {
            meta.push(MetaRow {
                label: "Ghi chú".to_owned(),
                value: item.note.clone(),
                is_note: true,
            });
        }

        Self {
            index,
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity.get(),
            price_text: format_price(item.total),
            meta,
        }
    }
}

pub fn rows(cart: &[LineItem]) -> Vec<CartRow> {
    cart.iter()
        .enumerate()
        .map(|(i, item)| CartRow::from_item(i, item))
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zs_order_types::{OptionChoice, Quantity, SelectedOptions};

    fn line(base: u64, options_price: u64, qty: i64) -> LineItem {
        let mut options = SelectedOptions::default();
        if options_price > 0 {
            options
                .single
                .insert("size".into(), OptionChoice::new("L", options_price));
        }
        LineItem::new("Latte", "", base, options, Quantity::clamped(qty))
    }

    #[test]
    fn empty_cart_summary() {
        let summary = CartSummary::compute(&[], true, 300);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.count_label(), "");
        assert_eq!(summary.badge_label(), None);
        assert_eq!(summary.subtotal_label(), "Tạm tính");
    }

    #[test]
    fn subtotal_saturates_across_lines() {
        let cart = vec![line(u64::MAX / 2 + 1, 0, 1), line(u64::MAX / 2 + 1, 0, 1)];
        let summary = CartSummary::compute(&cart, true, 300);
        assert_eq!(summary.subtotal, u64::MAX);
        assert_eq!(summary.total, u64::MAX - 300);
    }

    #[test]
    fn first_item_scenario() {
        let cart = vec![line(30000, 5000, 2)];
        let summary = CartSummary::compute(&cart, false, 300);
        assert_eq!(summary.subtotal, 70000);
        assert_eq!(summary.total, 70000);
        assert_eq!(summary.count_label(), "(2)");
        assert_eq!(summary.badge_label().as_deref(), Some("2"));
        assert_eq!(summary.subtotal_label(), "Tạm tính (2 phần)");
        assert_eq!(summary.discount_label(), None);
    }

    #[test]
    fn loyalty_toggle_subtracts_and_floors_at_zero() {
        let cart = vec![line(1000, 0, 1)];
        let on = CartSummary::compute(&cart, true, 300);
        assert_eq!(on.total, 700);
        assert_eq!(on.discount_label().as_deref(), Some("- 300 Đ"));
        assert_eq!(CartSummary::compute(&cart, false, 300).total, 1000);

        let cheap = vec![line(100, 0, 1)];
        assert_eq!(CartSummary::compute(&cheap, true, 300).total, 0);
    }

    #[test]
    fn badge_caps_at_ninety_nine() {
        let cart = vec![line(1000, 0, 99), line(1000, 0, 1)];
        let summary = CartSummary::compute(&cart, false, 300);
        assert_eq!(summary.item_count, 100);
        assert_eq!(summary.badge_label().as_deref(), Some("99+"));
        assert_eq!(summary.count_label(), "(100)");
    }

    #[test]
    fn rows_list_options_and_note() {
        let mut options = SelectedOptions::default();
        options
            .single
            .insert("đường".into(), OptionChoice::new("50%", 0));
        options.multi.insert(
            "topping".into(),
            vec![OptionChoice::new("Pearl", 3000), OptionChoice::new("Jelly", 3000)],
        );
        let item = LineItem::new("Trà sữa", "/ts.png", 30000, options, Quantity::default())
            .with_note("ít đá");

        let row = CartRow::from_item(0, &item);
        assert_eq!(row.price_text, "36.000 Đ");
        let meta: Vec<_> = row
            .meta
            .iter()
            .map(|m| (m.label.as_str(), m.value.as_str()))
            .collect();
        assert_eq!(
            meta,
            [("Đường", "50%"), ("Topping", "Pearl, Jelly"), ("Ghi chú", "ít đá")]
        );
        assert!(row.meta[2].is_note);
    }

    #[test]
    fn snapshot_carries_totals() {
        let cart = vec![line(1000, 0, 2)];
        let summary = CartSummary::compute(&cart, true, 300);
        let snapshot = summary.snapshot(&cart, 1_700_000_000_000);
        assert_eq!(snapshot.subtotal, 2000);
        assert_eq!(snapshot.discount, 300);
        assert_eq!(snapshot.loyalty_points_used, 300);
        assert_eq!(snapshot.total, 1700);
        assert_eq!(snapshot.cart.len(), 1);
    }
}
