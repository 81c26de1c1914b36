use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantity of a cart line, always within `[Quantity::MIN, Quantity::MAX]`.
///
/// Deserializing an out-of-range number clamps instead of failing, so a hand
/// edited `pos_cart` entry never poisons the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 99;

    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Step by `delta`, clamping at both bounds.
    pub fn step(self, delta: i64) -> Self {
        Self::clamped(self.0 as i64 + delta)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<i64> for Quantity {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub label: String,
    #[serde(default)]
    pub price: u64,
}

impl OptionChoice {
    pub fn new(label: impl Into<String>, price: u64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

/// Options picked in the product modal, keyed by option-group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOptions {
    #[serde(default)]
    pub single: BTreeMap<String, OptionChoice>,
    #[serde(default)]
    pub multi: BTreeMap<String, Vec<OptionChoice>>,
}

impl SelectedOptions {
    /// Sum of every selected surcharge, single and multi.
    pub fn surcharge(&self) -> u64 {
        self.single
            .values()
            .chain(self.multi.values().flatten())
            .fold(0u64, |acc, c| acc.saturating_add(c.price))
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.values().all(Vec::is_empty)
    }

    /// Number of selections recorded for `group`.
    pub fn count_in(&self, group: &str) -> usize {
        if self.single.contains_key(group) {
            return 1;
        }
        self.multi.get(group).map_or(0, Vec::len)
    }
}

/// One cart line. Field names match the JSON stored under `pos_cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Product slug, kept so the line can be reopened for editing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(rename = "qty", alias = "quantity", default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub base_price: u64,
    #[serde(default)]
    pub options_price: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub options: SelectedOptions,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        base_price: u64,
        options: SelectedOptions,
        quantity: Quantity,
    ) -> Self {
        let options_price = options.surcharge();
        let mut item = Self {
            name: name.into(),
            image: image.into(),
            slug: None,
            quantity,
            note: String::new(),
            base_price,
            options_price,
            total: 0,
            options,
        };
        item.recompute();
        item
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Unit price including options.
    ///
    /// Prices come from hand-editable storage, so the arithmetic saturates
    /// instead of overflowing.
    pub fn unit_price(&self) -> u64 {
        self.base_price.saturating_add(self.options_price)
    }

    pub fn line_total(&self) -> u64 {
        self.unit_price().saturating_mul(u64::from(self.quantity.get()))
    }

    pub fn recompute(&mut self) {
        self.total = self.line_total();
    }

    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.recompute();
    }

    /// True when the stored total matches the price formula.
    pub fn is_consistent(&self) -> bool {
        self.total == self.line_total()
    }
}

pub type Cart = Vec<LineItem>;

/// Logged when the shopper presses the payment button.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub cart: Cart,
    pub subtotal: u64,
    pub loyalty_points_used: u64,
    pub discount: u64,
    pub total: u64,
    pub timestamp_epoch_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> SelectedOptions {
        let mut options = SelectedOptions::default();
        options
            .single
            .insert("size".to_owned(), OptionChoice::new("L", 3000));
        options.multi.insert(
            "topping".to_owned(),
            vec![OptionChoice::new("Pearl", 1000), OptionChoice::new("Jelly", 1000)],
        );
        options
    }

    #[test]
    fn quantity_clamps_into_bounds() {
        assert_eq!(Quantity::clamped(0).get(), 1);
        assert_eq!(Quantity::clamped(-4).get(), 1);
        assert_eq!(Quantity::clamped(150).get(), 99);
        assert_eq!(Quantity::default().step(-1).get(), 1);
        assert_eq!(Quantity::clamped(98).step(5).get(), 99);
    }

    #[test]
    fn new_line_item_computes_total() {
        let item = LineItem::new("Latte", "/img/latte.png", 30000, sample_options(), Quantity::clamped(2));
        assert_eq!(item.options_price, 5000);
        assert_eq!(item.total, 70000);
        assert!(item.is_consistent());
    }

    #[test]
    fn set_quantity_recomputes_total() {
        let mut item = LineItem::new("Latte", "", 25000, SelectedOptions::default(), Quantity::default());
        item.set_quantity(Quantity::clamped(3));
        assert_eq!(item.total, 75000);
    }

    #[test]
    fn huge_stored_prices_saturate() {
        let raw = r#"{"name":"Latte","qty":1,"basePrice":10000000000000000000,"optionsPrice":10000000000000000000}"#;
        let mut item: LineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.unit_price(), u64::MAX);
        item.set_quantity(Quantity::clamped(2));
        assert_eq!(item.total, u64::MAX);
        assert!(item.is_consistent());

        let mut options = SelectedOptions::default();
        options
            .single
            .insert("size".to_owned(), OptionChoice::new("XL", u64::MAX));
        options
            .multi
            .insert("topping".to_owned(), vec![OptionChoice::new("Gold", 1)]);
        assert_eq!(options.surcharge(), u64::MAX);
    }

    #[test]
    fn deserializes_stored_cart_shape() {
        let raw = r#"[{
            "name": "Bac Xiu",
            "image": "/img/bx.png",
            "qty": 120,
            "note": "less ice",
            "basePrice": 29000,
            "optionsPrice": 0,
            "total": 2871000,
            "options": { "single": { "size": { "label": "M", "price": 0 } }, "multi": {} }
        }]"#;
        let cart: Cart = serde_json::from_str(raw).unwrap();
        assert_eq!(cart[0].quantity.get(), 99);
        assert_eq!(cart[0].options.count_in("size"), 1);
        assert_eq!(cart[0].slug, None);

        let back = serde_json::to_value(&cart[0]).unwrap();
        assert_eq!(back["qty"], 99);
        assert_eq!(back["basePrice"], 29000);
        assert!(back.get("slug").is_none());
    }
}
