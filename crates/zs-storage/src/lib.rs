use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};
use zs_order_types::{Cart, LineItem, Quantity};

pub const CART_KEY: &str = "pos_cart";
pub const SEARCH_HISTORY_KEY: &str = "product_search_history";
pub const SEARCH_HISTORY_LIMIT: usize = 5;
const MIN_HISTORY_TERM_CHARS: usize = 2;

/// String key-value storage with `localStorage` semantics.
///
/// Implementations are single-threaded; the browser gives each tab one writer.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Default)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read a JSON list from `key`, treating absence, store errors and corrupt
/// JSON alike as an empty list.
fn load_list<S, T>(store: &S, key: &str) -> Vec<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("storage read failed for {}: {}", key, err);
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("discarding corrupt {} entry: {}", key, err);
        Vec::new()
    })
}

fn save_list<S, T>(store: &S, key: &str, list: &[T]) -> Result<()>
where
    S: KeyValueStore,
    T: Serialize,
{
    let raw = serde_json::to_string(list)?;
    store.set(key, &raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Updated(LineItem),
    Removed,
    Missing,
}

/// The cart persisted as one JSON array.
///
/// Every mutation is load → modify → save; nothing is cached between calls.
pub struct CartStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, CART_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn load(&self) -> Cart {
        load_list(&self.store, &self.key)
    }

    pub fn save(&self, cart: &[LineItem]) -> Result<()> {
        save_list(&self.store, &self.key, cart)
    }

    pub fn append(&self, mut item: LineItem) -> Result<()> {
        item.recompute();
        let mut cart = self.load();
        cart.push(item);
        self.save(&cart)
    }

    /// Remove the line at `index`. Returns `false` (and writes nothing) when out of range.
    pub fn remove_at(&self, index: usize) -> Result<bool> {
        let mut cart = self.load();
        if index >= cart.len() {
            return Ok(false);
        }
        cart.remove(index);
        self.save(&cart)?;
        debug!("removed cart line {}", index);
        Ok(true)
    }

    pub fn replace_at(&self, index: usize, mut item: LineItem) -> Result<bool> {
        let mut cart = self.load();
        let Some(slot) = cart.get_mut(index) else {
            return Ok(false);
        };
        item.recompute();
        *slot = item;
        self.save(&cart)?;
        Ok(true)
    }

    /// Cart panel stepper: stepping below 1 removes the line instead of clamping.
    pub fn step_quantity(&self, index: usize, delta: i64) -> Result<StepOutcome> {
        let mut cart = self.load();
        let Some(item) = cart.get_mut(index) else {
            return Ok(StepOutcome::Missing);
        };

        let next = i64::from(item.quantity.get()) + delta;
        if next < i64::from(Quantity::MIN) {
            cart.remove(index);
            self.save(&cart)?;
            return Ok(StepOutcome::Removed);
        }

        item.set_quantity(Quantity::clamped(next));
        let updated = item.clone();
        self.save(&cart)?;
        Ok(StepOutcome::Updated(updated))
    }

    /// Typed quantity entry. Unparsable or sub-minimum input becomes 1.
    pub fn set_quantity(&self, index: usize, raw: &str) -> Result<Option<LineItem>> {
        let quantity = Quantity::clamped(raw.trim().parse::<i64>().unwrap_or(1));
        let mut cart = self.load();
        let Some(item) = cart.get_mut(index) else {
            return Ok(None);
        };
        item.set_quantity(quantity);
        let updated = item.clone();
        self.save(&cart)?;
        Ok(Some(updated))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

/// Recent search terms, most recent first.
pub struct SearchHistory<S> {
    store: S,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, SEARCH_HISTORY_KEY, SEARCH_HISTORY_LIMIT)
    }

    pub fn with_key(store: S, key: impl Into<String>, limit: usize) -> Self {
        Self {
            store,
            key: key.into(),
            limit,
        }
    }

    pub fn entries(&self) -> Vec<String> {
        load_list(&self.store, &self.key)
    }

    /// Record a term. Terms under two characters are not worth remembering.
    pub fn push(&self, term: &str) -> Result<()> {
        let term = term.trim();
        if term.chars().count() < MIN_HISTORY_TERM_CHARS {
            return Ok(());
        }

        let mut history = self.entries();
        history.retain(|existing| existing != term);
        history.insert(0, term.to_owned());
        history.truncate(self.limit);
        save_list(&self.store, &self.key, &history)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zs_order_types::SelectedOptions;

    fn item(name: &str, base: u64, qty: i64) -> LineItem {
        LineItem::new(name, "", base, SelectedOptions::default(), Quantity::clamped(qty))
    }

    #[test]
    fn load_falls_back_to_empty() -> anyhow::Result<()> {
        let store = Rc::new(InMemoryStore::default());
        let cart = CartStore::new(store.clone());
        assert!(cart.load().is_empty());

        store.set(CART_KEY, "{not json")?;
        assert!(cart.load().is_empty());
        Ok(())
    }

    #[test]
    fn append_then_remove_shifts_indices() -> anyhow::Result<()> {
        let cart = CartStore::new(InMemoryStore::default());
        cart.append(item("Latte", 30000, 1))?;
        cart.append(item("Mocha", 35000, 1))?;
        cart.append(item("Tea", 20000, 1))?;

        assert!(cart.remove_at(1)?);
        let names: Vec<_> = cart.load().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Latte", "Tea"]);

        assert!(!cart.remove_at(2)?);
        assert_eq!(cart.load().len(), 2);
        Ok(())
    }

    #[test]
    fn stepping_below_one_removes_line() -> anyhow::Result<()> {
        let cart = CartStore::new(InMemoryStore::default());
        cart.append(item("Latte", 30000, 1))?;
        cart.append(item("Mocha", 35000, 2))?;

        assert_eq!(cart.step_quantity(0, -1)?, StepOutcome::Removed);
        assert_eq!(cart.load().len(), 1);

        let StepOutcome::Updated(mocha) = cart.step_quantity(0, 1)? else {
            panic!("expected update");
        };
        assert_eq!(mocha.quantity.get(), 3);
        assert_eq!(mocha.total, 105000);
        assert_eq!(cart.load()[0], mocha);

        assert_eq!(cart.step_quantity(7, 1)?, StepOutcome::Missing);
        Ok(())
    }

    #[test]
    fn stepping_a_hand_edited_price_does_not_overflow() -> anyhow::Result<()> {
        let store = Rc::new(InMemoryStore::default());
        store.set(
            CART_KEY,
            r#"[{"name":"Latte","qty":1,"basePrice":10000000000000000000,"total":0}]"#,
        )?;
        let cart = CartStore::new(store.clone());

        let StepOutcome::Updated(latte) = cart.step_quantity(0, 1)? else {
            panic!("expected update");
        };
        assert_eq!(latte.quantity.get(), 2);
        assert_eq!(latte.total, u64::MAX);
        assert_eq!(cart.set_quantity(0, "99")?.map(|i| i.total), Some(u64::MAX));
        Ok(())
    }

    #[test]
    fn stepping_up_clamps_at_max() -> anyhow::Result<()> {
        let cart = CartStore::new(InMemoryStore::default());
        cart.append(item("Latte", 1000, 99))?;
        let StepOutcome::Updated(latte) = cart.step_quantity(0, 1)? else {
            panic!("expected update");
        };
        assert_eq!(latte.quantity.get(), 99);
        assert!(latte.is_consistent());
        Ok(())
    }

    #[test]
    fn typed_quantity_never_removes() -> anyhow::Result<()> {
        let cart = CartStore::new(InMemoryStore::default());
        cart.append(item("Latte", 1000, 4))?;

        let updated = cart.set_quantity(0, "0")?.expect("line exists");
        assert_eq!(updated.quantity.get(), 1);
        let updated = cart.set_quantity(0, "abc")?.expect("line exists");
        assert_eq!(updated.total, 1000);
        let updated = cart.set_quantity(0, " 250 ")?.expect("line exists");
        assert_eq!(updated.quantity.get(), 99);
        assert!(cart.set_quantity(3, "2")?.is_none());
        Ok(())
    }

    #[test]
    fn replace_at_recomputes_total() -> anyhow::Result<()> {
        let cart = CartStore::new(InMemoryStore::default());
        cart.append(item("Latte", 1000, 1))?;

        let mut edited = item("Latte", 1000, 1);
        edited.quantity = Quantity::clamped(5);
        assert!(cart.replace_at(0, edited)?);
        assert_eq!(cart.load()[0].total, 5000);
        assert!(!cart.replace_at(1, item("x", 1, 1))?);
        Ok(())
    }

    #[test]
    fn history_dedupes_and_caps() -> anyhow::Result<()> {
        let history = SearchHistory::new(InMemoryStore::default());
        history.push("latte")?;
        history.push("latte")?;
        assert_eq!(history.entries(), ["latte"]);

        for term in ["mocha", "tea", "bac xiu", "cold brew", "latte", "matcha"] {
            history.push(term)?;
        }
        assert_eq!(
            history.entries(),
            ["matcha", "latte", "cold brew", "bac xiu", "tea"]
        );

        history.push("x")?;
        assert_eq!(history.entries().len(), 5);

        history.clear()?;
        assert!(history.entries().is_empty());
        Ok(())
    }

    #[test]
    fn cart_and_history_share_a_store() -> anyhow::Result<()> {
        let store = Rc::new(InMemoryStore::default());
        let cart = CartStore::new(store.clone());
        let history = SearchHistory::new(store.clone());

        cart.append(item("Latte", 1000, 1))?;
        history.push("latte")?;
        cart.clear()?;

        assert!(cart.load().is_empty());
        assert_eq!(history.entries(), ["latte"]);
        assert!(store.get(SEARCH_HISTORY_KEY)?.is_some());
        Ok(())
    }
}
