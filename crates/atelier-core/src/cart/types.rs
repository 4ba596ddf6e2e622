//! Cart line items and merge/update/remove rules

use serde::{Deserialize, Serialize};

/// Item type used when the caller does not specify one
pub const DEFAULT_ITEM_TYPE: &str = "print";

/// Upper bound for the quantity of a single line item
pub const MAX_QUANTITY: i64 = 999;

/// One purchasable item and how many of it the visitor wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub print_id: String,
    pub typ: String,
    pub quantity: i64,
}

impl CartItem {
    pub fn new(print_id: impl Into<String>, typ: impl Into<String>, quantity: i64) -> Self {
        Self {
            print_id: print_id.into(),
            typ: typ.into(),
            quantity,
        }
    }

    fn matches(&self, print_id: &str, typ: &str) -> bool {
        self.print_id == print_id && self.typ == typ
    }
}

/// A visitor's cart. Holds at most one item per `(print_id, typ)` pair
/// when built through [`Cart::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all line items
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.quantity))
    }

    /// Clamp every quantity into `1..=MAX_QUANTITY`. Carts arrive from a
    /// client cookie, so nothing about them can be assumed.
    pub fn normalize(&mut self) {
        for item in &mut self.items {
            item.quantity = item.quantity.clamp(1, MAX_QUANTITY);
        }
    }

    /// Add one of `(print_id, typ)`, merging with an existing line item
    pub fn add(&mut self, print_id: &str, typ: &str) {
        match self.items.iter_mut().find(|item| item.matches(print_id, typ)) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1).min(MAX_QUANTITY);
            }
            None => self.items.push(CartItem::new(print_id, typ, 1)),
        }
    }

    /// Overwrite the quantity of `(print_id, typ)` from raw form input.
    /// Non-positive or unparseable input becomes 1.
    pub fn set_quantity(&mut self, print_id: &str, typ: &str, raw: &str) {
        let quantity = parse_quantity(raw);
        for item in self.items.iter_mut().filter(|item| item.matches(print_id, typ)) {
            item.quantity = quantity;
        }
    }

    /// Remove every line item matching `(print_id, typ)`
    pub fn remove(&mut self, print_id: &str, typ: &str) {
        self.items.retain(|item| !item.matches(print_id, typ));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Parse a quantity from form input, clamping into `1..=MAX_QUANTITY`
pub fn parse_quantity(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(quantity) if quantity >= 1 => quantity.min(MAX_QUANTITY),
        _ => 1,
    }
}
