//! Cart Snapshot

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::value_objects::{Money, Quantity};

/// The priced contents of a cart at one moment. Built per request, never
/// persisted; the subtotal is always derived from the items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    items: Vec<CartItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub unit_price: Money,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, unit_price: Money, quantity: Quantity) -> Self {
        Self { product_id: product_id.into(), unit_price, quantity }
    }
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl CartSnapshot {
    pub fn new() -> Self { Self::default() }

    /// Builds a snapshot, merging repeated product ids into one line.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();
        for item in items { cart.add_item(item)?; }
        Ok(cart)
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// `Σ(unit_price × quantity)`, rounded to cents.
    pub fn subtotal(&self) -> Money { self.items.iter().map(CartItem::line_total).sum() }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.checked_add(item.quantity)
                .ok_or_else(|| CartError::QuantityOverflow(item.product_id.clone()))?;
            existing.unit_price = item.unit_price;
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        match Quantity::new(quantity) {
            Ok(qty) => item.quantity = qty,
            Err(_) => self.items.retain(|i| i.product_id != product_id),
        }
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("item not found in cart")]
    ItemNotFound,
    #[error("quantity of {0} is too large")]
    QuantityOverflow(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity { Quantity::new(n).unwrap() }

    #[test]
    fn test_cart_operations() {
        let mut cart = CartSnapshot::new();
        cart.add_item(CartItem::new("P1", Money::from_cents(1000), qty(2))).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), Money::from_cents(2000));
        cart.add_item(CartItem::new("P1", Money::from_cents(1000), qty(1))).unwrap();
        assert_eq!(cart.items()[0].quantity.value(), 3); // Merged
        assert_eq!(cart.subtotal(), Money::from_cents(3000));
    }

    #[test]
    fn test_subtotal_follows_items() {
        let mut cart = CartSnapshot::from_items([
            CartItem::new("P1", Money::from_cents(6000), qty(1)),
            CartItem::new("P2", Money::from_cents(5000), qty(1)),
        ]).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(11000));
        cart.update_quantity("P1", 3).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(23000));
        cart.update_quantity("P1", 0).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(5000));
        assert_eq!(cart.remove_item("P1"), Err(CartError::ItemNotFound));
        cart.remove_item("P2").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_fractional_prices_sum_exactly() {
        let cart = CartSnapshot::from_items([
            CartItem::new("P1", Money::from_cents(10), qty(3)),
            CartItem::new("P2", Money::from_cents(20), qty(1)),
        ]).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(50));
    }

    #[test]
    fn test_merge_overflow_keeps_cart_unchanged() {
        let mut cart = CartSnapshot::from_items([CartItem::new("P1", Money::from_cents(100), qty(u32::MAX))]).unwrap();
        let err = cart.add_item(CartItem::new("P1", Money::from_cents(100), qty(5)));
        assert_eq!(err, Err(CartError::QuantityOverflow("P1".to_string())));
        assert_eq!(cart.items()[0].quantity.value(), u32::MAX);
    }
}
