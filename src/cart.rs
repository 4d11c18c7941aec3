use tracing::debug;

use crate::errors::Result;
use crate::models::{lines_total, CartLine, Dish};
use crate::store::{self, keys, Store};

/// The shopping cart
///
/// Every mutation writes the new list of lines to the store before
/// returning. The new list is only installed in memory once the write went
/// through, so a failing store never leaves the two out of step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Cart left in the store by a previous run, empty if there is none
    pub fn load(store: &dyn Store) -> Result<Self> {
        let lines = store::load::<Vec<CartLine>>(store, keys::CART)?.unwrap_or_default();
        Ok(Cart { lines })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `dish`, appending a new line if it is not in the cart yet
    pub fn add_item(&mut self, store: &mut dyn Store, dish: &Dish) -> Result<()> {
        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|line| line.dish.id == dish.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => lines.push(CartLine {
                dish: dish.clone(),
                quantity: 1,
            }),
        }
        debug!("Added {} to cart", dish.id);
        self.commit(store, lines)
    }

    /// Set the quantity of the line for `dish_id`. Zero or less removes it.
    ///
    /// Setting the quantity of a dish that is not in the cart does nothing.
    pub fn set_quantity(
        &mut self,
        store: &mut dyn Store,
        dish_id: &str,
        quantity: i64,
    ) -> Result<()> {
        if quantity <= 0 {
            return self.remove_item(store, dish_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let mut lines = self.lines.clone();
        if let Some(line) = lines.iter_mut().find(|line| line.dish.id == dish_id) {
            line.quantity = quantity;
        }
        self.commit(store, lines)
    }

    /// Drop the line for `dish_id`, if any
    pub fn remove_item(&mut self, store: &mut dyn Store, dish_id: &str) -> Result<()> {
        let lines = self
            .lines
            .iter()
            .filter(|line| line.dish.id != dish_id)
            .cloned()
            .collect();
        self.commit(store, lines)
    }

    pub fn clear(&mut self, store: &mut dyn Store) -> Result<()> {
        store.remove(keys::CART)?;
        self.lines.clear();
        Ok(())
    }

    /// Price of everything in the cart, in dollars
    pub fn total(&self) -> f64 {
        lines_total(&self.lines)
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    fn commit(&mut self, store: &mut dyn Store, lines: Vec<CartLine>) -> Result<()> {
        store::save(store, keys::CART, &lines)?;
        self.lines = lines;
        Ok(())
    }
}
