use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::cart::Cart;
use crate::errors::{Error, Result};
use crate::models::{Order, OrderStatus};
use crate::orders;
use crate::store::Store;

/// Turn the cart into an order placed by the session's user
///
/// On success the order is appended to the order history and the cart is
/// emptied. On failure neither happens: if emptying the cart fails after the
/// order was written, the previous history is put back.
pub fn checkout(store: &mut dyn Store, session: &Session, cart: &mut Cart) -> Result<Order> {
    let user = session.user().ok_or(Error::AuthRequired)?;
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let order = Order {
        id: Uuid::new_v4().to_string(),
        user_id: user.email.clone(),
        items: cart.lines().to_vec(),
        total: cart.total(),
        status: OrderStatus::Completed,
        created_at: Utc::now(),
    };

    let previous = orders::append(store, &order)?;
    if let Err(err) = cart.clear(store) {
        warn!("Could not clear cart after order {}: {}", order.id, err);
        orders::restore(store, &previous)?;
        return Err(err);
    }

    info!(
        "Order {} placed by {} for ${:.2}",
        order.id, order.user_id, order.total
    );
    Ok(order)
}
