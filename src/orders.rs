use crate::errors::Result;
use crate::models::{round_cents, Order};
use crate::store::{self, keys, Store};

/// Every order ever placed, oldest first
pub fn history(store: &dyn Store) -> Result<Vec<Order>> {
    Ok(store::load(store, keys::ORDERS)?.unwrap_or_default())
}

/// Orders placed by the user with `email`, oldest first
pub fn for_user(store: &dyn Store, email: &str) -> Result<Vec<Order>> {
    Ok(history(store)?
        .into_iter()
        .filter(|order| order.user_id == email)
        .collect())
}

/// Sum of the totals of `orders`
pub fn total_spent(orders: &[Order]) -> f64 {
    round_cents(orders.iter().map(|order| order.total).sum())
}

pub(crate) fn append(store: &mut dyn Store, order: &Order) -> Result<Vec<Order>> {
    let previous = history(store)?;
    let mut orders = previous.clone();
    orders.push(order.clone());
    store::save(store, keys::ORDERS, &orders)?;
    Ok(previous)
}

pub(crate) fn restore(store: &mut dyn Store, orders: &[Order]) -> Result<()> {
    store::save(store, keys::ORDERS, orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use crate::store::mock::MemoryStore;
    use chrono::Utc;

    fn order(id: &str, user: &str, total: f64) -> Order {
        Order {
            id: id.to_string(),
            user_id: user.to_string(),
            items: Vec::new(),
            total,
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_per_user() {
        let mut store = MemoryStore::new().unwrap();
        assert!(history(&store).unwrap().is_empty());

        append(&mut store, &order("a", "sam@example.com", 12.99)).unwrap();
        append(&mut store, &order("b", "kim@example.com", 6.99)).unwrap();
        append(&mut store, &order("c", "sam@example.com", 20.01)).unwrap();

        assert_eq!(history(&store).unwrap().len(), 3);
        let sams = for_user(&store, "sam@example.com").unwrap();
        let ids: Vec<_> = sams.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(total_spent(&sams), 33.0);
        assert!(for_user(&store, "nobody@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_load_legacy_orders() {
        let mut store = MemoryStore::new().unwrap();
        store
            .set(
                keys::ORDERS,
                r#"[{"id":"1718000000000","userId":"sam@example.com","items":[{"id":"5","name":"Chocolate Shake","price":6.99,"category":"Drinks","description":"Rich","image":"https://example.com/s.jpg","quantity":1}],"total":6.99,"status":"completed","date":"2024-06-10T08:00:00.000Z"}]"#,
            )
            .unwrap();

        let orders = history(&store).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].user_id, "sam@example.com");
        assert_eq!(orders[0].items[0].quantity, 1);
        assert_eq!(orders[0].created_at.to_rfc3339(), "2024-06-10T08:00:00+00:00");
    }
}
