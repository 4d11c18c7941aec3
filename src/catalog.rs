use tracing::info;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{Category, CategoryFilter, Dish, NewDish};
use crate::store::{self, keys, Store};

/// Dishes written on first run, when the store holds no catalog yet
pub fn default_dishes() -> Vec<Dish> {
    let dish = |id: &str,
                name: &str,
                price: f64,
                category: Category,
                description: &str,
                photo: &str| Dish {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category,
        description: description.to_string(),
        image: format!(
            "https://images.unsplash.com/photo-{}?w=500&h=500&fit=crop",
            photo
        ),
    };

    vec![
        dish(
            "1",
            "Classic Burger",
            12.99,
            Category::NonVeg,
            "Juicy beef patty with fresh lettuce, tomatoes, and our special sauce",
            "1568901346375-23c9450c58cd",
        ),
        dish(
            "2",
            "Margherita Pizza",
            14.99,
            Category::Veg,
            "Fresh mozzarella, tomatoes, and basil on a crispy crust",
            "1574071318508-1cdbab80d002",
        ),
        dish(
            "3",
            "Grilled Chicken",
            16.99,
            Category::NonVeg,
            "Tender grilled chicken breast with herbs and spices",
            "1598103442097-8b74394b95c6",
        ),
        dish(
            "4",
            "Caesar Salad",
            9.99,
            Category::Veg,
            "Crisp romaine lettuce with parmesan and croutons",
            "1546793665-c74683f339c1",
        ),
        dish(
            "5",
            "Chocolate Shake",
            6.99,
            Category::Drinks,
            "Rich and creamy chocolate milkshake",
            "1572490122747-3968b75cc699",
        ),
        dish(
            "6",
            "Tiramisu",
            8.99,
            Category::Desserts,
            "Classic Italian dessert with coffee and mascarpone",
            "1571877227200-a0d98ea607e9",
        ),
    ]
}

/// Write the default dishes unless a catalog is already stored
///
/// Returns whether the seed was written.
pub fn seed(store: &mut dyn Store) -> Result<bool> {
    if store.get(keys::DISHES)?.is_some() {
        return Ok(false);
    }
    let dishes = default_dishes();
    store::save(store, keys::DISHES, &dishes)?;
    info!("Seeded catalog with {} dishes", dishes.len());
    Ok(true)
}

/// Every dish, in catalog order
pub fn dishes(store: &dyn Store) -> Result<Vec<Dish>> {
    Ok(store::load(store, keys::DISHES)?.unwrap_or_default())
}

/// Dishes matching `filter`, in catalog order
pub fn filter(store: &dyn Store, filter: CategoryFilter) -> Result<Vec<Dish>> {
    Ok(dishes(store)?
        .into_iter()
        .filter(|dish| filter.matches(dish))
        .collect())
}

/// The first `count` dishes of the catalog
pub fn featured(store: &dyn Store, count: usize) -> Result<Vec<Dish>> {
    Ok(dishes(store)?.into_iter().take(count).collect())
}

pub fn get(store: &dyn Store, id: &str) -> Result<Dish> {
    dishes(store)?
        .into_iter()
        .find(|dish| dish.id == id)
        .ok_or_else(|| Error::NotFound(format!("No dish with id {}", id)))
}

/// Append a dish under a freshly generated id
pub fn add_dish(store: &mut dyn Store, fields: NewDish) -> Result<Dish> {
    validate(&fields)?;
    let mut dishes = dishes(store)?;
    let dish = fields.into_dish(Uuid::new_v4().to_string());
    dishes.push(dish.clone());
    store::save(store, keys::DISHES, &dishes)?;

    info!("Added dish {} ({})", dish.name, dish.id);
    Ok(dish)
}

/// Replace every field but the id of the dish `id`
pub fn edit_dish(store: &mut dyn Store, id: &str, fields: NewDish) -> Result<Dish> {
    validate(&fields)?;
    let mut dishes = dishes(store)?;
    let slot = dishes
        .iter_mut()
        .find(|dish| dish.id == id)
        .ok_or_else(|| Error::NotFound(format!("No dish with id {}", id)))?;
    *slot = fields.into_dish(id.to_string());
    let dish = slot.clone();
    store::save(store, keys::DISHES, &dishes)?;

    info!("Updated dish {} ({})", dish.name, dish.id);
    Ok(dish)
}

/// Remove the dish `id`. Returns false if there was no such dish.
pub fn delete_dish(store: &mut dyn Store, id: &str) -> Result<bool> {
    let mut dishes = dishes(store)?;
    let old_len = dishes.len();
    dishes.retain(|dish| dish.id != id);
    if dishes.len() == old_len {
        return Ok(false);
    }

    store::save(store, keys::DISHES, &dishes)?;
    info!("Deleted dish {}", id);
    Ok(true)
}

fn validate(fields: &NewDish) -> Result<()> {
    if fields.name.trim().is_empty() {
        return Err(Error::InvalidInput("dish name must not be empty".to_string()));
    }
    if !fields.price.is_finite() || fields.price < 0.0 {
        return Err(Error::InvalidInput(format!(
            "price must be a non-negative amount, got {}",
            fields.price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MemoryStore;

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new().unwrap();
        assert!(seed(&mut store).unwrap());
        store
    }

    fn fields(name: &str, price: f64) -> NewDish {
        NewDish {
            name: name.to_string(),
            price,
            category: Category::Drinks,
            description: "Fresh".to_string(),
            image: "https://example.com/lemonade.jpg".to_string(),
        }
    }

    #[test]
    fn test_seed_only_once() {
        let mut store = seeded();
        assert_eq!(dishes(&store).unwrap().len(), 6);

        delete_dish(&mut store, "1").unwrap();
        assert!(!seed(&mut store).unwrap());
        assert_eq!(dishes(&store).unwrap().len(), 5);
    }

    #[test]
    fn test_seed_respects_empty_catalog() {
        let mut store = MemoryStore::new().unwrap();
        store::save(&mut store, keys::DISHES, &Vec::<Dish>::new()).unwrap();
        assert!(!seed(&mut store).unwrap());
        assert!(dishes(&store).unwrap().is_empty());
    }

    #[test]
    fn test_filter() {
        let store = seeded();
        let non_veg = filter(&store, CategoryFilter::Only(Category::NonVeg)).unwrap();
        let names: Vec<_> = non_veg.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Classic Burger", "Grilled Chicken"]);

        assert_eq!(filter(&store, CategoryFilter::All).unwrap().len(), 6);
        assert_eq!(
            filter(&store, CategoryFilter::Only(Category::Desserts))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_featured() {
        let store = seeded();
        let featured = featured(&store, 3).unwrap();
        let ids: Vec<_> = featured.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(super::featured(&store, 10).unwrap().len(), 6);
    }

    #[test]
    fn test_add_dish() {
        let mut store = seeded();
        let first = add_dish(&mut store, fields("Lemonade", 3.5)).unwrap();
        let second = add_dish(&mut store, fields("Lemonade", 3.5)).unwrap();
        assert_ne!(first.id, second.id);

        let all = dishes(&store).unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(all[6], first);
        assert_eq!(get(&store, &second.id).unwrap(), second);
    }

    #[test]
    fn test_add_dish_validation() {
        let mut store = seeded();
        assert!(matches!(
            add_dish(&mut store, fields("", 1.0)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            add_dish(&mut store, fields("Water", -1.0)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            add_dish(&mut store, fields("Water", f64::NAN)),
            Err(Error::InvalidInput(_))
        ));
        assert!(add_dish(&mut store, fields("Water", 0.0)).is_ok());
    }

    #[test]
    fn test_edit_dish() {
        let mut store = seeded();
        let edited = edit_dish(&mut store, "4", fields("Greek Salad", 10.5)).unwrap();
        assert_eq!(edited.id, "4");
        assert_eq!(edited.category, Category::Drinks);

        let all = dishes(&store).unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[3], edited);

        assert!(matches!(
            edit_dish(&mut store, "42", fields("Ghost", 1.0)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_dish() {
        let mut store = seeded();
        assert!(delete_dish(&mut store, "2").unwrap());
        assert!(!delete_dish(&mut store, "2").unwrap());
        assert!(matches!(get(&store, "2"), Err(Error::NotFound(_))));
        assert_eq!(dishes(&store).unwrap().len(), 5);
    }
}
