// Records kept in the store. Field names follow the JSON blobs the storefront
// has always written, so older data keeps deserializing.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Menu section a dish is listed under
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
    Drinks,
    Desserts,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Veg,
        Category::NonVeg,
        Category::Drinks,
        Category::Desserts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Veg => "Veg",
            Category::NonVeg => "Non-Veg",
            Category::Drinks => "Drinks",
            Category::Desserts => "Desserts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "veg" => Ok(Category::Veg),
            "non-veg" | "nonveg" | "non_veg" => Ok(Category::NonVeg),
            "drinks" => Ok(Category::Drinks),
            "desserts" => Ok(Category::Desserts),
            _ => Err(Error::InvalidInput(format!("unknown category '{}'", s))),
        }
    }
}

/// Category selector of the menu page. `All` lets every dish through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, dish: &Dish) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => dish.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// A dish of the catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dish {
    /// Unique within the catalog, assigned on creation
    pub id: String,
    pub name: String,
    /// Unit price, never negative
    pub price: f64,
    pub category: Category,
    pub description: String,
    /// URL of the dish picture
    pub image: String,
}

/// Everything about a dish except its id, as entered in the admin form
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewDish {
    pub name: String,
    pub price: f64,
    pub category: Category,
    pub description: String,
    pub image: String,
}

impl NewDish {
    pub(crate) fn into_dish(self, id: String) -> Dish {
        Dish {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            image: self.image,
        }
    }
}

/// One cart entry. The dish fields are copied in, so later catalog edits do
/// not change what is already in a cart or an order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartLine {
    #[serde(flatten)]
    pub dish: Dish,
    /// Always at least 1
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.dish.price * f64::from(self.quantity)
    }
}

/// Sum of price times quantity over `lines`, rounded to cents
pub fn lines_total(lines: &[CartLine]) -> f64 {
    round_cents(lines.iter().map(CartLine::subtotal).sum())
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// An entry of the user directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Unique within the directory
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
        }
    }
}

/// A user without credentials. This is what the session remembers and what
/// the admin user list shows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
}

/// A completed purchase. Never changes once recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    /// Email of the user who placed the order
    #[serde(rename = "userId")]
    pub user_id: String,
    pub items: Vec<CartLine>,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(Error::InvalidInput(format!("unknown theme '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(id: &str, price: f64) -> Dish {
        Dish {
            id: id.to_string(),
            name: format!("Dish {}", id),
            price,
            category: Category::Veg,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_lines_total() {
        let lines = vec![
            CartLine {
                dish: dish("1", 12.99),
                quantity: 2,
            },
            CartLine {
                dish: dish("4", 9.99),
                quantity: 1,
            },
        ];
        assert_eq!(lines_total(&lines), 35.97);
        assert_eq!(lines_total(&[]), 0.0);
    }

    #[test]
    fn test_cart_line_is_flat() {
        let line = CartLine {
            dish: dish("1", 12.99),
            quantity: 3,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["category"], "Veg");

        let back: CartLine = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Non-Veg".parse::<Category>().unwrap(), Category::NonVeg);
        assert_eq!("drinks".parse::<Category>().unwrap(), Category::Drinks);
        assert!("pizza".parse::<Category>().is_err());
        assert_eq!(
            serde_json::to_string(&Category::NonVeg).unwrap(),
            "\"Non-Veg\""
        );

        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "desserts".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Desserts)
        );
    }

    #[test]
    fn test_category_filter() {
        let mut burger = dish("1", 12.99);
        burger.category = Category::NonVeg;
        let salad = dish("4", 9.99);

        assert!(CategoryFilter::All.matches(&burger));
        assert!(CategoryFilter::Only(Category::NonVeg).matches(&burger));
        assert!(!CategoryFilter::Only(Category::NonVeg).matches(&salad));
    }

    #[test]
    fn test_profile_defaults() {
        // What the admin shortcut used to leave in the session: no id, no avatar
        let raw = r#"{"email":"admin@holysmokes.com","name":"Admin","role":"admin"}"#;
        let profile: UserProfile = serde_json::from_str(raw).unwrap();
        assert!(profile.is_admin());
        assert!(profile.id.is_empty());
        assert_eq!(profile.avatar, None);
    }

    #[test]
    fn test_theme() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
