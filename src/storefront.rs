use tracing::{info, warn};

use crate::auth::{self, Argon2Hasher, PasswordHasher, Session, Signup};
use crate::cart::Cart;
use crate::catalog;
use crate::checkout;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::models::{CartLine, CategoryFilter, Dish, NewDish, Order, Theme, UserProfile};
use crate::orders;
use crate::store::Store;
use crate::theme;

/// Order history of the logged in user
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: UserProfile,
    pub orders: Vec<Order>,
    pub total_spent: f64,
}

/// Figures at the top of the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub dishes: usize,
    pub orders: usize,
    pub users: usize,
}

/// The storefront as one page session sees it
///
/// Owns the store and keeps the session, cart and theme that were loaded
/// from it. Every operation goes through the store before the cached copy
/// changes.
pub struct Storefront<S: Store> {
    store: S,
    config: Config,
    hasher: Box<dyn PasswordHasher>,
    session: Session,
    cart: Cart,
    theme: Theme,
}

impl<S: Store> Storefront<S> {
    /// Open the storefront with the default Argon2 hasher
    pub fn open(store: S, config: Config) -> Result<Self> {
        Self::with_hasher(store, config, Box::new(Argon2Hasher::new()))
    }

    /// Seed the catalog on first run and restore what the last run left
    pub fn with_hasher(
        mut store: S,
        config: Config,
        hasher: Box<dyn PasswordHasher>,
    ) -> Result<Self> {
        catalog::seed(&mut store)?;
        auth::upgrade_directory(&mut store, hasher.as_ref())?;
        auth::upgrade_session(&mut store)?;

        let session = Session::restore(&store)?;
        let cart = Cart::load(&store)?;
        let theme = theme::load(&store)?;
        info!("Storefront ready, {} item(s) in cart", cart.item_count());

        Ok(Storefront {
            store,
            config,
            hasher,
            session,
            cart,
            theme,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // Catalog

    pub fn menu(&self, filter: CategoryFilter) -> Result<Vec<Dish>> {
        catalog::filter(&self.store, filter)
    }

    pub fn featured(&self) -> Result<Vec<Dish>> {
        catalog::featured(&self.store, self.config.featured_count)
    }

    // Cart

    pub fn cart(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.total()
    }

    pub fn cart_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Add one unit of the catalog dish `dish_id` to the cart
    pub fn add_to_cart(&mut self, dish_id: &str) -> Result<()> {
        let dish = catalog::get(&self.store, dish_id)?;
        self.cart.add_item(&mut self.store, &dish)
    }

    pub fn update_quantity(&mut self, dish_id: &str, quantity: i64) -> Result<()> {
        self.cart.set_quantity(&mut self.store, dish_id, quantity)
    }

    pub fn remove_from_cart(&mut self, dish_id: &str) -> Result<()> {
        self.cart.remove_item(&mut self.store, dish_id)
    }

    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear(&mut self.store)
    }

    pub fn checkout(&mut self) -> Result<Order> {
        checkout::checkout(&mut self.store, &self.session, &mut self.cart)
    }

    // Session

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn signup(&mut self, form: Signup) -> Result<UserProfile> {
        auth::signup(&mut self.store, self.hasher.as_ref(), form).map(|user| user.profile())
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserProfile> {
        let user = auth::login(&self.store, self.hasher.as_ref(), email, password)?;
        let profile = user.profile();
        self.session.begin(&mut self.store, profile.clone())?;
        Ok(profile)
    }

    /// Log in as admin without credentials, if the configuration allows it
    pub fn admin_quick_login(&mut self) -> Result<UserProfile> {
        if !self.config.admin_quick_login {
            return Err(Error::AdminQuickLoginDisabled);
        }
        warn!("Admin quick login used");
        let profile = auth::admin_quick_login();
        self.session.begin(&mut self.store, profile.clone())?;
        Ok(profile)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout(&mut self.store)
    }

    pub fn my_orders(&self) -> Result<Profile> {
        let user = self.session.user().ok_or(Error::AuthRequired)?;
        let orders = orders::for_user(&self.store, &user.email)?;
        Ok(Profile {
            user: user.clone(),
            total_spent: orders::total_spent(&orders),
            orders,
        })
    }

    // Theme

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.theme = theme::toggle(&mut self.store, self.theme)?;
        Ok(self.theme)
    }

    // Admin

    pub fn add_dish(&mut self, fields: NewDish) -> Result<Dish> {
        self.require_admin()?;
        catalog::add_dish(&mut self.store, fields)
    }

    pub fn edit_dish(&mut self, id: &str, fields: NewDish) -> Result<Dish> {
        self.require_admin()?;
        catalog::edit_dish(&mut self.store, id, fields)
    }

    pub fn delete_dish(&mut self, id: &str) -> Result<bool> {
        self.require_admin()?;
        catalog::delete_dish(&mut self.store, id)
    }

    pub fn all_orders(&self) -> Result<Vec<Order>> {
        self.require_admin()?;
        orders::history(&self.store)
    }

    pub fn all_users(&self) -> Result<Vec<UserProfile>> {
        self.require_admin()?;
        Ok(auth::users(&self.store, self.hasher.as_ref())?
            .iter()
            .map(|user| user.profile())
            .collect())
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.require_admin()?;
        Ok(DashboardStats {
            dishes: catalog::dishes(&self.store)?.len(),
            orders: orders::history(&self.store)?.len(),
            users: auth::users(&self.store, self.hasher.as_ref())?.len(),
        })
    }

    fn require_admin(&self) -> Result<()> {
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(Error::AdminRequired)
        }
    }
}
