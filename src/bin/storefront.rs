use std::process::ExitCode;

use storefront::cli::{parse_cli_args, AdminCommand, Command, USAGE};
use storefront::config::Config;
use storefront::errors::Result;
use storefront::models::{CartLine, Dish, Order};
use storefront::store::sqlite::SQLiteStore;
use storefront::storefront::Storefront;
use tracing_subscriber::{fmt, EnvFilter};

fn print_dishes(dishes: &[Dish]) {
    if dishes.is_empty() {
        println!("No dishes found in this category");
    }
    for dish in dishes {
        println!(
            "[{}] {} - ${:.2} ({})\n    {}",
            dish.id, dish.name, dish.price, dish.category, dish.description
        );
    }
}

fn print_lines(lines: &[CartLine]) {
    for line in lines {
        println!(
            "  {} x{}  ${:.2}",
            line.dish.name,
            line.quantity,
            line.subtotal()
        );
    }
}

fn print_order(order: &Order) {
    println!(
        "Order {} - {} - {} - ${:.2}",
        order.id,
        order.created_at.format("%Y-%m-%d"),
        order.user_id,
        order.total
    );
    print_lines(&order.items);
}

fn run(shop: &mut Storefront<SQLiteStore>, command: Command) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Menu(filter) => print_dishes(&shop.menu(filter)?),
        Command::Featured => print_dishes(&shop.featured()?),
        Command::Cart => {
            if shop.cart().is_empty() {
                println!("Your cart is empty");
            } else {
                print_lines(shop.cart());
                println!("Total: ${:.2} ({} items)", shop.cart_total(), shop.cart_count());
            }
        }
        Command::Add(dish) => {
            shop.add_to_cart(&dish)?;
            println!("Added to cart ({} items)", shop.cart_count());
        }
        Command::Quantity(dish, quantity) => {
            shop.update_quantity(&dish, quantity)?;
            println!("Cart total: ${:.2}", shop.cart_total());
        }
        Command::Remove(dish) => {
            shop.remove_from_cart(&dish)?;
            println!("Cart total: ${:.2}", shop.cart_total());
        }
        Command::Clear => {
            shop.clear_cart()?;
            println!("Cart cleared");
        }
        Command::Checkout => {
            let order = shop.checkout()?;
            println!(
                "Payment successful! Your order of ${:.2} has been placed",
                order.total
            );
        }
        Command::Signup(args) => {
            let user = shop.signup(args.into())?;
            println!("Account created for {}, you can now log in", user.email);
        }
        Command::Login { email, password } => {
            let user = shop.login(&email, &password)?;
            println!("Welcome back, {}!", user.name);
        }
        Command::AdminLogin => {
            shop.admin_quick_login()?;
            println!("Admin access granted");
        }
        Command::Logout => {
            shop.logout()?;
            println!("Logged out");
        }
        Command::WhoAmI => match shop.current_user() {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None => println!("Not logged in"),
        },
        Command::Orders => {
            let profile = shop.my_orders()?;
            println!(
                "{} order(s), ${:.2} spent",
                profile.orders.len(),
                profile.total_spent
            );
            profile.orders.iter().for_each(print_order);
        }
        Command::Theme { toggle } => {
            let theme = if toggle {
                shop.toggle_theme()?
            } else {
                shop.theme()
            };
            println!("{}", theme.as_str());
        }
        Command::Admin(admin) => run_admin(shop, admin)?,
    }
    Ok(())
}

fn run_admin(shop: &mut Storefront<SQLiteStore>, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Stats => {
            let stats = shop.dashboard_stats()?;
            println!(
                "Dishes: {}\nOrders: {}\nUsers: {}",
                stats.dishes, stats.orders, stats.users
            );
        }
        AdminCommand::Orders => shop.all_orders()?.iter().for_each(print_order),
        AdminCommand::Users => {
            for user in shop.all_users()? {
                println!("{} <{}> ({:?})", user.name, user.email, user.role);
            }
        }
        AdminCommand::AddDish(fields) => {
            let dish = shop.add_dish(fields)?;
            println!("{} has been added to the menu (id {})", dish.name, dish.id);
        }
        AdminCommand::EditDish(id, fields) => {
            let dish = shop.edit_dish(&id, fields)?;
            println!("{} has been updated", dish.name);
        }
        AdminCommand::DeleteDish(id) => {
            if shop.delete_dish(&id)? {
                println!("Dish removed from the menu");
            } else {
                println!("No dish with id {}", id);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let command = match parse_cli_args(std::env::args()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}\n\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    let result = Config::load()
        .and_then(|config| {
            let store = SQLiteStore::open(&config.db_path)?;
            Storefront::open(store, config)
        })
        .and_then(|mut shop| run(&mut shop, command));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
