use crate::auth::Signup;
use crate::models::{CategoryFilter, NewDish};

/// Errors that can occur when parsing the command line arguments
#[derive(Debug, Clone, PartialEq)]
pub enum CLIError {
    MissingParameter(&'static str),
    InvalidParameter(&'static str),
    UnknownCommand(String),
}

impl std::fmt::Display for CLIError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CLIError::MissingParameter(missing) => write!(f, "Missing parameter '{}'", missing),
            CLIError::InvalidParameter(name) => write!(f, "Invalid parameter '{}'", name),
            CLIError::UnknownCommand(command) => write!(f, "Unknown command '{}'", command),
        }
    }
}

impl std::error::Error for CLIError {}

pub const USAGE: &str = "\
usage: storefront <command> [args]

  menu [category]              list dishes (all, veg, non-veg, drinks, desserts)
  featured                     dishes shown on the home page
  cart                         show the cart
  add <dish>                   add one unit of a dish
  qty <dish> <n>               set a quantity, 0 removes the line
  remove <dish>                remove a line
  clear                        empty the cart
  checkout                     place an order for the cart
  signup <name> <email> <password> <confirm>
  login <email> <password>
  admin-login                  admin shortcut, needs STOREFRONT_ADMIN_QUICK_LOGIN=true
  logout
  whoami
  orders                       your order history
  theme [toggle]
  admin stats|orders|users
  admin add-dish <name> <price> <category> <description> <image>
  admin edit-dish <id> <name> <price> <category> <description> <image>
  admin delete-dish <id>";

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Menu(CategoryFilter),
    Featured,
    Cart,
    Add(String),
    Quantity(String, i64),
    Remove(String),
    Clear,
    Checkout,
    Signup(SignupArgs),
    Login { email: String, password: String },
    AdminLogin,
    Logout,
    WhoAmI,
    Orders,
    Theme { toggle: bool },
    Admin(AdminCommand),
    Help,
}

/// `signup` arguments, kept apart so passwords do not show up in `Debug`
#[derive(Clone, PartialEq)]
pub struct SignupArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for SignupArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SignupArgs")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl From<SignupArgs> for Signup {
    fn from(args: SignupArgs) -> Self {
        Signup {
            name: args.name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Stats,
    Orders,
    Users,
    AddDish(NewDish),
    EditDish(String, NewDish),
    DeleteDish(String),
}

/// Parse the process arguments, program name included
pub fn parse_cli_args<I>(mut args: I) -> std::result::Result<Command, CLIError>
where
    I: Iterator<Item = String>,
{
    args.next(); // Skip the program name
    let command = match args.next() {
        Some(command) => command,
        None => return Ok(Command::Help),
    };

    let command = match command.to_ascii_lowercase().as_str() {
        "menu" => Command::Menu(match args.next() {
            Some(category) => category
                .parse()
                .map_err(|_| CLIError::InvalidParameter("category"))?,
            None => CategoryFilter::All,
        }),
        "featured" => Command::Featured,
        "cart" => Command::Cart,
        "add" => Command::Add(required(&mut args, "dish")?),
        "qty" => {
            let dish = required(&mut args, "dish")?;
            let quantity = required(&mut args, "quantity")?
                .parse::<i64>()
                .map_err(|_| CLIError::InvalidParameter("quantity"))?;
            Command::Quantity(dish, quantity)
        }
        "remove" => Command::Remove(required(&mut args, "dish")?),
        "clear" => Command::Clear,
        "checkout" => Command::Checkout,
        "signup" => Command::Signup(SignupArgs {
            name: required(&mut args, "name")?,
            email: required(&mut args, "email")?,
            password: required(&mut args, "password")?,
            confirm_password: required(&mut args, "confirm")?,
        }),
        "login" => Command::Login {
            email: required(&mut args, "email")?,
            password: required(&mut args, "password")?,
        },
        "admin-login" => Command::AdminLogin,
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "orders" => Command::Orders,
        "theme" => match args.next().as_deref() {
            None => Command::Theme { toggle: false },
            Some("toggle") => Command::Theme { toggle: true },
            Some(_) => return Err(CLIError::InvalidParameter("theme action")),
        },
        "admin" => Command::Admin(parse_admin(&mut args)?),
        "help" | "--help" | "-h" => Command::Help,
        _ => return Err(CLIError::UnknownCommand(command)),
    };

    Ok(command)
}

fn parse_admin<I>(args: &mut I) -> std::result::Result<AdminCommand, CLIError>
where
    I: Iterator<Item = String>,
{
    let action = required(args, "admin action")?;
    match action.as_str() {
        "stats" => Ok(AdminCommand::Stats),
        "orders" => Ok(AdminCommand::Orders),
        "users" => Ok(AdminCommand::Users),
        "add-dish" => Ok(AdminCommand::AddDish(parse_dish(args)?)),
        "edit-dish" => {
            let id = required(args, "id")?;
            Ok(AdminCommand::EditDish(id, parse_dish(args)?))
        }
        "delete-dish" => Ok(AdminCommand::DeleteDish(required(args, "id")?)),
        _ => Err(CLIError::InvalidParameter("admin action")),
    }
}

fn parse_dish<I>(args: &mut I) -> std::result::Result<NewDish, CLIError>
where
    I: Iterator<Item = String>,
{
    Ok(NewDish {
        name: required(args, "name")?,
        price: required(args, "price")?
            .parse()
            .map_err(|_| CLIError::InvalidParameter("price"))?,
        category: required(args, "category")?
            .parse()
            .map_err(|_| CLIError::InvalidParameter("category"))?,
        description: required(args, "description")?,
        image: required(args, "image")?,
    })
}

fn required<I>(args: &mut I, name: &'static str) -> std::result::Result<String, CLIError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(CLIError::MissingParameter(name))
}
