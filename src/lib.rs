//! State core of the HolySmokes food-ordering storefront.
//!
//! Menu, cart, checkout, accounts and the admin dish editor, all kept in a
//! flat key-value [`store::Store`] of versioned JSON records. The
//! [`storefront::Storefront`] type ties the pieces together for a front end;
//! the `storefront` binary is a small command line one backed by SQLite.
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod orders;
pub mod records;
pub mod store;
pub mod storefront;
pub mod theme;
