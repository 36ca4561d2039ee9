pub mod auth;
pub mod driver;
pub mod error;
pub mod health;
pub mod menu;
pub mod order;
pub mod release;
pub mod restaurant;
pub mod routes;
pub mod state;
pub mod version;
