pub mod driver;
pub mod menu;
pub mod order;
pub mod release;
pub mod restaurant;
pub mod user;
