pub mod follows;
pub mod health;
pub mod tweets;
pub mod users;
