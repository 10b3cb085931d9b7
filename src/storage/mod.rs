pub mod db;
pub mod events;
pub mod migrations;
pub mod ratings;
pub mod transactions;
pub mod users;
