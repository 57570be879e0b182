// Frameworks layer: runtime bootstrap, environment config and database setup.

pub mod config;
pub mod db;
pub mod server;
