pub mod analysis;
pub mod config;
pub mod export;
pub mod gateway;
pub mod persist;
pub mod seed;
pub mod state;
pub mod table;
