pub mod clients;
pub mod config;
pub mod database;
pub mod entities;
pub mod errors;
pub mod services;
pub mod utils;
pub mod web;
