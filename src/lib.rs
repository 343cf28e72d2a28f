pub mod board;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod store;
pub mod table_view;
pub mod web;
