pub mod actions;
pub mod adapter;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db_manager;
pub mod identifier;
pub mod replay;
pub mod serializer;
