pub mod cart;
pub mod checkout;
pub mod config;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod validate;
