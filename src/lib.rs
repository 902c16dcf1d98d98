pub mod audit;
pub mod clock;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notifier;
pub mod payment;
pub mod response;
pub mod routes;
pub mod services;
pub mod slug;
pub mod state;
pub mod storage;
pub mod token;
pub mod validation;
