#![allow(non_camel_case_types)]

pub mod cli;
pub mod configuration;
pub mod dao;
pub mod error;
pub mod handler;
pub mod model;
pub mod provider;
pub mod store;
pub mod types;
