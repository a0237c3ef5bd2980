pub mod error;
pub mod fields;
pub mod query;
pub mod repo;
pub mod service;
