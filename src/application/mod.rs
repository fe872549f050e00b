// Application layer - Use cases and collaborator traits
pub mod error;
pub mod measurement_store;
pub mod notification;
pub mod run_service;
