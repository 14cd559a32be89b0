// DTO layer - API request/response payloads
pub mod admin;
pub mod auth;
pub mod certificates;
pub mod common;
pub mod keys;
pub mod upload;
pub mod workhours;
