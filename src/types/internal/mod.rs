// Internal types - not exposed on the API surface
pub mod audit;
pub mod auth;
pub mod dictionary;
pub mod permissions;
