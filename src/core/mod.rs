pub mod api;
pub mod cache;
pub mod error;
pub mod mapper;
pub mod model;
pub mod parsers;
pub mod payloads;
