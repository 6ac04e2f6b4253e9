pub mod redirect;
pub mod repository;
pub mod types;
