pub mod auth;
pub mod clusters;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod log;
pub mod models;
pub mod queries;
pub mod reporting;
pub mod server;
pub mod service;
pub mod store;
pub mod upstream;

#[cfg(test)]
mod test_support;
