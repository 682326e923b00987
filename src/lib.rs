pub mod db;
pub mod error;
pub mod importer;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod ports;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod writer;

#[cfg(test)]
mod testing;
