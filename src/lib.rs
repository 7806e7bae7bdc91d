pub mod aggregate;
pub mod annual;
pub mod batch;
pub mod config;
pub mod error;
pub mod highlight;
pub mod normalizer;
pub mod output;
pub mod stats;
pub mod store;
pub mod table;
