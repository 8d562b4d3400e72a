//! Domain layer
//!
//! Pure data types and the ports the retrieval pipeline is written against.
//! Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;
