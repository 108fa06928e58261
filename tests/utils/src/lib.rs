#[macro_use]
extern crate lazy_static;

pub mod fixtures;
pub mod tracing;
