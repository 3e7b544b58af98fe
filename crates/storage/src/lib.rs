#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod in_memory;
pub mod log;
pub mod plan_candidate;
pub mod rows;
pub mod settings;

pub use in_memory::InMemory;
