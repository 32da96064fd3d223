//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_lab_repository;
mod system_clock;

pub use in_memory_lab_repository::InMemoryLabRepository;
pub use system_clock::SystemClock;
