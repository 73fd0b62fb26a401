//! Queue store implementations bundled with the core crate

pub mod memory;

pub use memory::MemoryQueueStore;
