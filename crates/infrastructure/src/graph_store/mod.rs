pub mod in_memory;
pub mod seed;

pub use in_memory::InMemoryGraphStore;
pub use seed::GraphSeed;
