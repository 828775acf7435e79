// Adapters layer: concrete DocumentStore implementations.

pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreSettings, FirestoreStore};
pub use memory::MemoryStore;
