//! Инфраструктурный слой вокруг покерного движка:
//! - генерация ID;
//! - RNG-реализации для движка;
//! - версионированное хранилище с атомарным коммитом.

pub mod ids;
pub mod persistence;
pub mod rng;
pub mod rng_seed;

pub use ids::IdGenerator;
pub use persistence::{InMemoryPokerStorage, MaxIds, PokerStorage, StorageError, Versioned, WriteSet};
pub use rng::{DeterministicRng, NoShuffle, SystemRng};
pub use rng_seed::RngSeed;
