//! RngSeed: доменный seed для тасовки колоды.
//!
//! Позволяет:
//!   - хранить базовый seed (u64 или [u8;32])
//!   - выводить seed конкретной раздачи:
//!         new = H(domain || base || table_id || hand_id || hand_number)
//!   - создавать DeterministicRng из seed
//!
//! Раздачи с одинаковым базовым seed и одинаковыми идентификаторами
//! тасуются одинаково, что удобно для воспроизведения.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{HandId, TableId};
use crate::infra::rng::DeterministicRng;

const DOMAIN_PREFIX: &[u8] = b"AGENT_HOLDEM_DECK_V1";

/// 32-байтовый seed для RNG.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RngSeed {
    pub bytes: [u8; 32],
}

impl RngSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Seed из u64 (для конфигов и тестов).
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self { bytes: b }
    }

    /// Seed конкретной раздачи.
    pub fn derive(&self, table_id: TableId, hand_id: HandId, hand_number: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_PREFIX);
        hasher.update(self.bytes);
        hasher.update(table_id.to_le_bytes());
        hasher.update(hand_id.to_le_bytes());
        hasher.update(hand_number.to_le_bytes());

        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Self { bytes: out }
    }

    pub fn to_rng(&self) -> DeterministicRng {
        DeterministicRng::from_seed_bytes(self.bytes)
    }
}
