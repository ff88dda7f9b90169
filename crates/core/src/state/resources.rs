//! Fungible per-player resource counters.
//!
//! Money, science and material are not discrete tokens: each is a single
//! integer counter per player. An action on a counter carries the old and new
//! value, and the engine only enforces that the old value matches the counter
//! before writing the new one — exchange-rate legality is rules content and
//! belongs to extension hooks.

use serde::{Deserialize, Serialize};

/// The three fungible resource kinds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Money,
    Science,
    Material,
}

/// One player's resource counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub money: i32,
    pub science: i32,
    pub material: i32,
}

impl ResourceLedger {
    pub fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Money => self.money,
            ResourceKind::Science => self.science,
            ResourceKind::Material => self.material,
        }
    }

    pub fn set(&mut self, kind: ResourceKind, value: i32) {
        match kind {
            ResourceKind::Money => self.money = value,
            ResourceKind::Science => self.science = value,
            ResourceKind::Material => self.material = value,
        }
    }
}
