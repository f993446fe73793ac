//! Externally owned ability permissions.
//!
//! The gate is re-read at the start of every tick. Any state whose ability
//! bit is missing is forced off within that same tick.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single permitted locomotion ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Head facing drives steering.
    Look,
    /// Flap impulses.
    Flap,
    /// Gliding.
    Glide,
    /// Diving within a glide.
    Dive,
    /// Hovering within a glide.
    Hover,
    /// Any velocity at all.
    Translate,
}

impl Ability {
    /// Every ability, in bit order.
    pub const ALL: [Self; 6] = [
        Self::Look,
        Self::Flap,
        Self::Glide,
        Self::Dive,
        Self::Hover,
        Self::Translate,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Look => 1,
            Self::Flap => 1 << 1,
            Self::Glide => 1 << 2,
            Self::Dive => 1 << 3,
            Self::Hover => 1 << 4,
            Self::Translate => 1 << 5,
        }
    }
}

/// Bitset of permitted abilities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityMask(u8);

impl CapabilityMask {
    /// Nothing permitted.
    pub const NONE: Self = Self(0);
    /// Everything permitted.
    pub const ALL: Self = Self(0b11_1111);

    /// Mask with exactly the given abilities.
    #[must_use]
    pub fn from_abilities(abilities: &[Ability]) -> Self {
        abilities.iter().fold(Self::NONE, |mask, a| mask.with(*a))
    }

    /// Whether `ability` is permitted.
    #[must_use]
    pub const fn allows(self, ability: Ability) -> bool {
        self.0 & ability.bit() != 0
    }

    /// Copy with `ability` permitted.
    #[must_use]
    pub const fn with(self, ability: Ability) -> Self {
        Self(self.0 | ability.bit())
    }

    /// Copy with `ability` revoked.
    #[must_use]
    pub const fn without(self, ability: Ability) -> Self {
        Self(self.0 & !ability.bit())
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl Default for CapabilityMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Debug for CapabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Ability::ALL.iter().filter(|a| self.allows(**a)))
            .finish()
    }
}

/// What the gate reports for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Permitted abilities.
    pub mask: CapabilityMask,
    /// Whether gravity applies this tick.
    pub gravity_enabled: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            mask: CapabilityMask::ALL,
            gravity_enabled: true,
        }
    }
}

impl Capabilities {
    /// Whether `ability` is permitted.
    #[must_use]
    pub const fn allows(&self, ability: Ability) -> bool {
        self.mask.allows(ability)
    }
}

/// Source of per-tick capabilities, such as a tutorial sequencer.
pub trait CapabilityGate {
    /// Capabilities in force for the coming tick.
    fn capabilities(&self) -> Capabilities;
}

impl CapabilityGate for Capabilities {
    fn capabilities(&self) -> Capabilities {
        *self
    }
}

impl<F> CapabilityGate for F
where
    F: Fn() -> Capabilities,
{
    fn capabilities(&self) -> Capabilities {
        self()
    }
}
