//! # Interaction Generator Boundary
//!
//! The harness treats the interaction generator as a black box:
//!
//! ```text
//! InteractionRequest ──► generate(request, engine) ──► Option<InteractionOutcome>
//!   species, T, dir,                                     terminal status,
//!   material                                             ordered secondaries
//! ```
//!
//! A generator may consume any amount of randomness, but only from the
//! engine handle it is given. That is what makes checkpointed events
//! replayable.

pub mod toy;

pub use toy::ToyCascadeGenerator;

use crate::config::Configuration;
use crate::engine::RandomEngine;
use crate::physics::material::Material;
use crate::physics::particles::{Projectile, SecondaryParticle, Species};
use serde::{Deserialize, Serialize};

/// Beam axis used by the harness
pub const BEAM_AXIS: [f64; 3] = [0.0, 0.0, 1.0];

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK STATUS
// ═══════════════════════════════════════════════════════════════════════════════

/// Terminal state of the primary after the interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackStatus {
    /// Primary continues to be tracked
    Alive,
    /// Primary stopped but has at-rest processes left
    StopButAlive,
    /// Primary stopped and fully consumed into secondaries
    StopAndKill,
    /// Primary and its secondaries are killed
    KillTrackAndSecondaries,
    /// Primary suspended
    Suspend,
    /// Primary postponed to the next event
    PostponeToNextEvent,
}

impl TrackStatus {
    /// Whether the primary is stopped and killed
    pub fn is_killed(&self) -> bool {
        matches!(self, TrackStatus::StopAndKill)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST / OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything the generator needs to sample one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRequest {
    projectile: Projectile,
    material: Material,
}

impl InteractionRequest {
    /// A projectile of `species` with kinetic energy `energy` (GeV) along +z
    pub fn along_z(species: Species, energy: f64, material: Material) -> Self {
        Self {
            projectile: Projectile::new(species, energy, BEAM_AXIS),
            material,
        }
    }

    /// The fixed request of a run
    pub fn from_config(config: &Configuration) -> Self {
        Self::along_z(config.projectile, config.energy, config.material.clone())
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn species(&self) -> Species {
        self.projectile.species
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.projectile.kinetic_energy
    }

    pub fn direction(&self) -> [f64; 3] {
        self.projectile.direction
    }
}

/// What the generator returns for one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    /// Terminal state of the primary
    pub status: TrackStatus,
    /// Secondaries in generation order
    pub secondaries: Vec<SecondaryParticle>,
}

impl InteractionOutcome {
    pub fn new(status: TrackStatus, secondaries: Vec<SecondaryParticle>) -> Self {
        Self {
            status,
            secondaries,
        }
    }

    /// Outcome with the primary stopped and killed
    pub fn killed(secondaries: Vec<SecondaryParticle>) -> Self {
        Self::new(TrackStatus::StopAndKill, secondaries)
    }

    pub fn n_secondaries(&self) -> usize {
        self.secondaries.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A stochastic final-state generator
pub trait InteractionGenerator {
    /// Name of the physics model behind this generator
    fn model_name(&self) -> &str;

    /// Sample one interaction. `None` means the generator declined to
    /// produce an outcome at all.
    fn generate(
        &mut self,
        request: &InteractionRequest,
        engine: &mut RandomEngine,
    ) -> Option<InteractionOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stop_and_kill_is_killed() {
        let statuses = [
            TrackStatus::Alive,
            TrackStatus::StopButAlive,
            TrackStatus::StopAndKill,
            TrackStatus::KillTrackAndSecondaries,
            TrackStatus::Suspend,
            TrackStatus::PostponeToNextEvent,
        ];
        let killed: Vec<_> = statuses.iter().filter(|s| s.is_killed()).collect();
        assert_eq!(killed, vec![&TrackStatus::StopAndKill]);
    }

    #[test]
    fn test_request_points_along_beam_axis() {
        let request =
            InteractionRequest::along_z(Species::Proton, 100.0, Material::from_name("G4_Fe").unwrap());
        assert_eq!(request.direction(), BEAM_AXIS);
        assert_eq!(request.kinetic_energy(), 100.0);
        assert_eq!(request.material().z, 26);
    }
}
