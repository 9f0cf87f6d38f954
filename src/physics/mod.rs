//! # Physics Bookkeeping
//!
//! Species tables, target materials and the per-event conservation
//! accounting that the event loop applies to every interaction outcome.

pub mod conservation;
pub mod material;
pub mod particles;

pub use conservation::{
    account, check_momentum, ConservationCheckResult, ConservationRecord, ResidualTally, SumTag,
};
pub use material::{binding_energy, nuclear_mass, Material};
pub use particles::{FourMomentum, Projectile, SecondaryParticle, Species};
