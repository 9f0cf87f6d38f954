//! Particle species and relativistic kinematics
//!
//! All energies, momenta and masses are in GeV (natural units, c = 1).
//!
//! | Quantity | Definition |
//! |----------|------------|
//! | Total energy | E |
//! | Kinetic energy | T = E − m |
//! | Longitudinal momentum | p_z |
//! | Transverse momentum | p_T = √(p_x² + p_y²) |

use crate::error::HarnessError;
use crate::physics::material::nuclear_mass;
use crate::HarnessResult;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// FOUR-MOMENTUM (Relativistic Energy-Momentum)
// ═══════════════════════════════════════════════════════════════════════════════

/// Four-momentum vector in natural units (c = 1)
///
/// p^μ = (E, p_x, p_y, p_z)
///
/// Satisfies the mass-shell condition: E² - |p|² = m²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Energy component (timelike)
    pub e: f64,
    /// Momentum x-component
    pub px: f64,
    /// Momentum y-component
    pub py: f64,
    /// Momentum z-component (beam axis)
    pub pz: f64,
}

impl FourMomentum {
    /// Create a new four-momentum
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Put a three-momentum on the mass shell of a particle with mass `mass`
    pub fn on_shell(mass: f64, px: f64, py: f64, pz: f64) -> Self {
        let e = (mass * mass + px * px + py * py + pz * pz).sqrt();
        Self { e, px, py, pz }
    }

    /// Compute invariant mass squared: m² = E² - |p|²
    pub fn mass_squared(&self) -> f64 {
        self.e.powi(2) - self.px.powi(2) - self.py.powi(2) - self.pz.powi(2)
    }

    /// Compute invariant mass: m = √(E² - |p|²)
    /// Returns 0 for spacelike momenta
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 >= 0.0 {
            m2.sqrt()
        } else {
            0.0
        }
    }

    /// Compute 3-momentum magnitude: |p| = √(p_x² + p_y² + p_z²)
    pub fn three_momentum_magnitude(&self) -> f64 {
        (self.px.powi(2) + self.py.powi(2) + self.pz.powi(2)).sqrt()
    }

    /// Compute transverse momentum: p_T = √(p_x² + p_y²)
    pub fn transverse_momentum(&self) -> f64 {
        (self.px.powi(2) + self.py.powi(2)).sqrt()
    }

    /// Add two four-momenta
    pub fn add(&self, other: &Self) -> Self {
        Self {
            e: self.e + other.e,
            px: self.px + other.px,
            py: self.py + other.py,
            pz: self.pz + other.pz,
        }
    }

    /// The zero vector
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARTICLE SPECIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Particle species known to the harness
///
/// Names follow the Geant4 particle table. Recoil nuclei produced by the
/// interaction are carried as [`Species::Nucleus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Proton,
    AntiProton,
    Neutron,
    AntiNeutron,
    PiPlus,
    PiMinus,
    PiZero,
    KaonPlus,
    KaonMinus,
    KaonZeroLong,
    KaonZeroShort,
    Lambda,
    Gamma,
    Electron,
    Positron,
    MuMinus,
    MuPlus,
    Deuteron,
    Triton,
    He3,
    Alpha,
    /// Generic nucleus with charge `z` and mass number `a`
    Nucleus { z: u32, a: u32 },
}

impl Species {
    /// Every species addressable by name
    pub const TABLE: [Species; 21] = [
        Species::Proton,
        Species::AntiProton,
        Species::Neutron,
        Species::AntiNeutron,
        Species::PiPlus,
        Species::PiMinus,
        Species::PiZero,
        Species::KaonPlus,
        Species::KaonMinus,
        Species::KaonZeroLong,
        Species::KaonZeroShort,
        Species::Lambda,
        Species::Gamma,
        Species::Electron,
        Species::Positron,
        Species::MuMinus,
        Species::MuPlus,
        Species::Deuteron,
        Species::Triton,
        Species::He3,
        Species::Alpha,
    ];

    /// Look up a species by its particle-table name
    pub fn from_name(name: &str) -> HarnessResult<Self> {
        Self::TABLE
            .iter()
            .copied()
            .find(|s| s.table_name() == Some(name))
            .ok_or_else(|| HarnessError::UnknownParticle(name.to_string()))
    }

    /// Particle-table name; `None` for generic nuclei
    pub fn table_name(&self) -> Option<&'static str> {
        let name = match self {
            Species::Proton => "proton",
            Species::AntiProton => "anti_proton",
            Species::Neutron => "neutron",
            Species::AntiNeutron => "anti_neutron",
            Species::PiPlus => "pi+",
            Species::PiMinus => "pi-",
            Species::PiZero => "pi0",
            Species::KaonPlus => "kaon+",
            Species::KaonMinus => "kaon-",
            Species::KaonZeroLong => "kaon0L",
            Species::KaonZeroShort => "kaon0S",
            Species::Lambda => "lambda",
            Species::Gamma => "gamma",
            Species::Electron => "e-",
            Species::Positron => "e+",
            Species::MuMinus => "mu-",
            Species::MuPlus => "mu+",
            Species::Deuteron => "deuteron",
            Species::Triton => "triton",
            Species::He3 => "He3",
            Species::Alpha => "alpha",
            Species::Nucleus { .. } => return None,
        };
        Some(name)
    }

    /// Rest mass in GeV
    pub fn rest_mass(&self) -> f64 {
        match self {
            Species::Proton | Species::AntiProton => PROTON_MASS,
            Species::Neutron | Species::AntiNeutron => NEUTRON_MASS,
            Species::PiPlus | Species::PiMinus => 0.139_570_39,
            Species::PiZero => 0.134_976_8,
            Species::KaonPlus | Species::KaonMinus => 0.493_677,
            Species::KaonZeroLong | Species::KaonZeroShort => 0.497_611,
            Species::Lambda => 1.115_683,
            Species::Gamma => 0.0,
            Species::Electron | Species::Positron => 0.000_510_998_95,
            Species::MuMinus | Species::MuPlus => 0.105_658_375_5,
            Species::Deuteron => 1.875_612_94,
            Species::Triton => 2.808_921_13,
            Species::He3 => 2.808_391_61,
            Species::Alpha => 3.727_379_4,
            Species::Nucleus { z, a } => nuclear_mass(*z, *a),
        }
    }

    /// Electric charge in units of e
    pub fn charge(&self) -> i32 {
        match self {
            Species::Proton | Species::PiPlus | Species::KaonPlus => 1,
            Species::Positron | Species::MuPlus | Species::Deuteron | Species::Triton => 1,
            Species::AntiProton | Species::PiMinus | Species::KaonMinus => -1,
            Species::Electron | Species::MuMinus => -1,
            Species::He3 | Species::Alpha => 2,
            Species::Nucleus { z, .. } => *z as i32,
            _ => 0,
        }
    }

    /// Baryon number
    pub fn baryon_number(&self) -> i32 {
        match self {
            Species::Proton | Species::Neutron | Species::Lambda => 1,
            Species::AntiProton | Species::AntiNeutron => -1,
            Species::Deuteron => 2,
            Species::Triton | Species::He3 => 3,
            Species::Alpha => 4,
            Species::Nucleus { a, .. } => *a as i32,
            _ => 0,
        }
    }

    /// Whether the species counts as baryonic for energy bookkeeping
    pub fn is_baryonic(&self) -> bool {
        self.baryon_number() >= 1
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.table_name(), self) {
            (Some(name), _) => write!(f, "{}", name),
            (None, Species::Nucleus { z, a }) => write!(f, "nucleus(Z={}, A={})", z, a),
            (None, _) => write!(f, "unknown"),
        }
    }
}

/// Proton rest mass in GeV
pub const PROTON_MASS: f64 = 0.938_272_046;
/// Neutron rest mass in GeV
pub const NEUTRON_MASS: f64 = 0.939_565_378;

// ═══════════════════════════════════════════════════════════════════════════════
// SECONDARIES AND PROJECTILE
// ═══════════════════════════════════════════════════════════════════════════════

/// A particle emerging from the interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryParticle {
    /// Species of the secondary
    pub species: Species,
    /// Four-momentum (GeV)
    pub momentum: FourMomentum,
    /// Baryon number carried by the secondary
    pub baryon_number: i32,
}

impl SecondaryParticle {
    /// Create a secondary; the baryon number is taken from the species
    pub fn new(species: Species, momentum: FourMomentum) -> Self {
        Self {
            species,
            momentum,
            baryon_number: species.baryon_number(),
        }
    }

    /// Kinetic energy: T = E − m(species)
    pub fn kinetic_energy(&self) -> f64 {
        self.momentum.e - self.species.rest_mass()
    }

    /// Total energy E
    pub fn total_energy(&self) -> f64 {
        self.momentum.e
    }

    /// Momentum along the beam axis
    pub fn longitudinal_momentum(&self) -> f64 {
        self.momentum.pz
    }

    /// Momentum transverse to the beam axis
    pub fn transverse_momentum(&self) -> f64 {
        self.momentum.transverse_momentum()
    }

    /// Baryonic secondaries are booked by kinetic energy, everything else
    /// by total energy.
    pub fn is_baryonic(&self) -> bool {
        self.baryon_number >= 1
    }
}

/// The incoming particle: species, kinetic energy and direction of flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub species: Species,
    /// Kinetic energy (GeV)
    pub kinetic_energy: f64,
    /// Unit direction of flight
    pub direction: [f64; 3],
}

impl Projectile {
    pub fn new(species: Species, kinetic_energy: f64, direction: [f64; 3]) -> Self {
        Self {
            species,
            kinetic_energy,
            direction,
        }
    }

    /// Total energy: E = T + m
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.species.rest_mass()
    }

    /// Total momentum: |p| = √(E² − m²) = √(T² + 2Tm)
    pub fn total_momentum(&self) -> f64 {
        let t = self.kinetic_energy;
        (t * t + 2.0 * t * self.species.rest_mass()).sqrt()
    }

    /// Four-momentum along the direction of flight
    pub fn four_momentum(&self) -> FourMomentum {
        let p = self.total_momentum();
        let [dx, dy, dz] = self.direction;
        FourMomentum::new(self.total_energy(), p * dx, p * dy, p * dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_lookup() {
        assert_eq!(Species::from_name("proton").unwrap(), Species::Proton);
        assert_eq!(Species::from_name("pi-").unwrap(), Species::PiMinus);
        assert!(matches!(
            Species::from_name("graviton"),
            Err(HarnessError::UnknownParticle(_))
        ));
    }

    #[test]
    fn test_names_round_trip_through_table() {
        for species in Species::TABLE {
            let name = species.table_name().unwrap();
            assert_eq!(Species::from_name(name).unwrap(), species);
        }
    }

    #[test]
    fn test_baryon_numbers() {
        assert!(Species::Proton.is_baryonic());
        assert!(Species::Neutron.is_baryonic());
        assert!(!Species::PiPlus.is_baryonic());
        assert!(!Species::AntiProton.is_baryonic());
        assert_eq!(Species::Nucleus { z: 26, a: 55 }.baryon_number(), 55);
    }

    #[test]
    fn test_on_shell_mass() {
        let p = FourMomentum::on_shell(Species::PiMinus.rest_mass(), 0.3, -0.1, 12.0);
        assert!((p.mass() - Species::PiMinus.rest_mass()).abs() < 1e-9);
        assert!((p.transverse_momentum() - (0.1f64.powi(2) + 0.3f64.powi(2)).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_projectile_kinematics() {
        let proton = Projectile::new(Species::Proton, 100.0, [0.0, 0.0, 1.0]);
        let e = proton.total_energy();
        let p = proton.total_momentum();
        assert!((e - 100.938_272_046).abs() < 1e-9);
        assert!(((e * e - p * p).sqrt() - PROTON_MASS).abs() < 1e-6);

        let four = proton.four_momentum();
        assert_eq!(four.px, 0.0);
        assert_eq!(four.pz, p);
    }

    #[test]
    fn test_secondary_kinetic_energy() {
        let n = SecondaryParticle::new(
            Species::Neutron,
            FourMomentum::on_shell(NEUTRON_MASS, 0.0, 0.0, 0.5),
        );
        assert_eq!(n.baryon_number, 1);
        let expected = (NEUTRON_MASS.powi(2) + 0.25).sqrt() - NEUTRON_MASS;
        assert!((n.kinetic_energy() - expected).abs() < 1e-12);
        assert_eq!(n.longitudinal_momentum(), 0.5);
    }
}
