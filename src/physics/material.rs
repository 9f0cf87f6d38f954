//! Target materials and nuclear properties
//!
//! Materials are addressed by their NIST database names (`G4_Fe`, `G4_Pb`, ...).
//! The interaction target is the first element of the material, described by
//! its charge Z and mass number A.
//!
//! Nuclear binding energies come from the Bethe–Weizsäcker semi-empirical
//! mass formula:
//!
//! B(Z,N) = a_v·A − a_s·A^(2/3) − a_c·Z(Z−1)/A^(1/3) − a_a·(N−Z)²/A + δ(Z,N)

use crate::error::HarnessError;
use crate::physics::particles::{NEUTRON_MASS, PROTON_MASS};
use crate::HarnessResult;
use serde::{Deserialize, Serialize};

/// Volume term (MeV)
const A_VOLUME: f64 = 15.75;
/// Surface term (MeV)
const A_SURFACE: f64 = 17.8;
/// Coulomb term (MeV)
const A_COULOMB: f64 = 0.711;
/// Asymmetry term (MeV)
const A_ASYMMETRY: f64 = 23.7;
/// Pairing amplitude numerator (MeV), δ = a_p/√A
const A_PAIRING: f64 = 11.18;

const MEV: f64 = 1e-3;

/// NIST material name → (Z, A) of the first element
const MATERIALS: [(&str, u32, u32); 20] = [
    ("G4_H", 1, 1),
    ("G4_He", 2, 4),
    ("G4_Li", 3, 7),
    ("G4_Be", 4, 9),
    ("G4_C", 6, 12),
    ("G4_N", 7, 14),
    ("G4_O", 8, 16),
    ("G4_Al", 13, 27),
    ("G4_Si", 14, 28),
    ("G4_Ar", 18, 40),
    ("G4_lAr", 18, 40),
    ("G4_Fe", 26, 56),
    ("G4_Ni", 28, 58),
    ("G4_Cu", 29, 63),
    ("G4_W", 74, 184),
    ("G4_Pb", 82, 207),
    ("G4_U", 92, 238),
    ("G4_WATER", 1, 1),
    ("G4_PbWO4", 82, 207),
    ("G4_POLYSTYRENE", 6, 12),
];

/// A target material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// NIST database name
    pub name: String,
    /// Charge of the first element
    pub z: u32,
    /// Mass number of the first element
    pub a: u32,
}

impl Material {
    /// Look up a material by its NIST name
    pub fn from_name(name: &str) -> HarnessResult<Self> {
        MATERIALS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(n, z, a)| Self {
                name: n.to_string(),
                z,
                a,
            })
            .ok_or_else(|| HarnessError::UnknownMaterial(name.to_string()))
    }

    /// Names of all known materials
    pub fn known_names() -> impl Iterator<Item = &'static str> {
        MATERIALS.iter().map(|(n, _, _)| *n)
    }

    /// Nuclear mass of the target nucleus (GeV)
    pub fn nuclear_mass(&self) -> f64 {
        nuclear_mass(self.z, self.a)
    }

    /// Binding energy of the target nucleus (GeV)
    pub fn binding_energy(&self) -> f64 {
        binding_energy(self.z, self.a)
    }
}

/// Binding energy (GeV) via the Bethe–Weizsäcker formula. Zero for A ≤ 1.
pub fn binding_energy(z: u32, a: u32) -> f64 {
    if a <= 1 || z > a {
        return 0.0;
    }
    let af = a as f64;
    let zf = z as f64;
    let nf = (a - z) as f64;

    let mut b = A_VOLUME * af;
    b -= A_SURFACE * af.powf(2.0 / 3.0);
    b -= A_COULOMB * zf * (zf - 1.0) / af.powf(1.0 / 3.0);
    b -= A_ASYMMETRY * (nf - zf).powi(2) / af;

    let n = a - z;
    let delta = A_PAIRING / af.sqrt();
    if z % 2 == 0 && n % 2 == 0 {
        b += delta;
    } else if z % 2 == 1 && n % 2 == 1 {
        b -= delta;
    }

    b.max(0.0) * MEV
}

/// Nuclear mass (GeV): Z·m_p + N·m_n − B(Z,N)
pub fn nuclear_mass(z: u32, a: u32) -> f64 {
    let n = a.saturating_sub(z);
    z as f64 * PROTON_MASS + n as f64 * NEUTRON_MASS - binding_energy(z, a)
}
