//! Toy cascade generator
//!
//! A deliberately small final-state sampler so the harness can run end to
//! end without an external physics library:
//!
//! 1. Leading particle keeps a large share of the beam momentum
//! 2. Produced pions share the rest (multiplicity ~ ln(1 + T))
//! 3. Transverse momenta are exponential with random azimuth
//! 4. A few evaporation neutrons leave the target isotropically
//! 5. The recoil nucleus absorbs whatever momentum is left over
//!
//! Step 5 closes the three-momentum balance, so the momentum residual of
//! every event is zero up to rounding.

use crate::config::PhysicsModel;
use crate::engine::RandomEngine;
use crate::generator::{InteractionGenerator, InteractionOutcome, InteractionRequest};
use crate::physics::particles::{FourMomentum, SecondaryParticle, Species};
use std::f64::consts::PI;

/// Upper bound on produced mesons per event
const MAX_MESONS: u64 = 60;
/// Mean kinetic energy of evaporation neutrons (GeV)
const EVAPORATION_TEMPERATURE: f64 = 0.002;

/// Sampling parameters; the only model-dependent part of the generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    /// Mean meson multiplicity per unit ln(1 + T)
    pub multiplicity_slope: f64,
    /// Mean transverse momentum (GeV)
    pub mean_pt: f64,
    /// Relative momentum share of the leading particle
    pub leading_weight: f64,
    /// Mean evaporation neutrons per unit A^(1/3)
    pub evaporation_scale: f64,
}

impl CascadeParams {
    /// Parameters for a model: string models fragment harder than
    /// intranuclear-cascade models.
    pub fn for_model(model: PhysicsModel) -> Self {
        if model.is_string_model() {
            Self {
                multiplicity_slope: 1.6,
                mean_pt: 0.35,
                leading_weight: 3.0,
                evaporation_scale: 1.2,
            }
        } else {
            Self {
                multiplicity_slope: 1.0,
                mean_pt: 0.25,
                leading_weight: 2.0,
                evaporation_scale: 1.8,
            }
        }
    }
}

/// Reference generator shipped with the harness
#[derive(Debug, Clone)]
pub struct ToyCascadeGenerator {
    model: PhysicsModel,
    params: CascadeParams,
}

impl ToyCascadeGenerator {
    pub fn new(model: PhysicsModel) -> Self {
        Self {
            model,
            params: CascadeParams::for_model(model),
        }
    }

    pub fn params(&self) -> &CascadeParams {
        &self.params
    }

    fn sample_meson(engine: &mut RandomEngine) -> Species {
        match (engine.uniform() * 3.0) as u32 {
            0 => Species::PiPlus,
            1 => Species::PiMinus,
            _ => Species::PiZero,
        }
    }

    fn sample_transverse(&self, engine: &mut RandomEngine) -> (f64, f64) {
        let pt = engine.exponential(self.params.mean_pt);
        let phi = engine.uniform_range(0.0, 2.0 * PI);
        (pt * phi.cos(), pt * phi.sin())
    }

    fn isotropic(engine: &mut RandomEngine, p: f64) -> (f64, f64, f64) {
        let cos_theta = engine.uniform_range(-1.0, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = engine.uniform_range(0.0, 2.0 * PI);
        (p * sin_theta * phi.cos(), p * sin_theta * phi.sin(), p * cos_theta)
    }
}

impl InteractionGenerator for ToyCascadeGenerator {
    fn model_name(&self) -> &str {
        self.model.name()
    }

    fn generate(
        &mut self,
        request: &InteractionRequest,
        engine: &mut RandomEngine,
    ) -> Option<InteractionOutcome> {
        let projectile = request.projectile();
        let beam = projectile.four_momentum();
        let target = request.material();
        let t = projectile.kinetic_energy;

        // Leading particle: baryonic projectiles survive, mesons knock out a nucleon
        let (leading, knocked_out_charge, knocked_out) = if projectile.species.is_baryonic() {
            (projectile.species, 0, 0)
        } else if engine.uniform() < target.z as f64 / target.a as f64 {
            (Species::Proton, 1, 1)
        } else {
            (Species::Neutron, 0, 1)
        };

        let n_mesons = (1 + engine.poisson(self.params.multiplicity_slope * (1.0 + t).ln()))
            .min(MAX_MESONS);

        // Longitudinal shares of the beam momentum
        let mut species = Vec::with_capacity(n_mesons as usize + 1);
        let mut weights = Vec::with_capacity(n_mesons as usize + 1);
        species.push(leading);
        weights.push(engine.exponential(1.0) * self.params.leading_weight);
        for _ in 0..n_mesons {
            species.push(Self::sample_meson(engine));
            weights.push(engine.exponential(1.0));
        }
        let total_weight: f64 = weights.iter().sum::<f64>().max(f64::MIN_POSITIVE);

        let mut secondaries = Vec::with_capacity(species.len() + 8);
        let mut carried = FourMomentum::zero();
        for (s, w) in species.into_iter().zip(weights) {
            let (px, py) = self.sample_transverse(engine);
            let pz = beam.pz * w / total_weight;
            let momentum = FourMomentum::on_shell(s.rest_mass(), px, py, pz);
            carried = carried.add(&momentum);
            secondaries.push(SecondaryParticle::new(s, momentum));
        }

        // Evaporation neutrons from the remnant
        let remnant_z = target.z - knocked_out_charge.min(target.z);
        let remnant_a = target.a - knocked_out.min(target.a);
        let max_evaporated = u64::from(remnant_a.saturating_sub(remnant_z));
        let lambda = self.params.evaporation_scale * (remnant_a as f64).cbrt();
        let n_evaporated = engine.poisson(lambda).min(max_evaporated) as u32;
        for _ in 0..n_evaporated {
            let ekin = engine.exponential(EVAPORATION_TEMPERATURE);
            let m = Species::Neutron.rest_mass();
            let p = (ekin * ekin + 2.0 * ekin * m).sqrt();
            let (px, py, pz) = Self::isotropic(engine, p);
            let momentum = FourMomentum::on_shell(m, px, py, pz);
            carried = carried.add(&momentum);
            secondaries.push(SecondaryParticle::new(Species::Neutron, momentum));
        }

        // Recoil closes the momentum balance
        let recoil_a = remnant_a - n_evaporated;
        if recoil_a > 0 {
            let recoil = match (remnant_z, recoil_a) {
                (0, 1) => Species::Neutron,
                (1, 1) => Species::Proton,
                (z, a) => Species::Nucleus { z, a },
            };
            let momentum = FourMomentum::on_shell(
                recoil.rest_mass(),
                beam.px - carried.px,
                beam.py - carried.py,
                beam.pz - carried.pz,
            );
            secondaries.push(SecondaryParticle::new(recoil, momentum));
        } else if let Some(first) = secondaries.first_mut() {
            // No remnant left: the leading particle takes the balance
            let own = first.momentum;
            first.momentum = FourMomentum::on_shell(
                first.species.rest_mass(),
                beam.px - carried.px + own.px,
                beam.py - carried.py + own.py,
                beam.pz - carried.pz + own.pz,
            );
        }

        log::trace!(
            "{}: {} secondaries ({} mesons, {} evaporated)",
            self.model.name(),
            secondaries.len(),
            n_mesons,
            n_evaporated
        );

        Some(InteractionOutcome::killed(secondaries))
    }
}
