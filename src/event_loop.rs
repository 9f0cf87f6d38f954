//! # Event Loop / Replay Controller
//!
//! Per event:
//!
//! ```text
//! start ─► save(i)? ─► restore(i)? ─► generate ─► primary killed? ─► account ─► fill ─► end
//!                                                      │
//!                                                      └─ no ─► abort (InvariantViolation)
//! ```
//!
//! Saving happens only in fresh runs that asked for it, restoring only in
//! replay runs. Events are processed strictly in order; the engine state
//! at the start of event `i` is what a checkpoint for `i` records.

use crate::checkpoint::CheckpointStore;
use crate::config::Configuration;
use crate::engine::RandomEngine;
use crate::error::HarnessError;
use crate::generator::{InteractionGenerator, InteractionOutcome, InteractionRequest};
use crate::histogram::{HistogramId, HistogramSet};
use crate::physics::conservation::{account, check_momentum, ConservationRecord, ResidualTally, SumTag};
use crate::physics::particles::Species;
use crate::HarnessResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Momentum residual range covered by the conservation histogram (GeV)
pub const MOMENTUM_TOLERANCE: f64 = 0.02;

/// Names of the pre-declared run histograms
pub mod names {
    pub const MOMENTUM_CONSERVATION: &str = "Momentum_conservation";
    pub const NEUTRON_KENERGY: &str = "Neutron_kenergy";
    pub const PI0_ENERGY: &str = "Pi0_energy";
    pub const E_LOSS: &str = "E_loss";
    pub const PIMINUS_PZ: &str = "Pi-_Pz";
    pub const PIMINUS_PZ_WPT: &str = "Pi-_Pz_wPt";
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN HISTOGRAMS
// ═══════════════════════════════════════════════════════════════════════════════

/// The fixed histogram set of a run, binned from the configuration
#[derive(Debug, Clone)]
pub struct RunHistograms {
    set: HistogramSet,
    momentum: HistogramId,
    neutron_kenergy: HistogramId,
    pi0_energy: HistogramId,
    e_loss: HistogramId,
    piminus_pz: HistogramId,
    piminus_pz_wpt: HistogramId,
}

impl RunHistograms {
    /// Declare all histograms. Energy ranges scale with the projectile
    /// energy, the energy-loss range with the target binding energy.
    pub fn for_config(config: &Configuration) -> HarnessResult<Self> {
        let e = config.energy;
        let binding = config.material.binding_energy();

        let mut set = HistogramSet::new();
        let momentum = set.create(names::MOMENTUM_CONSERVATION, 2000, -MOMENTUM_TOLERANCE, MOMENTUM_TOLERANCE)?;
        let neutron_kenergy = set.create(names::NEUTRON_KENERGY, 1000, 0.0, 1.1 * e)?;
        let pi0_energy = set.create(names::PI0_ENERGY, 1000, 0.0, 1.1 * e)?;
        let e_loss = set.create(names::E_LOSS, 500, -1.0, 2.0 * binding)?;
        let piminus_pz = set.create(names::PIMINUS_PZ, 100, -1.2 * e, 1.2 * e)?;
        let piminus_pz_wpt = set.create(names::PIMINUS_PZ_WPT, 100, -1.2 * e, 1.2 * e)?;

        Ok(Self {
            set,
            momentum,
            neutron_kenergy,
            pi0_energy,
            e_loss,
            piminus_pz,
            piminus_pz_wpt,
        })
    }

    /// Fill from one accounted event
    pub fn fill_event(&mut self, record: &ConservationRecord, outcome: &InteractionOutcome) {
        for secondary in outcome.secondaries.iter().filter(|s| s.species == Species::PiMinus) {
            let pz = secondary.longitudinal_momentum();
            self.set.accumulate_id(self.piminus_pz, pz, 1.0);
            self.set.accumulate_id(self.piminus_pz_wpt, pz, secondary.transverse_momentum());
        }

        self.set.accumulate_id(self.momentum, record.momentum_residual, 1.0);
        self.set
            .accumulate_id(self.neutron_kenergy, record.tagged(SumTag::NeutronKinetic), 1.0);
        self.set
            .accumulate_id(self.pi0_energy, record.tagged(SumTag::Pi0Energy), 1.0);
        self.set.accumulate_id(self.e_loss, record.energy_loss, 1.0);
    }

    pub fn set(&self) -> &HistogramSet {
        &self.set
    }

    pub fn into_set(self) -> HistogramSet {
        self.set
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOOP
// ═══════════════════════════════════════════════════════════════════════════════

/// One fully processed event
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    pub index: u64,
    pub outcome: InteractionOutcome,
    pub record: ConservationRecord,
}

/// Run-level statistics reported at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub events_processed: u64,
    pub first_event: u64,
    pub residual_mean: f64,
    pub residual_rms: f64,
    pub max_abs_residual: f64,
    /// Events whose residual fell outside the conservation histogram
    pub residuals_out_of_range: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run summary (n={}, first={}):\n\
             ├─ residual mean:  {:.3e} GeV\n\
             ├─ residual rms:   {:.3e} GeV\n\
             ├─ max |residual|: {:.3e} GeV\n\
             └─ out of range:   {}",
            self.events_processed,
            self.first_event,
            self.residual_mean,
            self.residual_rms,
            self.max_abs_residual,
            self.residuals_out_of_range
        )
    }
}

/// Sequential driver of a run
pub struct EventLoop<G: InteractionGenerator, S: CheckpointStore> {
    config: Configuration,
    request: InteractionRequest,
    generator: G,
    store: S,
    engine: RandomEngine,
    histograms: RunHistograms,
    tally: ResidualTally,
    first_event: Option<u64>,
}

impl<G: InteractionGenerator, S: CheckpointStore> EventLoop<G, S> {
    pub fn new(config: Configuration, generator: G, store: S) -> HarnessResult<Self> {
        let request = InteractionRequest::from_config(&config);
        let histograms = RunHistograms::for_config(&config)?;
        let engine = RandomEngine::new(config.seed);

        log::debug!(
            "Event loop ready: model={}, generator={}, events={:?}",
            config.model,
            generator.model_name(),
            config.event_range()
        );

        Ok(Self {
            config,
            request,
            generator,
            store,
            engine,
            histograms,
            tally: ResidualTally::new(),
            first_event: None,
        })
    }

    /// Process a single event. An error leaves the histograms untouched
    /// for that event.
    pub fn process_event(&mut self, index: u64) -> HarnessResult<ProcessedEvent> {
        if self.config.is_replay() {
            self.store.restore(index, &mut self.engine)?;
            log::info!("Redoing event {}", index);
        } else if self.config.checkpoints_enabled() {
            self.store.save(index, &self.engine)?;
        }

        let outcome = self
            .generator
            .generate(&self.request, &mut self.engine)
            .ok_or(HarnessError::GeneratorFailure { event: index })?;

        if !outcome.status.is_killed() {
            log::error!("PRIMARY NOT KILLED in event {} (status {:?})", index, outcome.status);
            return Err(HarnessError::InvariantViolation {
                event: index,
                status: outcome.status,
            });
        }

        let record = account(&self.request, &outcome);

        if self.config.is_replay() {
            for secondary in &outcome.secondaries {
                log::info!(
                    " particle: {} momentum (GeV): {:.6} energy (GeV): {:.6} k energy (GeV): {:.6}",
                    secondary.species,
                    secondary.momentum.three_momentum_magnitude(),
                    secondary.total_energy(),
                    secondary.kinetic_energy()
                );
            }
        }

        self.histograms.fill_event(&record, &outcome);
        let check = check_momentum(&record, MOMENTUM_TOLERANCE);
        if !check.is_conserved {
            log::warn!(
                "Event {}: momentum residual {:.4e} GeV outside ±{}",
                index,
                record.momentum_residual,
                MOMENTUM_TOLERANCE
            );
        }
        self.tally.record(&record, &check);
        self.first_event.get_or_insert(index);

        log::debug!(
            "Event {}: {} secondaries, residual {:.3e} GeV, e_loss {:.4} GeV",
            index,
            outcome.n_secondaries(),
            record.momentum_residual,
            record.energy_loss
        );

        if self.config.save_random {
            log::info!("event {} e_loss {}", index, record.energy_loss);
        }

        Ok(ProcessedEvent {
            index,
            outcome,
            record,
        })
    }

    /// Process every event of the configured range
    pub fn run(&mut self) -> HarnessResult<RunSummary> {
        self.run_with(|_| {})
    }

    /// Process every event, handing each one to `observer`. The first
    /// error stops the run.
    pub fn run_with<F>(&mut self, mut observer: F) -> HarnessResult<RunSummary>
    where
        F: FnMut(&ProcessedEvent),
    {
        let range = self.config.event_range();
        if self.config.is_replay() && range.is_empty() {
            return Err(HarnessError::CheckpointNotFound {
                event: range.start,
                path: "<empty replay range>".to_string(),
            });
        }
        let total = range.end - range.start;
        let step = (total / 10).max(1);

        for index in range.clone() {
            let event = self.process_event(index)?;
            observer(&event);

            let done = index - range.start + 1;
            if total >= 10 && done % step == 0 {
                log::info!("Processed {}/{} events", done, total);
            }
        }

        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            events_processed: self.tally.n_events,
            first_event: self.first_event.unwrap_or(0),
            residual_mean: self.tally.mean(),
            residual_rms: self.tally.rms(),
            max_abs_residual: self.tally.max_abs_residual,
            residuals_out_of_range: self.tally.n_violations,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn request(&self) -> &InteractionRequest {
        &self.request
    }

    pub fn histograms(&self) -> &HistogramSet {
        self.histograms.set()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &RandomEngine {
        &self.engine
    }

    /// Give back the histograms and the checkpoint store
    pub fn into_parts(self) -> (HistogramSet, S) {
        (self.histograms.into_set(), self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsModel;
    use crate::physics::material::Material;
    use crate::physics::particles::{FourMomentum, SecondaryParticle};

    fn config(energy: f64) -> Configuration {
        Configuration::new(
            PhysicsModel::FtfpBert,
            Species::Proton,
            energy,
            Material::from_name("G4_Fe").unwrap(),
        )
    }

    #[test]
    fn test_histogram_binning_follows_config() {
        let run = RunHistograms::for_config(&config(100.0)).unwrap();
        let set = run.set();
        assert_eq!(set.len(), 6);

        let momentum = set.get(names::MOMENTUM_CONSERVATION).unwrap();
        assert_eq!(momentum.bin_count(), 2000);
        assert_eq!(momentum.lower_bound(), -0.02);

        let neutron = set.get(names::NEUTRON_KENERGY).unwrap();
        assert!((neutron.upper_bound() - 110.0).abs() < 1e-9);

        let pz = set.get(names::PIMINUS_PZ).unwrap();
        assert_eq!(pz.bin_count(), 100);
        assert!((pz.lower_bound() + 120.0).abs() < 1e-9);

        let e_loss = set.get(names::E_LOSS).unwrap();
        let binding = Material::from_name("G4_Fe").unwrap().binding_energy();
        assert!((e_loss.upper_bound() - 2.0 * binding).abs() < 1e-12);
    }

    #[test]
    fn test_fill_event_routes_pi_minus() {
        let mut run = RunHistograms::for_config(&config(10.0)).unwrap();
        let m = Species::PiMinus.rest_mass();
        let outcome = InteractionOutcome::killed(vec![
            SecondaryParticle::new(Species::PiMinus, FourMomentum::on_shell(m, 0.3, 0.4, 2.0)),
            SecondaryParticle::new(Species::PiPlus, FourMomentum::on_shell(m, 0.0, 0.0, 1.0)),
        ]);
        let record = ConservationRecord {
            momentum_residual: 0.001,
            energy_loss: 0.1,
            tagged_sums: Default::default(),
        };
        run.fill_event(&record, &outcome);

        let set = run.set();
        assert_eq!(set.get(names::PIMINUS_PZ).unwrap().entries, 1);
        let weighted = set.get(names::PIMINUS_PZ_WPT).unwrap();
        assert!((weighted.integral() - 0.5).abs() < 1e-12);
        for name in [
            names::MOMENTUM_CONSERVATION,
            names::NEUTRON_KENERGY,
            names::PI0_ENERGY,
            names::E_LOSS,
        ] {
            assert_eq!(set.get(name).unwrap().entries, 1, "{name}");
        }
    }
}
