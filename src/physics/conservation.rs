//! Conservation Accounting for Interaction Outcomes
//!
//! Every event is reduced to a [`ConservationRecord`]:
//!
//! | Quantity | Initial value | Per secondary |
//! |----------|---------------|---------------|
//! | Momentum residual | projectile p_z | − p_z |
//! | Energy loss | projectile T (baryon) or E (otherwise) | − T (baryon) or − E (otherwise) |
//! | `neutron_kinetic` | 0 | + T of each neutron |
//! | `pi0_energy` | 0 | + E of each π⁰ |
//!
//! The momentum residual closes to zero up to the generator's own
//! bookkeeping. The energy loss isolates the energy spent breaking up the
//! target nucleus from the energy carried away by tracked products.

use crate::generator::{InteractionOutcome, InteractionRequest};
use crate::physics::particles::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// CONSERVATION RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-species sums accumulated alongside the conservation quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SumTag {
    /// Kinetic energy carried by neutrons
    NeutronKinetic,
    /// Total energy carried by neutral pions
    Pi0Energy,
}

impl SumTag {
    pub const ALL: [SumTag; 2] = [SumTag::NeutronKinetic, SumTag::Pi0Energy];

    pub fn as_str(&self) -> &'static str {
        match self {
            SumTag::NeutronKinetic => "neutron_kinetic",
            SumTag::Pi0Energy => "pi0_energy",
        }
    }

    /// Contribution of a secondary of `species` with kinetic energy `kinetic`
    /// and total energy `total` to this tag, if any
    fn contribution(&self, species: Species, kinetic: f64, total: f64) -> Option<f64> {
        match (self, species) {
            (SumTag::NeutronKinetic, Species::Neutron) => Some(kinetic),
            (SumTag::Pi0Energy, Species::PiZero) => Some(total),
            _ => None,
        }
    }
}

impl fmt::Display for SumTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conservation quantities of a single event (GeV)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationRecord {
    /// Projectile longitudinal momentum minus the sum of secondary p_z
    pub momentum_residual: f64,
    /// Energy not accounted for by the tracked secondaries
    pub energy_loss: f64,
    /// Per-species sums
    pub tagged_sums: BTreeMap<SumTag, f64>,
}

impl ConservationRecord {
    /// Value of a tagged sum (zero when no secondary contributed)
    pub fn tagged(&self, tag: SumTag) -> f64 {
        self.tagged_sums.get(&tag).copied().unwrap_or(0.0)
    }
}

/// Reduce an interaction outcome to its conservation record.
///
/// Pure arithmetic over the request and the outcome; never fails, and
/// yields the projectile's own quantities when there are no secondaries.
pub fn account(request: &InteractionRequest, outcome: &InteractionOutcome) -> ConservationRecord {
    let projectile = request.projectile();
    let mut momentum_residual = projectile.four_momentum().pz;
    let mut energy_loss = if projectile.species.is_baryonic() {
        projectile.kinetic_energy
    } else {
        projectile.total_energy()
    };
    let mut tagged_sums: BTreeMap<SumTag, f64> = SumTag::ALL.iter().map(|&t| (t, 0.0)).collect();

    for secondary in &outcome.secondaries {
        let kinetic = secondary.kinetic_energy();
        let total = secondary.total_energy();

        momentum_residual -= secondary.longitudinal_momentum();

        if secondary.is_baryonic() {
            energy_loss -= kinetic;
        } else {
            energy_loss -= total;
        }

        for tag in SumTag::ALL {
            if let Some(value) = tag.contribution(secondary.species, kinetic, total) {
                *tagged_sums.entry(tag).or_insert(0.0) += value;
            }
        }
    }

    ConservationRecord {
        momentum_residual,
        energy_loss,
        tagged_sums,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOLERANCE CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of comparing a conserved quantity against a tolerance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConservationCheckResult {
    /// Name of the conservation law
    pub law_name: String,
    /// Whether the law is satisfied
    pub is_conserved: bool,
    /// Violation amount (0 if conserved)
    pub violation: f64,
    /// Tolerance used for comparison
    pub tolerance: f64,
}

impl ConservationCheckResult {
    /// Create a passing result
    pub fn passed(law_name: &str, tolerance: f64) -> Self {
        Self {
            law_name: law_name.to_string(),
            is_conserved: true,
            violation: 0.0,
            tolerance,
        }
    }

    /// Create a failing result
    pub fn failed(law_name: &str, violation: f64, tolerance: f64) -> Self {
        Self {
            law_name: law_name.to_string(),
            is_conserved: false,
            violation,
            tolerance,
        }
    }
}

/// Check the longitudinal momentum residual against `[-tolerance, tolerance)`,
/// the same half-open range the conservation histogram bins
pub fn check_momentum(record: &ConservationRecord, tolerance: f64) -> ConservationCheckResult {
    let residual = record.momentum_residual;
    if -tolerance <= residual && residual < tolerance {
        ConservationCheckResult::passed("Longitudinal momentum", tolerance)
    } else {
        ConservationCheckResult::failed("Longitudinal momentum", residual.abs(), tolerance)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUN-LEVEL TALLY
// ═══════════════════════════════════════════════════════════════════════════════

/// Running statistics of the momentum residual over a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResidualTally {
    /// Events accounted
    pub n_events: u64,
    /// Events whose residual failed the tolerance check
    pub n_violations: u64,
    /// Largest |residual| seen
    pub max_abs_residual: f64,
    sum: f64,
    sum_sq: f64,
}

impl ResidualTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event's residual and the outcome of its tolerance check
    pub fn record(&mut self, record: &ConservationRecord, check: &ConservationCheckResult) {
        let r = record.momentum_residual;
        self.n_events += 1;
        self.sum += r;
        self.sum_sq += r * r;
        self.max_abs_residual = self.max_abs_residual.max(r.abs());
        if !check.is_conserved {
            self.n_violations += 1;
        }
    }

    /// Mean residual
    pub fn mean(&self) -> f64 {
        if self.n_events > 0 {
            self.sum / self.n_events as f64
        } else {
            0.0
        }
    }

    /// Root-mean-square residual
    pub fn rms(&self) -> f64 {
        if self.n_events > 0 {
            (self.sum_sq / self.n_events as f64).sqrt()
        } else {
            0.0
        }
    }
}
