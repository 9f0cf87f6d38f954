//! # Run Configuration
//!
//! Raw flag values are collected by clap into [`RawArgs`] as plain strings;
//! [`Configuration::validate`] turns them into a checked configuration so
//! that every rejection carries the harness's own error kind.
//!
//! ## Usage
//!
//! ```bash
//! hadronic_fs_validator --pl FTFP_BERT -p proton -e 100 -m G4_Fe
//! hadronic_fs_validator --pl FTFP_BERT -p proton -e 100 -m G4_Fe --save-random 1
//! hadronic_fs_validator --pl FTFP_BERT -p proton -e 100 -m G4_Fe --redo 1 --redo-index 42
//! ```

use crate::engine::DEFAULT_SEED;
use crate::error::HarnessError;
use crate::physics::material::Material;
use crate::physics::particles::Species;
use crate::HarnessResult;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

/// Events in a fresh run unless overridden
pub const DEFAULT_EVENTS: u64 = 100_000;

/// Largest accepted projectile energy (GeV); histogram ranges scale with it
pub const MAX_ENERGY: f64 = 1.0e300;

// ═══════════════════════════════════════════════════════════════════════════════
// MODEL REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Supported hadronic physics models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicsModel {
    FtfpBert,
    FtfpBertAtl,
    QgspBert,
    QgspBic,
    FtfpInclxx,
    Ftfp,
    Qgsp,
    Bert,
    Bic,
    IonBic,
    Incl,
}

impl PhysicsModel {
    /// The closed registry, in listing order
    pub const ALL: [PhysicsModel; 11] = [
        PhysicsModel::FtfpBert,
        PhysicsModel::FtfpBertAtl,
        PhysicsModel::QgspBert,
        PhysicsModel::QgspBic,
        PhysicsModel::FtfpInclxx,
        PhysicsModel::Ftfp,
        PhysicsModel::Qgsp,
        PhysicsModel::Bert,
        PhysicsModel::Bic,
        PhysicsModel::IonBic,
        PhysicsModel::Incl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PhysicsModel::FtfpBert => "FTFP_BERT",
            PhysicsModel::FtfpBertAtl => "FTFP_BERT_ATL",
            PhysicsModel::QgspBert => "QGSP_BERT",
            PhysicsModel::QgspBic => "QGSP_BIC",
            PhysicsModel::FtfpInclxx => "FTFP_INCLXX",
            PhysicsModel::Ftfp => "FTFP",
            PhysicsModel::Qgsp => "QGSP",
            PhysicsModel::Bert => "BERT",
            PhysicsModel::Bic => "BIC",
            PhysicsModel::IonBic => "IonBIC",
            PhysicsModel::Incl => "INCL",
        }
    }

    /// Names of every registered model
    pub fn registry() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.name()).collect()
    }

    /// Whether the model's high-energy part is a string model (FTF or QGS)
    pub fn is_string_model(&self) -> bool {
        self.name().starts_with("FTF") || self.name().starts_with("QGS")
    }
}

impl FromStr for PhysicsModel {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| HarnessError::UnknownModel {
                name: s.to_string(),
                registry: Self::registry().into_iter().map(String::from).collect(),
            })
    }
}

impl fmt::Display for PhysicsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Flag values as given on the command line
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "hadronic_fs_validator")]
#[command(about = "Conservation checks and histograms for hadronic final-state generators")]
#[command(version)]
pub struct RawArgs {
    /// Physics model (e.g. FTFP_BERT)
    #[arg(long = "pl", num_args = 0..=1, default_missing_value = "")]
    pub physics_list: Option<String>,

    /// Projectile particle (e.g. proton)
    #[arg(short = 'p', long = "particle", num_args = 0..=1, default_missing_value = "")]
    pub particle: Option<String>,

    /// Projectile kinetic energy in GeV
    #[arg(
        short = 'e',
        long = "energy",
        num_args = 0..=1,
        default_missing_value = "",
        allow_negative_numbers = true
    )]
    pub energy: Option<String>,

    /// Target material (e.g. G4_Fe)
    #[arg(short = 'm', long = "material", num_args = 0..=1, default_missing_value = "")]
    pub material: Option<String>,

    /// Save the random-engine state before every event (1/0)
    #[arg(long = "save-random", num_args = 0..=1, default_missing_value = "1")]
    pub save_random: Option<String>,

    /// Replay a single checkpointed event (1/0)
    #[arg(long = "redo", num_args = 0..=1, default_missing_value = "1")]
    pub redo: Option<String>,

    /// Event index to replay
    #[arg(long = "redo-index", allow_negative_numbers = true)]
    pub redo_index: Option<String>,

    /// Number of events in a fresh run
    #[arg(long = "events")]
    pub events: Option<String>,

    /// Master seed of the random engine
    #[arg(long = "seed")]
    pub seed: Option<String>,

    /// Directory for random-engine checkpoints
    #[arg(long = "checkpoint-dir")]
    pub checkpoint_dir: Option<PathBuf>,

    /// Directory for the histogram report
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

impl RawArgs {
    /// Whether a replay was requested, read leniently so the caller can
    /// decide to prompt for the event index before validating.
    pub fn wants_redo(&self) -> bool {
        self.redo
            .as_deref()
            .and_then(|v| parse_switch("redo", v).ok())
            .unwrap_or(false)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATED CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validated run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub model: PhysicsModel,
    pub projectile: Species,
    /// Projectile kinetic energy (GeV)
    pub energy: f64,
    pub material: Material,
    pub save_random: bool,
    pub redo: bool,
    pub redo_index: Option<u64>,
    pub events: u64,
    pub seed: u64,
    pub checkpoint_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Configuration {
    /// Validate raw flag values
    pub fn validate(raw: &RawArgs) -> HarnessResult<Self> {
        let model: PhysicsModel = required("pl", &raw.physics_list)?.parse()?;
        let projectile = Species::from_name(required("particle", &raw.particle)?)?;
        let energy = parse_energy(required("energy", &raw.energy)?)?;
        let material = Material::from_name(required("material", &raw.material)?)?;

        let save_random = optional(&raw.save_random, "save-random", parse_switch)?.unwrap_or(false);
        let redo = optional(&raw.redo, "redo", parse_switch)?.unwrap_or(false);
        let redo_index = optional(&raw.redo_index, "redo-index", parse_count)?;
        if redo && redo_index.is_none() {
            return Err(HarnessError::MissingArgument("redo-index".to_string()));
        }
        // The replay range is index..index + 1
        if redo_index == Some(u64::MAX) {
            return Err(malformed("redo-index", &u64::MAX.to_string()));
        }

        let events = optional(&raw.events, "events", parse_count)?.unwrap_or(DEFAULT_EVENTS);
        let seed = optional(&raw.seed, "seed", parse_count)?.unwrap_or(DEFAULT_SEED);

        Ok(Self {
            model,
            projectile,
            energy,
            material,
            save_random,
            redo,
            redo_index,
            events,
            seed,
            checkpoint_dir: raw.checkpoint_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            output_dir: raw.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// A fresh-run configuration with default switches
    pub fn new(model: PhysicsModel, projectile: Species, energy: f64, material: Material) -> Self {
        Self {
            model,
            projectile,
            energy,
            material,
            save_random: false,
            redo: false,
            redo_index: None,
            events: DEFAULT_EVENTS,
            seed: DEFAULT_SEED,
            checkpoint_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
        }
    }

    /// Whether engine states are saved; replay takes precedence
    pub fn checkpoints_enabled(&self) -> bool {
        self.save_random && !self.redo
    }

    /// Whether this is a replay run
    pub fn is_replay(&self) -> bool {
        self.redo
    }

    /// Event indices processed by the run
    pub fn event_range(&self) -> Range<u64> {
        match (self.redo, self.redo_index) {
            (true, Some(index)) => index..index.saturating_add(1),
            _ => 0..self.events,
        }
    }

    /// Report file name: model, projectile, first four characters of the
    /// energy and material, e.g. `FTFP_BERTproton100.G4_Fe.json`
    pub fn report_file_name(&self) -> String {
        let energy: String = format!("{:.6}", self.energy).chars().take(4).collect();
        format!(
            "{}{}{}{}.json",
            self.model, self.projectile, energy, self.material.name
        )
    }

    /// Multi-line summary printed before the run starts
    pub fn describe(&self) -> String {
        let projectile = crate::physics::particles::Projectile::new(
            self.projectile,
            self.energy,
            crate::generator::BEAM_AXIS,
        );
        format!(
            "=================  Configuration ==================\n\
             Model: {}\n\
             Projectile: {}\n\
             Ekin: {} GeV\n\
             Etot: {} GeV\n\
             Momentum: {} GeV\n\
             Material: {}\n\
             Nuclear Mass: {} GeV\n\
             Binding Energy: {} GeV\n\
             ===================================================",
            self.model,
            self.projectile,
            self.energy,
            projectile.total_energy(),
            projectile.total_momentum(),
            self.material.name,
            self.material.nuclear_mass(),
            self.material.binding_energy(),
        )
    }
}

fn required<'a>(flag: &str, value: &'a Option<String>) -> HarnessResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(HarnessError::MissingArgument(flag.to_string())),
    }
}

fn optional<T>(
    value: &Option<String>,
    flag: &str,
    parse: fn(&str, &str) -> HarnessResult<T>,
) -> HarnessResult<Option<T>> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Err(HarnessError::MissingArgument(flag.to_string())),
        Some(v) => parse(flag, v).map(Some),
    }
}

fn malformed(flag: &str, value: &str) -> HarnessError {
    HarnessError::MalformedNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

fn parse_energy(value: &str) -> HarnessResult<f64> {
    match value.parse::<f64>() {
        Ok(e) if e > 0.0 && e <= MAX_ENERGY => Ok(e),
        _ => Err(malformed("energy", value)),
    }
}

fn parse_count(flag: &str, value: &str) -> HarnessResult<u64> {
    value.parse::<u64>().map_err(|_| malformed(flag, value))
}

/// 0/1 switch; any non-zero integer, `true` or `false`
fn parse_switch(flag: &str, value: &str) -> HarnessResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => value
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| malformed(flag, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pl: &str, p: &str, e: &str, m: &str) -> RawArgs {
        RawArgs {
            physics_list: Some(pl.to_string()),
            particle: Some(p.to_string()),
            energy: Some(e.to_string()),
            material: Some(m.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_configuration() {
        let config = Configuration::validate(&raw("FTFP_BERT", "proton", "100", "G4_Fe")).unwrap();
        assert_eq!(config.model, PhysicsModel::FtfpBert);
        assert_eq!(config.projectile, Species::Proton);
        assert_eq!(config.energy, 100.0);
        assert_eq!(config.material.name, "G4_Fe");
        assert!(!config.save_random);
        assert!(!config.redo);
        assert_eq!(config.events, DEFAULT_EVENTS);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.event_range(), 0..DEFAULT_EVENTS);
    }

    #[test]
    fn test_registry_closure() {
        for name in PhysicsModel::registry() {
            let config = Configuration::validate(&raw(name, "proton", "10", "G4_Cu")).unwrap();
            assert_eq!(config.model.name(), name);
        }
        for bad in ["FTFP_BERT_HP", "ftfp_bert", "QBBC", "Shielding", "FTFP BERT"] {
            match Configuration::validate(&raw(bad, "proton", "10", "G4_Cu")) {
                Err(HarnessError::UnknownModel { name, registry }) => {
                    assert_eq!(name, bad);
                    assert_eq!(registry.len(), PhysicsModel::ALL.len());
                    assert!(registry.iter().any(|r| r == "INCL"));
                }
                other => panic!("expected UnknownModel for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_model_message_lists_registry() {
        let err = "NOPE".parse::<PhysicsModel>().unwrap_err();
        let message = err.to_string();
        for name in PhysicsModel::registry() {
            assert!(message.contains(name));
        }
    }

    #[test]
    fn test_missing_arguments() {
        let mut args = raw("FTFP_BERT", "proton", "100", "G4_Fe");
        args.material = None;
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MissingArgument(flag)) if flag == "material"
        ));

        let mut args = raw("FTFP_BERT", "proton", "100", "G4_Fe");
        args.energy = Some(String::new());
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MissingArgument(flag)) if flag == "energy"
        ));
    }

    #[test]
    fn test_malformed_energy() {
        for bad in ["abc", "-5", "0", "inf", "NaN", "1e400"] {
            let result = Configuration::validate(&raw("BERT", "proton", bad, "G4_Fe"));
            assert!(
                matches!(result, Err(HarnessError::MalformedNumber { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_energy_upper_limit() {
        let config = Configuration::validate(&raw("BERT", "proton", "1e300", "G4_Fe")).unwrap();
        assert!(crate::event_loop::RunHistograms::for_config(&config).is_ok());

        for bad in ["1e301", "1.6e308"] {
            assert!(matches!(
                Configuration::validate(&raw("BERT", "proton", bad, "G4_Fe")),
                Err(HarnessError::MalformedNumber { flag, .. }) if flag == "energy"
            ));
        }
    }

    #[test]
    fn test_redo_index_must_leave_room_for_one_event() {
        let mut args = raw("BERT", "proton", "10", "G4_Fe");
        args.redo = Some("1".to_string());
        args.redo_index = Some(u64::MAX.to_string());
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MalformedNumber { flag, .. }) if flag == "redo-index"
        ));

        args.redo_index = Some((u64::MAX - 1).to_string());
        let config = Configuration::validate(&args).unwrap();
        assert_eq!(config.event_range().count(), 1);
    }

    #[test]
    fn test_unknown_particle_and_material() {
        assert!(matches!(
            Configuration::validate(&raw("BERT", "tachyon", "1", "G4_Fe")),
            Err(HarnessError::UnknownParticle(_))
        ));
        assert!(matches!(
            Configuration::validate(&raw("BERT", "proton", "1", "G4_Kryptonite")),
            Err(HarnessError::UnknownMaterial(_))
        ));
    }

    #[test]
    fn test_redo_requires_index_and_wins_over_save() {
        let mut args = raw("QGSP_BIC", "pi-", "10", "G4_Cu");
        args.redo = Some("1".to_string());
        args.save_random = Some("1".to_string());
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MissingArgument(flag)) if flag == "redo-index"
        ));

        args.redo_index = Some("7".to_string());
        let config = Configuration::validate(&args).unwrap();
        assert!(config.is_replay());
        assert!(!config.checkpoints_enabled());
        assert_eq!(config.event_range(), 7..8);
    }

    #[test]
    fn test_switch_parsing() {
        let mut args = raw("BIC", "neutron", "2", "G4_Pb");
        args.save_random = Some("0".to_string());
        assert!(!Configuration::validate(&args).unwrap().save_random);
        args.save_random = Some("true".to_string());
        assert!(Configuration::validate(&args).unwrap().checkpoints_enabled());
        args.save_random = Some("yes".to_string());
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_clap_collects_flags() {
        let args = RawArgs::try_parse_from([
            "hadronic_fs_validator",
            "--pl",
            "FTFP_BERT",
            "-p",
            "proton",
            "-e",
            "100",
            "-m",
            "G4_Fe",
            "--save-random",
            "1",
            "--events",
            "3",
        ])
        .unwrap();
        let config = Configuration::validate(&args).unwrap();
        assert!(config.checkpoints_enabled());
        assert_eq!(config.event_range(), 0..3);
    }

    #[test]
    fn test_clap_flag_without_value_is_missing() {
        let args = RawArgs::try_parse_from(["hadronic_fs_validator", "--pl", "-p", "proton"]).unwrap();
        assert!(matches!(
            Configuration::validate(&args),
            Err(HarnessError::MissingArgument(flag)) if flag == "pl"
        ));
    }

    #[test]
    fn test_report_file_name() {
        let config = Configuration::validate(&raw("FTFP_BERT", "proton", "100", "G4_Fe")).unwrap();
        assert_eq!(config.report_file_name(), "FTFP_BERTproton100.G4_Fe.json");

        let config = Configuration::validate(&raw("BERT", "pi-", "2", "G4_Cu")).unwrap();
        assert_eq!(config.report_file_name(), "BERTpi-2.00G4_Cu.json");
    }

    #[test]
    fn test_redo_detection_before_validation() {
        let mut args = RawArgs::default();
        assert!(!args.wants_redo());
        args.redo = Some("1".to_string());
        assert!(args.wants_redo());
    }
}
