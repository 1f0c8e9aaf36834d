//! Copy-method generation engine.
//!
//! ## Crate layout
//! - `classify`: decides how each field takes part in a copy.
//! - `config`: TOML-backed generator configuration.
//! - `engine`: providers, units, change notices and incremental recomputation.
//! - `error`: engine errors and their classification.
//! - `identity`: metadata identifiers and identifier schemes.
//! - `obs`: event sink boundary between the engine and logging.
//! - `registry`: dependency and trigger registries.
//! - `synth`: statement synthesis and text rendering.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod obs;
pub mod registry;
pub mod synth;

pub use error::EngineError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        classify::{ClassifiedField, ClassifyContext, FieldKind, TriggerLookup},
        config::{ConflictPolicy, CopyConfig},
        engine::{
            ChangeNotice, CopyProvider, Engine, GeneratedUnit, ProcessReport, UnitOutput,
            UnitProvider, UnitState,
        },
        error::{EngineError, ErrorClass},
        identity::{IdScheme, MetadataId, ProducedKind},
        synth::{GeneratedMethod, Statement, Synthesis, ValueCopy},
    };
}
