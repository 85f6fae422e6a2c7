#![deny(warnings)]

//! Settings administration for the construction cost estimator.
//!
//! This crate provides:
//! - A settings store with change notification (observer callbacks and a
//!   `tokio::sync::watch` channel)
//! - Typed partial updates merged key by key, so nested assumptions and factor
//!   maps never lose sibling values
//! - Numeric coercion of raw form text
//! - Resource list editing with stable ids
//! - Logo upload to a data URL
//! - `AdminPanel`, the form-facing controller over an injected store

pub mod coerce;
pub mod panel;
pub mod patch;
pub mod resources;
pub mod store;
pub mod upload;

pub use coerce::{coerce, coerce_named, parse_numeric, CoerceError, NumericField};
pub use panel::AdminPanel;
pub use patch::{
    AssumptionsPatch, LocationFactorsPatch, Merge, QualityFactorsPatch, SettingsPatch,
    SettingsUpdate,
};
pub use resources::ResourceDraft;
pub use store::{SettingsApi, SettingsObserver, SettingsStore, SubscriptionId};
pub use upload::UploadError;

use thiserror::Error;

/// Errors surfaced by admin panel operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Form text could not be turned into an update.
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    /// Logo file could not be used.
    #[error(transparent)]
    Upload(#[from] UploadError),
    /// A required resource field is blank.
    #[error("resource {0} is required")]
    IncompleteDraft(&'static str),
}
