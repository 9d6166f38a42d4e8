//! Profile refresh.
//!
//! [`pipeline`] refreshes one profile (fetch, compare, parse, resolve
//! secrets, compose). [`RefreshCycle`] drives the pipeline over every
//! profile and gathers failures into [`RefreshErrors`].

pub mod cycle;
pub mod error;
pub mod pipeline;

pub use cycle::{CycleReport, ProfileOutcome, RefreshCycle};
pub use error::{RefreshError, RefreshErrorKind, RefreshErrors, SECRETS_TAG_SUFFIX};
pub use pipeline::{refresh_profile, FetchedPayload, RefreshContext, RefreshOutcome};
