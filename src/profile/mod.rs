//! Configuration profiles.
//!
//! A profile moves through three shapes as it is refreshed:
//!
//! - [`ProfileDefinition`]: what to fetch, from agent configuration
//! - [`LoadedRemoteProfile`]: a fetched and parsed payload
//! - [`AppliedProfile`]: the parsed payload plus its resolved secrets
//!
//! [`ApplyingProfile`] records the version last applied for each profile.

pub mod applied;
pub mod definition;
pub mod parser;

pub use applied::AppliedProfile;
pub use definition::{ApplyingProfile, ProfileDefinition};
pub use parser::{parse, LoadedRemoteProfile, ParseError, ProfileContents, ProfileFormat, SECRETS_KEY};
