//! Incident name generation.
//!
//! Names look like `20240101-brave-otter`: the UTC date without separators,
//! followed by a random adjective and noun. No uniqueness check is made; the
//! word lists make same-day collisions unlikely at human incident rates.

use std::fmt;

use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::words::{ADJECTIVES, NOUNS};

/// A generated incident name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncidentName(String);

impl IncidentName {
    /// Generate a name from today's UTC date and the thread-local RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(Utc::now().date_naive(), &mut rand::thread_rng())
    }

    /// Generate a name for a given date using the supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Self {
        // Both lists are non-empty constants.
        let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("quiet");
        let noun = NOUNS.choose(rng).copied().unwrap_or("otter");
        Self(format!("{}-{adjective}-{noun}", date.format("%Y%m%d")))
    }

    /// Recover the incident name from an incident channel name.
    ///
    /// Returns `None` when the channel does not carry the prefix.
    #[must_use]
    pub fn from_channel_name(prefix: &str, channel_name: &str) -> Option<Self> {
        channel_name
            .strip_prefix(prefix)
            .map(|name| Self(name.to_string()))
    }

    /// Channel name for this incident under the given prefix.
    #[must_use]
    pub fn channel_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IncidentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
