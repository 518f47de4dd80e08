//! Repository descriptors and update policies

use crate::error::{ReprobeError, ReprobeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Repository identity used in cache keys.
///
/// Two repositories with the same id are the same physical source for
/// caching purposes, wherever their locations point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryId(Arc<str>);

impl RepositoryId {
    /// Ids are taken verbatim; surrounding whitespace is an error, not trimmed
    pub fn new(id: impl AsRef<str>) -> ReprobeResult<Self> {
        let id = id.as_ref();
        if id.trim().is_empty() {
            return Err(ReprobeError::repository(id, "id must not be empty"));
        }
        if id.trim() != id {
            return Err(ReprobeError::repository(
                id,
                "id must not have surrounding whitespace",
            ));
        }
        Ok(Self(Arc::from(id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How long a negative check stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpdatePolicy {
    /// Re-check on every lookup
    Always,
    /// Re-check once per (UTC) calendar day
    #[default]
    Daily,
    /// Re-check once the given number of minutes has elapsed
    Interval(u64),
    /// Never re-check within a session
    Never,
}

impl UpdatePolicy {
    /// Whether a check made at `checked_at` is still valid at `now`
    pub fn is_fresh(&self, checked_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::Always => false,
            Self::Never => true,
            Self::Daily => {
                let midnight = now
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|t| t.and_utc())
                    .unwrap_or(now);
                checked_at >= midnight
            }
            Self::Interval(minutes) => match Self::cutoff(*minutes, now) {
                Some(cutoff) => checked_at >= cutoff,
                // Window reaches past the earliest representable time
                None => true,
            },
        }
    }

    fn cutoff(minutes: u64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let window = chrono::Duration::try_minutes(i64::try_from(minutes).ok()?)?;
        now.checked_sub_signed(window)
    }
}

impl FromStr for UpdatePolicy {
    type Err = ReprobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "always" => Ok(Self::Always),
            "daily" => Ok(Self::Daily),
            "never" => Ok(Self::Never),
            other => {
                let minutes = other
                    .strip_prefix("interval:")
                    .and_then(|m| m.parse::<u64>().ok())
                    .ok_or_else(|| ReprobeError::InvalidUpdatePolicy(s.to_string()))?;
                Ok(Self::Interval(minutes))
            }
        }
    }
}

impl TryFrom<String> for UpdatePolicy {
    type Error = ReprobeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UpdatePolicy> for String {
    fn from(value: UpdatePolicy) -> Self {
        value.to_string()
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Daily => write!(f, "daily"),
            Self::Never => write!(f, "never"),
            Self::Interval(minutes) => write!(f, "interval:{}", minutes),
        }
    }
}

/// Immutable description of one source to query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    id: RepositoryId,
    location: String,
    update_policy: UpdatePolicy,
    enabled: bool,
}

impl Repository {
    /// Create an enabled repository with the default (daily) policy
    pub fn new(id: impl AsRef<str>, location: impl Into<String>) -> ReprobeResult<Self> {
        let id = RepositoryId::new(id)?;
        let location = location.into();
        if location.trim().is_empty() {
            return Err(ReprobeError::repository(
                id.as_str(),
                "location must not be empty",
            ));
        }
        Ok(Self {
            id,
            location,
            update_policy: UpdatePolicy::default(),
            enabled: true,
        })
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn id(&self) -> &RepositoryId {
        &self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl FromStr for Repository {
    type Err = ReprobeError;

    /// Parse `id=location` or `id=location@policy`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, rest) = s
            .split_once('=')
            .ok_or_else(|| ReprobeError::repository(s, "expected id=location"))?;

        // Locations may contain '@' (userinfo), so only a parseable suffix is a policy
        let (location, policy) = match rest.rsplit_once('@') {
            Some((location, policy)) => match policy.parse::<UpdatePolicy>() {
                Ok(policy) => (location, policy),
                Err(_) => (rest, UpdatePolicy::default()),
            },
            None => (rest, UpdatePolicy::default()),
        };

        Ok(Repository::new(id, location)?.with_update_policy(policy))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.location)
    }
}
