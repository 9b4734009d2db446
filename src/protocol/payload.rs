//! Vote payload schema and serialisation.
//!
//! The set of payload fields is resolved once from [`StationConfig`] into
//! an ordered [`PayloadSchema`].  Building a payload walks that list, so
//! key order and presence never vary between requests:
//!
//! ```text
//! voter_id, timestamp, device_id, [election_id], [candidate_id], [location], [polling_station]
//! ```

use std::borrow::Cow;

use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::VoterIdentity;
use crate::config::StationConfig;
use crate::error::HttpError;

/// Where a field's value comes from at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// The matched identity, rendered `V<slot>`.
    VoterId,
    /// Device uptime in milliseconds at submission.
    Timestamp,
    /// A configured constant string.
    Fixed(String),
}

/// One entry of the payload schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: String,
    pub source: FieldSource,
}

impl FieldDescriptor {
    fn new(key: &str, source: FieldSource) -> Self {
        Self { key: key.into(), source }
    }
}

/// Ordered list of payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSchema {
    fields: Vec<FieldDescriptor>,
}

impl PayloadSchema {
    /// Resolve the field set from configuration.
    ///
    /// The three required fields always lead; optional fields follow in
    /// their fixed order when their include flag is set.
    pub fn from_config(config: &StationConfig) -> Self {
        let keys = &config.field_keys;
        let mut fields = vec![
            FieldDescriptor::new(&keys.voter_id, FieldSource::VoterId),
            FieldDescriptor::new(&keys.timestamp, FieldSource::Timestamp),
            FieldDescriptor::new(&keys.device_id, FieldSource::Fixed(config.device_id.clone())),
        ];

        let optional = [
            (config.include_election_id, &keys.election_id, &config.election_id),
            (config.include_candidate_id, &keys.candidate_id, &config.candidate_id),
            (config.include_location, &keys.location, &config.device_location),
            (config.include_polling_station, &keys.polling_station, &config.polling_station_id),
        ];
        for (enabled, key, value) in optional {
            if enabled {
                fields.push(FieldDescriptor::new(key, FieldSource::Fixed(value.clone())));
            }
        }

        if config.include_vote_hash {
            warn!("include_vote_hash is set but no vote hash is computed; '{}' omitted", keys.vote_hash);
        }

        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Evaluate every descriptor for one vote.
    pub fn build(&self, voter: VoterIdentity, timestamp_ms: u64) -> VotePayload<'_> {
        let entries = self
            .fields
            .iter()
            .map(|field| {
                let value = match &field.source {
                    FieldSource::VoterId => FieldValue::Text(Cow::Owned(voter.to_string())),
                    FieldSource::Timestamp => FieldValue::Number(timestamp_ms),
                    FieldSource::Fixed(s) => FieldValue::Text(Cow::Borrowed(s.as_str())),
                };
                (field.key.as_str(), value)
            })
            .collect();
        VotePayload { entries }
    }
}

/// A payload value: JSON string or unsigned number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(u64),
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_u64(*n),
        }
    }
}

/// Ordered key/value pairs of one vote, serialised as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotePayload<'a> {
    entries: Vec<(&'a str, FieldValue<'a>)>,
}

impl<'a> VotePayload<'a> {
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue<'a>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Compact JSON body.
    pub fn to_json(&self) -> Result<Vec<u8>, HttpError> {
        serde_json::to_vec(self).map_err(|_| HttpError::Encode)
    }
}

impl Serialize for VotePayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
