//! Enrollment bridge command and response schemas.
//!
//! Requests are JSON objects tagged by `action`:
//!
//! ```text
//! {"action":"ENROLL_BIOMETRIC","voterId":"VOTER-1","id":12}
//! {"action":"VERIFY_BIOMETRIC","voterId":"VOTER-1"}
//! {"action":"CLEAR_BIOMETRIC_DB"}
//! ```
//!
//! Responses are tagged by `type` (`success` / `error`).

use serde::{Deserialize, Serialize};

use crate::protocol::MAX_TEMPLATE_SLOT;

/// Highest template slot the enrollment bridge will write.
pub const MAX_TEMPLATE_ID: i64 = MAX_TEMPLATE_SLOT as i64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action")]
pub enum BridgeCommand {
    #[serde(rename = "ENROLL_BIOMETRIC")]
    Enroll {
        #[serde(rename = "voterId", default)]
        voter_id: Option<String>,
        /// Target slot; validated against `1..=MAX_TEMPLATE_ID` by the engine.
        #[serde(default)]
        id: Option<i64>,
    },
    #[serde(rename = "VERIFY_BIOMETRIC")]
    Verify {
        #[serde(rename = "voterId", default)]
        voter_id: Option<String>,
    },
    #[serde(rename = "CLEAR_BIOMETRIC_DB")]
    ClearDatabase,
}

/// Why a line did not yield a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not JSON, or no string `action` field, or bad field types.
    Malformed,
    /// Well-formed, but the action is not one we know.
    UnknownAction(String),
}

#[derive(Deserialize)]
struct ActionOnly {
    action: String,
}

impl BridgeCommand {
    pub fn parse(line: &[u8]) -> Result<Self, ParseError> {
        match serde_json::from_slice::<Self>(line) {
            Ok(cmd) => Ok(cmd),
            Err(_) => match serde_json::from_slice::<ActionOnly>(line) {
                Ok(tagged) if !is_known(&tagged.action) => Err(ParseError::UnknownAction(tagged.action)),
                _ => Err(ParseError::Malformed),
            },
        }
    }
}

fn is_known(action: &str) -> bool {
    matches!(action, "ENROLL_BIOMETRIC" | "VERIFY_BIOMETRIC" | "CLEAR_BIOMETRIC_DB")
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeResponse {
    Success {
        message: &'static str,
        #[serde(rename = "voterId", skip_serializing_if = "Option::is_none")]
        voter_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u16>,
    },
    Error {
        error: &'static str,
        #[serde(rename = "voterId", skip_serializing_if = "Option::is_none")]
        voter_id: Option<String>,
    },
}

impl BridgeResponse {
    pub fn success(message: &'static str, voter_id: Option<String>, id: Option<u16>) -> Self {
        Self::Success { message, voter_id, id }
    }

    pub fn error(error: &'static str, voter_id: Option<String>) -> Self {
        Self::Error { error, voter_id }
    }

    /// JSON followed by `\n`.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

// Response texts.
pub const MSG_ENROLLED: &str = "Fingerprint enrolled";
pub const MSG_VERIFIED: &str = "Fingerprint verified";
pub const MSG_CLEARED: &str = "All fingerprints cleared";
pub const ERR_ENROLL: &str = "Enrollment failed";
pub const ERR_BAD_ID: &str = "Invalid template id";
pub const ERR_NO_MATCH: &str = "No match found";
pub const ERR_VERIFY: &str = "Verification failed";
pub const ERR_CLEAR: &str = "Failed to clear DB";
