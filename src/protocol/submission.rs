//! One vote, one POST.
//!
//! [`VoteSubmitter`] is resolved from configuration at startup: the full
//! endpoint URL, the static header set, the payload schema and the
//! success policy.  [`VoteSubmitter::submit`] performs at most one HTTP
//! round trip and never retries.

use log::{info, warn};

use super::VoterIdentity;
use super::payload::PayloadSchema;
use crate::app::ports::{ConnectivityPort, HttpPort, HttpResponse};
use crate::config::StationConfig;

/// Result of a single submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Backend accepted the vote.
    Accepted { status: u16 },
    /// Backend answered, but neither the status nor the body signalled success.
    Rejected { status: u16 },
    /// Link was down; no request was built.
    Offline,
    /// The exchange failed before a status was received.
    TransportFailed,
}

impl SubmissionOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

// ───────────────────────────────────────────────────────────────
// Response classification
// ───────────────────────────────────────────────────────────────

/// Decides whether a backend response means "vote recorded".
///
/// Success if the status is whitelisted, OR (when body checking is
/// enabled) the body contains both the key and the value substrings.
/// The body test is a plain substring search, not JSON parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessPolicy {
    codes: heapless::Vec<u16, 8>,
    body_match: Option<(String, String)>,
}

impl SuccessPolicy {
    pub fn new(codes: &[u16], body_match: Option<(&str, &str)>) -> Self {
        let mut list = heapless::Vec::new();
        for &code in codes.iter().take(8) {
            let _ = list.push(code);
        }
        Self {
            codes: list,
            body_match: body_match.map(|(k, v)| (k.into(), v.into())),
        }
    }

    pub fn from_config(config: &StationConfig) -> Self {
        let body = config
            .parse_response_body
            .then_some((config.success_response_key.as_str(), config.success_response_value.as_str()));
        Self::new(&config.success_codes, body)
    }

    pub fn classify(&self, response: &HttpResponse) -> bool {
        if self.codes.contains(&response.status) {
            return true;
        }
        match &self.body_match {
            Some((key, value)) => response.body.contains(key.as_str()) && response.body.contains(value.as_str()),
            None => false,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Submitter
// ───────────────────────────────────────────────────────────────

/// Everything needed to report a vote, fixed at startup.
#[derive(Debug, Clone)]
pub struct VoteSubmitter {
    url: String,
    headers: Vec<(String, String)>,
    schema: PayloadSchema,
    policy: SuccessPolicy,
    log_vote_data: bool,
    log_http_responses: bool,
}

impl VoteSubmitter {
    pub fn from_config(config: &StationConfig) -> Self {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if config.use_api_key {
            headers.push((config.api_key_header.clone(), config.api_key.clone()));
        }
        if config.use_bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", config.bearer_token)));
        }

        Self {
            url: config.endpoint_url(),
            headers,
            schema: PayloadSchema::from_config(config),
            policy: SuccessPolicy::from_config(config),
            log_vote_data: config.log_vote_data,
            log_http_responses: config.log_http_responses,
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Report one vote.  Blocks for the full round trip.
    ///
    /// Fails fast with [`SubmissionOutcome::Offline`] when the link is
    /// down, before any payload is built.
    pub fn submit(
        &self,
        voter: VoterIdentity,
        timestamp_ms: u64,
        net: &mut (impl ConnectivityPort + HttpPort),
    ) -> SubmissionOutcome {
        if !net.is_connected() {
            warn!("Vote for {} not sent: network down", voter);
            return SubmissionOutcome::Offline;
        }

        let body = match self.schema.build(voter, timestamp_ms).to_json() {
            Ok(body) => body,
            Err(e) => {
                warn!("Vote for {} not sent: {}", voter, e);
                return SubmissionOutcome::TransportFailed;
            }
        };
        if self.log_vote_data {
            info!("Vote payload: {}", String::from_utf8_lossy(&body));
        }

        let headers: Vec<(&str, &str)> = self.headers().collect();
        match net.post(&self.url, &headers, &body) {
            Ok(response) => {
                if self.log_http_responses {
                    info!("HTTP {} | {}", response.status, response.body);
                }
                if self.policy.classify(&response) {
                    SubmissionOutcome::Accepted { status: response.status }
                } else {
                    SubmissionOutcome::Rejected { status: response.status }
                }
            }
            Err(e) => {
                warn!("Vote POST to {} failed: {}", self.url, e);
                SubmissionOutcome::TransportFailed
            }
        }
    }
}
