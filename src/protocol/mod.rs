//! Vote submission protocol.
//!
//! - [`payload`]: ordered field schema and the JSON vote body
//! - [`submission`]: headers, the single POST, response classification

pub mod payload;
pub mod submission;

use core::fmt;

/// Highest template slot a voter can be enrolled into. The library search
/// covers `0..=MAX_TEMPLATE_SLOT`.
pub const MAX_TEMPLATE_SLOT: u16 = 200;

/// Template slot returned by a successful biometric match.
///
/// Rendered as `V<slot>` on the display and in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoterIdentity(pub u16);

impl VoterIdentity {
    pub fn slot(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VoterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}
