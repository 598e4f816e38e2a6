use std::fmt;

use crate::scene::NodeId;

/// Unified error type for scene and engine operations.
///
/// Numerical degeneracies inside the stepper (zero relative velocity,
/// near-zero swept-time denominators) are guarded internally and never
/// surface here; only setup misuse does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The engine was stepped before any body registry was built.
    WorldDetached,
    /// The world changed structurally since the last registry rebuild.
    StaleMetadata {
        /// Revision the engine last saw.
        seen: u64,
        /// Current world revision.
        actual: u64,
    },
    /// The handle does not refer to a live node.
    NoSuchNode(NodeId),
    /// The node exists but carries no body.
    NotABody(NodeId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorldDetached => {
                write!(f, "physics engine stepped before update_metadata was called")
            }
            Self::StaleMetadata { seen, actual } => write!(
                f,
                "body registry is stale (seen revision {seen}, world at {actual}); \
                 call update_metadata after adding or removing bodies"
            ),
            Self::NoSuchNode(id) => write!(f, "node {} does not exist", id.0),
            Self::NotABody(id) => write!(f, "node {} is not a body", id.0),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::StaleMetadata { seen: 1, actual: 3 };
        let text = err.to_string();
        assert!(text.contains("revision 1"));
        assert!(text.contains("update_metadata"));

        assert!(Error::NoSuchNode(NodeId(7)).to_string().contains('7'));
    }
}
