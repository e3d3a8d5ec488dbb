//! Identifiers shared between the host surface, the reconciler and the runtime.

pub type SurfaceId = u64;

/// Opaque handle to a host-surface object (element node or text node).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostKey(pub u32);

impl HostKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: HostKey = HostKey(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Monotonic counter of successful commits for one rendered surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitVersion(pub u64);

impl CommitVersion {
    pub const INITIAL: CommitVersion = CommitVersion(0);

    pub fn next(self) -> Self {
        CommitVersion(self.0.saturating_add(1))
    }
}
