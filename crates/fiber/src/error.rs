use crate::tree::FiberId;
use host::HostError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// A fiber reached commit without its own host object, or under a parent
    /// that has none.
    DetachedFiber { fiber: FiberId, tag: String },
    /// `alternate` points at a fiber the previous generation does not have.
    StaleAlternate { fiber: FiberId },
    /// A render was requested while the root was inside `work` or a commit.
    SchedulerReentry,
    Host(HostError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DetachedFiber { fiber, tag } => {
                write!(f, "fiber {} <{tag}> has no attached host object", fiber.0)
            }
            RenderError::StaleAlternate { fiber } => {
                write!(f, "fiber {} has a stale alternate link", fiber.0)
            }
            RenderError::SchedulerReentry => {
                write!(f, "render requested while the root is busy")
            }
            RenderError::Host(err) => write!(f, "host surface error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for RenderError {
    fn from(err: HostError) -> Self {
        RenderError::Host(err)
    }
}
