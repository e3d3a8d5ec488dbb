//! # host
//!
//! The host side of rendering: the [`HostSurface`] contract the reconciler
//! drives, a mutation record type, and [`MemorySurface`], an arena-backed
//! reference surface used by the render runtime, tests and benchmarks.
//!
//! Host objects are addressed by [`core_types::HostKey`]; the reconciler never
//! holds references into a surface.

mod memory;
mod mutation;
mod node;
pub mod snapshot;
mod surface;

pub use memory::{CONTAINER_NAME, MemorySurface};
pub use mutation::HostMutation;
pub use node::HostNode;
pub use snapshot::HostSnapshot;
pub use surface::{HostError, HostSurface};
