//! In-process event router for the payflow worker.
//!
//! Some job types do not report back to the workflow engine alone --
//! they hand work to downstream processing inside this process. The
//! router is the seam between the two:
//!
//! - [`EventBus`] — publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RouterEvent`] — the canonical event envelope.
//! - [`AckWorkflowsRequested`] — payload dispatched when sampled
//!   transactions need acknowledgement workflows started.

pub mod bus;

pub use bus::{
    AckWorkflowsRequested, DispatchError, EventBus, RouterEvent, ACK_WORKFLOWS_REQUESTED,
};
