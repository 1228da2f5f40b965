//! Payflow job worker.
//!
//! Leases jobs by type from the workflow engine, executes the handler
//! bound to each type inside a per-type bounded pool, and reports
//! completion or failure back to the engine. Some handlers additionally
//! publish a correlated message that resumes a separate workflow
//! instance, or dispatch work onto the in-process event router.

pub mod config;
pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod publisher;
pub mod registry;
