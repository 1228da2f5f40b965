//! Canonical names of well-known workflow variables.
//!
//! These are the variable names shared between the BPMN process
//! definitions and the worker. Handlers read and write variables only
//! through these constants -- no inline string literals.

/// Serialized transaction request submitted through the channel API.
pub const CHANNEL_REQUEST: &str = "channelRequest";

/// Structured error payload relayed from a downstream failure.
pub const ERROR_INFORMATION: &str = "errorInformation";

/// Human-readable description accompanying `errorInformation`.
pub const ERROR_DESCRIPTION: &str = "errorDescription";

/// JSON-encoded list of transaction ids sampled for acknowledgement.
pub const SAMPLED_TX_IDS: &str = "sampledTxIds";

/// Batch the sampled transactions belong to.
pub const BATCH_ID: &str = "batchId";

/// Correlation id of the transfer, stable across the whole workflow.
pub const TRANSACTION_ID: &str = "transactionId";

/// Outcome flag written by the validation handler.
pub const TRANSACTION_VALID: &str = "transactionValid";

/// Marks that the transfer-create step itself did not fail, as opposed
/// to a relayed downstream error.
pub const TRANSFER_CREATE_FAILED: &str = "transferCreateFailed";

/// Terminal failure flag carried in the `transferResponse` message.
pub const TRANSFER_FAILED: &str = "transferFailed";

/// Terminal transfer state carried in the `transferResponse` message.
pub const TRANSFER_STATE: &str = "transferState";

/// Free-form diagnostic message written by the consistency check.
pub const MESSAGE: &str = "message";
