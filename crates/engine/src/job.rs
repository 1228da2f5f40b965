//! A leased unit of work handed out by the workflow engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use payflow_core::VariableMap;

/// One job, exclusively leased by this worker for a bounded duration.
///
/// Everything here is engine-assigned and read-only to handlers except
/// the variable snapshot, which handlers overlay through
/// [`VariableContext`](payflow_core::VariableContext).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedJob {
    /// Unique key, stable for the job's lifetime across re-leases.
    pub key: i64,

    /// Type tag selecting which handler applies.
    #[serde(rename = "type")]
    pub job_type: String,

    /// Identifier of the process definition that emitted the job.
    pub process_id: String,

    /// Key of the owning workflow instance.
    pub process_instance_key: i64,

    /// Remaining retry budget as seen by the engine.
    pub retries: u32,

    /// Variable snapshot visible to the handler at lease time.
    #[serde(default)]
    pub variables: VariableMap,
}

impl ActivatedJob {
    /// Look up a variable in the lease-time snapshot.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_from_gateway_wire_format() {
        let raw = r#"{
            "key": 42,
            "type": "validate-transaction",
            "processId": "transfer-flow",
            "processInstanceKey": 7001,
            "retries": 3,
            "variables": {"transactionId": "tx-9"}
        }"#;
        let job: ActivatedJob = serde_json::from_str(raw).unwrap();
        assert_eq!(job.key, 42);
        assert_eq!(job.job_type, "validate-transaction");
        assert_eq!(job.process_id, "transfer-flow");
        assert_eq!(job.process_instance_key, 7001);
        assert_eq!(job.retries, 3);
        assert_eq!(job.variable("transactionId"), Some(&json!("tx-9")));
    }

    #[test]
    fn missing_variables_default_to_empty() {
        let raw = r#"{
            "key": 1,
            "type": "relay-success",
            "processId": "p",
            "processInstanceKey": 2,
            "retries": 0
        }"#;
        let job: ActivatedJob = serde_json::from_str(raw).unwrap();
        assert!(job.variables.is_empty());
    }
}
