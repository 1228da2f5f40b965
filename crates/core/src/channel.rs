//! Typed schemas for structured job variables.
//!
//! Variable payloads arrive as JSON (often as a JSON string nested in a
//! variable). Each shape is decoded exactly once at handler entry into
//! one of these types; a schema mismatch is an explicit decode failure,
//! never a silently-missing field.

use serde::{Deserialize, Serialize};

/// Transaction request submitted through the channel, carried in the
/// `channelRequest` variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionChannelRequest {
    pub payer: Party,
    pub payee: Party,
    /// Free-text note attached by the submitter.
    #[serde(default)]
    pub note: String,
}

/// One party (payer or payee) of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub party_id_info: PartyIdInfo,
}

/// Identification of a party: the identifier kind plus the identifier
/// value itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyIdInfo {
    /// Identifier kind, e.g. `MSISDN` or `ACCOUNTID`.
    pub party_id_type: String,
    pub party_identifier: String,
}

/// Wrapper object around [`ErrorInformation`], matching the wire shape
/// `{"errorInformation": {...}}` of the `errorInformation` variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformationWrapper {
    pub error_information: ErrorInformation,
}

/// Structured downstream error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformation {
    /// Numeric error code, transmitted as a string.
    pub error_code: String,
    pub error_description: String,
}

/// Decode the `sampledTxIds` variable: a JSON string encoding a list of
/// transaction ids.
pub fn decode_tx_id_list(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_channel_request() {
        let raw = r#"{
            "payer": {"partyIdInfo": {"partyIdType": "MSISDN", "partyIdentifier": "12345"}},
            "payee": {"partyIdInfo": {"partyIdType": "ACCOUNTID", "partyIdentifier": "67890"}},
            "note": "rent"
        }"#;
        let request: TransactionChannelRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.payer.party_id_info.party_id_type, "MSISDN");
        assert_eq!(request.payee.party_id_info.party_identifier, "67890");
        assert_eq!(request.note, "rent");
    }

    #[test]
    fn missing_note_defaults_to_empty() {
        let raw = r#"{
            "payer": {"partyIdInfo": {"partyIdType": "MSISDN", "partyIdentifier": "1"}},
            "payee": {"partyIdInfo": {"partyIdType": "MSISDN", "partyIdentifier": "2"}}
        }"#;
        let request: TransactionChannelRequest = serde_json::from_str(raw).unwrap();
        assert!(request.note.is_empty());
    }

    #[test]
    fn missing_party_is_a_decode_error() {
        let raw = r#"{"payer": {"partyIdInfo": {"partyIdType": "MSISDN", "partyIdentifier": "1"}}}"#;
        assert!(serde_json::from_str::<TransactionChannelRequest>(raw).is_err());
    }

    #[test]
    fn decodes_error_information_wrapper() {
        let raw = r#"{"errorInformation": {"errorCode": "5001", "errorDescription": "no funds"}}"#;
        let wrapper: ErrorInformationWrapper = serde_json::from_str(raw).unwrap();
        assert_eq!(wrapper.error_information.error_code, "5001");
        assert_eq!(wrapper.error_information.error_description, "no funds");
    }

    #[test]
    fn decodes_tx_id_list() {
        let ids = decode_tx_id_list(r#"["tx-1", "tx-2"]"#).unwrap();
        assert_eq!(ids, vec!["tx-1", "tx-2"]);
    }

    #[test]
    fn rejects_malformed_tx_id_list() {
        assert!(decode_tx_id_list("not json").is_err());
    }
}
