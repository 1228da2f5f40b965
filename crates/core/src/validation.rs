//! Transaction payload validation.
//!
//! Ported behaviour-for-behaviour from the legacy channel connector,
//! including its quirks, so that workflow outcomes stay identical.

use std::sync::LazyLock;

use regex::Regex;

use crate::channel::TransactionChannelRequest;

/// Identifier kinds accepted for character-class validation.
const ACCEPTED_ID_TYPES: [&str; 2] = ["MSISDN", "ACCOUNTID"];

/// Note marker that triggers the duplicate-transaction override.
const DUPLICATE_MARKER: &str = "Duplicate Transaction";

/// Sentence-case counterpart checked once the marker is present.
const DUPLICATE_MARKER_VARIANT: &str = "Duplicate transaction";

/// Identifiers must consist entirely of digits, `*`, `#`, or `+`.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d*#+]+$").expect("valid regex"));

/// Whether the identifier kind participates in character-class checks.
fn is_accepted_id_type(id_type: &str) -> bool {
    ACCEPTED_ID_TYPES
        .iter()
        .any(|accepted| id_type.eq_ignore_ascii_case(accepted))
}

/// Validate a transaction request.
///
/// Rules, in order:
/// 1. Invalid by default.
/// 2. If the payer identifier kind is accepted, the result is whether
///    the payer identifier matches the character class.
/// 3. If the payee identifier kind is also accepted, the result is
///    whether the *payee* identifier matches -- the payer outcome from
///    step 2 is discarded. This asymmetry is inherited from the legacy
///    connector and kept verbatim pending product confirmation.
/// 4. If the note contains `"Duplicate Transaction"`, the result
///    becomes the absence of the sentence-case variant `"Duplicate
///    transaction"`, overriding steps 2-3 entirely.
pub fn validate_transaction(request: &TransactionChannelRequest) -> bool {
    let mut valid = false;

    let payer = &request.payer.party_id_info;
    let payee = &request.payee.party_id_info;

    if is_accepted_id_type(&payer.party_id_type) {
        valid = IDENTIFIER_PATTERN.is_match(&payer.party_identifier);
        if is_accepted_id_type(&payee.party_id_type) {
            valid = IDENTIFIER_PATTERN.is_match(&payee.party_identifier);
        }
    }

    if request.note.contains(DUPLICATE_MARKER) {
        valid = !request.note.contains(DUPLICATE_MARKER_VARIANT);
    }

    valid
}
