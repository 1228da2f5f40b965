//! Transfer error-code table.
//!
//! Downstream failures carry a four-digit numeric code in the
//! `errorInformation` variable. The thousands digit selects the broad
//! category; the full code maps to a named error. The error relay
//! decodes both purely for observability -- an unknown code is logged,
//! never fatal.

use std::fmt;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Broad error category, derived from the thousands digit of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 1xxx -- transport-level failures between services.
    Communication,
    /// 2xxx -- failures inside the responding server.
    Server,
    /// 3xxx -- request rejected by the receiver (validation, unknown
    /// identifiers, expiry).
    Client,
    /// 4xxx -- failures attributable to the payer or the payer's FSP.
    Payer,
    /// 5xxx -- failures attributable to the payee or the payee's FSP.
    Payee,
    /// Anything outside the defined ranges.
    Unknown,
}

impl ErrorCategory {
    /// Categorize any numeric code by its thousands digit.
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            1 => Self::Communication,
            2 => Self::Server,
            3 => Self::Client,
            4 => Self::Payer,
            5 => Self::Payee,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Communication => "communication",
            Self::Server => "server",
            Self::Client => "client",
            Self::Payer => "payer",
            Self::Payee => "payee",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Known codes
// ---------------------------------------------------------------------------

/// A known transfer error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorCode {
    CommunicationError = 1000,
    DestinationCommunicationError = 1001,
    GenericServerError = 2000,
    InternalServerError = 2001,
    NotImplemented = 2002,
    ServiceCurrentlyUnavailable = 2003,
    ServerTimedOut = 2004,
    ServerBusy = 2005,
    GenericClientError = 3000,
    GenericValidationError = 3100,
    MalformedSyntax = 3101,
    MissingElement = 3102,
    TooManyElements = 3103,
    TooLargePayload = 3104,
    InvalidSignature = 3105,
    GenericIdNotFound = 3200,
    DestinationFspError = 3201,
    PayerFspIdNotFound = 3202,
    PayeeFspIdNotFound = 3203,
    PartyNotFound = 3204,
    QuoteIdNotFound = 3205,
    TransactionRequestIdNotFound = 3206,
    TransactionIdNotFound = 3207,
    TransferIdNotFound = 3208,
    GenericExpiredError = 3300,
    TransactionRequestExpired = 3301,
    QuoteExpired = 3302,
    TransferExpired = 3303,
    GenericPayerError = 4000,
    PayerFspInsufficientLiquidity = 4001,
    GenericPayerRejection = 4100,
    PayerRejectedTransactionRequest = 4101,
    PayerLimitError = 4200,
    PayerPermissionError = 4300,
    GenericPayerBlockedError = 4400,
    GenericPayeeError = 5000,
    PayeeFspInsufficientLiquidity = 5001,
    GenericPayeeRejection = 5100,
    PayeeRejectedQuote = 5101,
    PayeeLimitError = 5200,
    PayeePermissionError = 5300,
    GenericPayeeBlockedError = 5400,
}

impl TransferErrorCode {
    /// Resolve a numeric code to its named error, if known.
    pub fn from_code(code: u16) -> Option<Self> {
        use TransferErrorCode::*;
        let known = match code {
            1000 => CommunicationError,
            1001 => DestinationCommunicationError,
            2000 => GenericServerError,
            2001 => InternalServerError,
            2002 => NotImplemented,
            2003 => ServiceCurrentlyUnavailable,
            2004 => ServerTimedOut,
            2005 => ServerBusy,
            3000 => GenericClientError,
            3100 => GenericValidationError,
            3101 => MalformedSyntax,
            3102 => MissingElement,
            3103 => TooManyElements,
            3104 => TooLargePayload,
            3105 => InvalidSignature,
            3200 => GenericIdNotFound,
            3201 => DestinationFspError,
            3202 => PayerFspIdNotFound,
            3203 => PayeeFspIdNotFound,
            3204 => PartyNotFound,
            3205 => QuoteIdNotFound,
            3206 => TransactionRequestIdNotFound,
            3207 => TransactionIdNotFound,
            3208 => TransferIdNotFound,
            3300 => GenericExpiredError,
            3301 => TransactionRequestExpired,
            3302 => QuoteExpired,
            3303 => TransferExpired,
            4000 => GenericPayerError,
            4001 => PayerFspInsufficientLiquidity,
            4100 => GenericPayerRejection,
            4101 => PayerRejectedTransactionRequest,
            4200 => PayerLimitError,
            4300 => PayerPermissionError,
            4400 => GenericPayerBlockedError,
            5000 => GenericPayeeError,
            5001 => PayeeFspInsufficientLiquidity,
            5100 => GenericPayeeRejection,
            5101 => PayeeRejectedQuote,
            5200 => PayeeLimitError,
            5300 => PayeePermissionError,
            5400 => GenericPayeeBlockedError,
            _ => return None,
        };
        Some(known)
    }

    /// The numeric code.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Screaming-snake name, matching the upstream error registry.
    pub fn name(&self) -> &'static str {
        use TransferErrorCode::*;
        match self {
            CommunicationError => "COMMUNICATION_ERROR",
            DestinationCommunicationError => "DESTINATION_COMMUNICATION_ERROR",
            GenericServerError => "GENERIC_SERVER_ERROR",
            InternalServerError => "INTERNAL_SERVER_ERROR",
            NotImplemented => "NOT_IMPLEMENTED",
            ServiceCurrentlyUnavailable => "SERVICE_CURRENTLY_UNAVAILABLE",
            ServerTimedOut => "SERVER_TIMED_OUT",
            ServerBusy => "SERVER_BUSY",
            GenericClientError => "GENERIC_CLIENT_ERROR",
            GenericValidationError => "GENERIC_VALIDATION_ERROR",
            MalformedSyntax => "MALFORMED_SYNTAX",
            MissingElement => "MISSING_ELEMENT",
            TooManyElements => "TOO_MANY_ELEMENTS",
            TooLargePayload => "TOO_LARGE_PAYLOAD",
            InvalidSignature => "INVALID_SIGNATURE",
            GenericIdNotFound => "GENERIC_ID_NOT_FOUND",
            DestinationFspError => "DESTINATION_FSP_ERROR",
            PayerFspIdNotFound => "PAYER_FSP_ID_NOT_FOUND",
            PayeeFspIdNotFound => "PAYEE_FSP_ID_NOT_FOUND",
            PartyNotFound => "PARTY_NOT_FOUND",
            QuoteIdNotFound => "QUOTE_ID_NOT_FOUND",
            TransactionRequestIdNotFound => "TRANSACTION_REQUEST_ID_NOT_FOUND",
            TransactionIdNotFound => "TRANSACTION_ID_NOT_FOUND",
            TransferIdNotFound => "TRANSFER_ID_NOT_FOUND",
            GenericExpiredError => "GENERIC_EXPIRED_ERROR",
            TransactionRequestExpired => "TRANSACTION_REQUEST_EXPIRED",
            QuoteExpired => "QUOTE_EXPIRED",
            TransferExpired => "TRANSFER_EXPIRED",
            GenericPayerError => "GENERIC_PAYER_ERROR",
            PayerFspInsufficientLiquidity => "PAYER_FSP_INSUFFICIENT_LIQUIDITY",
            GenericPayerRejection => "GENERIC_PAYER_REJECTION",
            PayerRejectedTransactionRequest => "PAYER_REJECTED_TRANSACTION_REQUEST",
            PayerLimitError => "PAYER_LIMIT_ERROR",
            PayerPermissionError => "PAYER_PERMISSION_ERROR",
            GenericPayerBlockedError => "GENERIC_PAYER_BLOCKED_ERROR",
            GenericPayeeError => "GENERIC_PAYEE_ERROR",
            PayeeFspInsufficientLiquidity => "PAYEE_FSP_INSUFFICIENT_LIQUIDITY",
            GenericPayeeRejection => "GENERIC_PAYEE_REJECTION",
            PayeeRejectedQuote => "PAYEE_REJECTED_QUOTE",
            PayeeLimitError => "PAYEE_LIMIT_ERROR",
            PayeePermissionError => "PAYEE_PERMISSION_ERROR",
            GenericPayeeBlockedError => "GENERIC_PAYEE_BLOCKED_ERROR",
        }
    }

    /// Category of this code.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
