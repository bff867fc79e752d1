//! Failure classification for retry decisions.
//!
//! Transport errors are first reduced to a [`TransportFault`] at the network
//! boundary so that classification itself never inspects stack-specific error
//! strings.

use crate::error::ApiError;
use crate::types::Method;
use std::error::Error as StdError;
use std::io;

/// Outcome category of one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Aborted through a cancellation handle. Never retried or reported.
    Cancelled,
    /// No response at all, and the fault is safe to retry.
    NetworkFailure,
    /// 5xx without an application error code on an idempotent method.
    IdempotentServerFailure,
    /// Everything else.
    TerminalFailure,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkFailure | Self::IdempotentServerFailure)
    }
}

/// Certificate validation problems reported by the TLS layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateFault {
    UnknownIssuer,
    BadSignature,
    NotYetValid,
    Expired,
    SelfSigned,
    Revoked,
    ChainTooLong,
    InvalidCa,
    Untrusted,
    HostnameMismatch,
    Other,
}

/// Network-stack-independent description of why no response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    ConnectionRefused,
    ConnectionReset,
    ConnectionAborted,
    TimedOut,
    HostNotFound,
    NetworkUnreachable,
    Certificate(CertificateFault),
    OutOfMemory,
    /// Request body could not be produced or sent.
    Body,
    Other,
}

impl TransportFault {
    /// Faults that more attempts cannot fix: broken TLS, unresolvable hosts.
    pub fn is_retry_denied(self) -> bool {
        matches!(
            self,
            Self::HostNotFound
                | Self::NetworkUnreachable
                | Self::Certificate(_)
                | Self::OutOfMemory
        )
    }

    /// Reduce a `reqwest` error to a tagged fault.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::TimedOut;
        }
        if err.is_body() || err.is_builder() {
            return Self::Body;
        }

        let mut source: Option<&(dyn StdError + 'static)> = err.source();
        let mut fault = Self::Other;
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                if let Some(mapped) = from_io_kind(io_err.kind()) {
                    return mapped;
                }
            }
            if let Some(mapped) = from_cause_text(&cause.to_string()) {
                fault = mapped;
                if fault.is_retry_denied() {
                    return fault;
                }
            }
            source = cause.source();
        }
        if fault == Self::Other && err.is_connect() {
            return Self::ConnectionRefused;
        }
        fault
    }
}

fn from_io_kind(kind: io::ErrorKind) -> Option<TransportFault> {
    match kind {
        io::ErrorKind::ConnectionRefused => Some(TransportFault::ConnectionRefused),
        io::ErrorKind::ConnectionReset => Some(TransportFault::ConnectionReset),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe => {
            Some(TransportFault::ConnectionAborted)
        }
        io::ErrorKind::UnexpectedEof => Some(TransportFault::ConnectionReset),
        io::ErrorKind::TimedOut => Some(TransportFault::TimedOut),
        io::ErrorKind::OutOfMemory => Some(TransportFault::OutOfMemory),
        _ => None,
    }
}

// Resolver and TLS failures surface as opaque boxed errors from hyper and
// the TLS backend; their descriptions are the only stable signal.
fn from_cause_text(text: &str) -> Option<TransportFault> {
    let lower = text.to_ascii_lowercase();
    if lower.contains("dns error") || lower.contains("failed to lookup address") {
        return Some(TransportFault::HostNotFound);
    }
    if lower.contains("network is unreachable") {
        return Some(TransportFault::NetworkUnreachable);
    }
    if lower.contains("certificate") || lower.contains("tls handshake") {
        let cert = if lower.contains("expired") {
            CertificateFault::Expired
        } else if lower.contains("not valid yet") || lower.contains("not yet valid") {
            CertificateFault::NotYetValid
        } else if lower.contains("self signed") || lower.contains("self-signed") {
            CertificateFault::SelfSigned
        } else if lower.contains("unknown issuer") || lower.contains("unknownissuer") {
            CertificateFault::UnknownIssuer
        } else if lower.contains("revoked") {
            CertificateFault::Revoked
        } else if lower.contains("not valid for name") || lower.contains("hostname mismatch") {
            CertificateFault::HostnameMismatch
        } else if lower.contains("signature") {
            CertificateFault::BadSignature
        } else {
            CertificateFault::Other
        };
        return Some(TransportFault::Certificate(cert));
    }
    None
}

/// One failed network attempt, as seen by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    Cancelled,
    /// No response arrived.
    Transport(TransportFault),
    /// A non-2xx response arrived.
    Response {
        status: u16,
        has_application_code: bool,
    },
}

impl AttemptFailure {
    /// Describe a dispatcher error for classification.
    pub fn from_error(err: &ApiError) -> Self {
        match err {
            ApiError::Http(inner) => match inner.status() {
                Some(status) => Self::Response {
                    status: status.as_u16(),
                    has_application_code: false,
                },
                None => Self::Transport(TransportFault::from_reqwest(inner)),
            },
            ApiError::Status { code, .. } => Self::Response {
                status: *code,
                has_application_code: err.application_code().is_some(),
            },
            ApiError::SessionExpired { .. } => Self::Response {
                status: 401,
                has_application_code: false,
            },
            ApiError::InvalidRequest(_) => Self::Transport(TransportFault::Body),
            ApiError::InvalidResponse(_) => Self::Transport(TransportFault::Other),
        }
    }
}

/// Categorize a failed attempt of a request issued with `method`.
pub fn classify(failure: &AttemptFailure, method: Method) -> FailureKind {
    match failure {
        AttemptFailure::Cancelled => FailureKind::Cancelled,
        AttemptFailure::Transport(fault) => {
            if *fault == TransportFault::TimedOut
                || *fault == TransportFault::Body
                || fault.is_retry_denied()
            {
                FailureKind::TerminalFailure
            } else {
                FailureKind::NetworkFailure
            }
        }
        AttemptFailure::Response {
            status,
            has_application_code,
        } => {
            if (500..=599).contains(status) && !has_application_code && method.is_idempotent() {
                FailureKind::IdempotentServerFailure
            } else {
                FailureKind::TerminalFailure
            }
        }
    }
}
