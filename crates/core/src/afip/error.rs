//! Gateway and authority error types.

use thiserror::Error;

/// Errors from the WSFEv1 gateway or the authority behind it.
#[derive(Debug, Clone, Error)]
pub enum AfipError {
    /// The gateway could not be reached or timed out.
    #[error("AFIP gateway unreachable: {0}")]
    Unavailable(String),

    /// The authority processed the request and rejected the voucher.
    #[error("AFIP rejected the voucher: {message}")]
    Rejected {
        /// Rejection message reported by the authority.
        message: String,
        /// Observation codes and texts attached to the rejection.
        observations: Vec<String>,
    },

    /// The gateway answered with a non-success HTTP status.
    #[error("AFIP gateway returned HTTP {status}: {message}")]
    Gateway {
        /// HTTP status code from the gateway.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The gateway answered but the payload could not be decoded.
    #[error("invalid AFIP gateway response: {0}")]
    InvalidResponse(String),
}

impl AfipError {
    /// Whether a later identical call could plausibly succeed.
    ///
    /// Rejections are deterministic for a given request; transport and
    /// decoding failures are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Gateway { .. } | Self::InvalidResponse(_) => true,
            Self::Rejected { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_not_retryable() {
        let err = AfipError::Rejected {
            message: "CUIT emisor invalido".to_string(),
            observations: vec!["10016: campo CbteFch invalido".to_string()],
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_failures_are_retryable() {
        assert!(AfipError::Unavailable("connection refused".to_string()).is_retryable());
        assert!(AfipError::Gateway {
            status: 503,
            message: "service unavailable".to_string(),
        }
        .is_retryable());
        assert!(AfipError::InvalidResponse("missing field cae".to_string()).is_retryable());
    }

    #[test]
    fn display_includes_rejection_message() {
        let err = AfipError::Rejected {
            message: "voucher out of range".to_string(),
            observations: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "AFIP rejected the voucher: voucher out of range"
        );
    }
}
