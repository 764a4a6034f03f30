/*
[INPUT]:  Error text reported by an EVM node or wallet provider
[OUTPUT]: Typed transaction errors
[POS]:    Contract layer - provider error translation
[UPDATE]: When new node error strings need mapping
*/

use crate::auth::ProviderError;
use crate::http::IjazahError;

const REVERT_MARKERS: [&str; 2] = ["execution reverted:", "reverted with reason string"];

/// Map a raw provider message onto the error taxonomy.
///
/// Unrecognised text becomes `ConnectionFailed` carrying the original message.
pub fn classify_provider_error(message: &str) -> IjazahError {
    let lower = message.to_ascii_lowercase();

    if lower.contains("insufficient funds") {
        IjazahError::InsufficientFunds
    } else if lower.contains("nonce too low") {
        IjazahError::NonceTooLow
    } else if lower.contains("replacement transaction underpriced")
        || lower.contains("replacement fee too low")
    {
        IjazahError::ReplacementUnderpriced
    } else if lower.contains("user rejected") || lower.contains("user denied") {
        IjazahError::UserRejected
    } else if lower.contains("revert") {
        IjazahError::TransactionReverted(revert_reason(message))
    } else {
        IjazahError::ConnectionFailed(message.to_string())
    }
}

/// Same as [`classify_provider_error`], honouring the rejection code first
pub fn classify_provider_failure(err: &ProviderError) -> IjazahError {
    if err.code == ProviderError::USER_REJECTED {
        return IjazahError::UserRejected;
    }
    classify_provider_error(&err.message)
}

fn revert_reason(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    for marker in REVERT_MARKERS {
        if let Some(index) = lower.find(marker) {
            // markers are ASCII so byte offsets line up with the original
            let reason = message[index + marker.len()..]
                .trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .trim();
            if !reason.is_empty() {
                return reason.to_string();
            }
        }
    }
    "unknown reason".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("insufficient funds for gas * price + value", "InsufficientFunds")]
    #[case("Nonce too low: next nonce 5, tx nonce 3", "NonceTooLow")]
    #[case("replacement transaction underpriced", "ReplacementUnderpriced")]
    #[case("MetaMask Tx Signature: User denied transaction signature.", "UserRejected")]
    #[case("connection reset by peer", "ConnectionFailed")]
    fn test_classify_kind(#[case] message: &str, #[case] kind: &str) {
        let classified = match classify_provider_error(message) {
            IjazahError::InsufficientFunds => "InsufficientFunds",
            IjazahError::NonceTooLow => "NonceTooLow",
            IjazahError::ReplacementUnderpriced => "ReplacementUnderpriced",
            IjazahError::UserRejected => "UserRejected",
            IjazahError::ConnectionFailed(_) => "ConnectionFailed",
            other => panic!("unexpected classification: {other:?}"),
        };
        assert_eq!(classified, kind);
    }

    #[rstest]
    #[case("execution reverted: Certificate already revoked", "Certificate already revoked")]
    #[case(
        "VM Exception while processing transaction: reverted with reason string 'Not an issuer'",
        "Not an issuer"
    )]
    #[case("execution reverted", "unknown reason")]
    fn test_revert_reason(#[case] message: &str, #[case] reason: &str) {
        match classify_provider_error(message) {
            IjazahError::TransactionReverted(got) => assert_eq!(got, reason),
            other => panic!("expected revert, got {other:?}"),
        }
    }

    #[test]
    fn test_rejection_code_wins() {
        let err = ProviderError::new(ProviderError::USER_REJECTED, "execution reverted: nope");
        assert!(matches!(classify_provider_failure(&err), IjazahError::UserRejected));

        let err = ProviderError::new(-32000, "nonce too low");
        assert!(matches!(classify_provider_failure(&err), IjazahError::NonceTooLow));
    }
}
