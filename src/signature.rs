//! `X-Hub-Signature` verification (HMAC-SHA1, GitHub compatible).

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::error::HookError;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
const SIGNATURE_PREFIX: &str = "sha1=";

/// Returns `sha1=<lowercase hex>` for `payload` keyed with `secret`.
pub fn sign(secret: &str, payload: &[u8]) -> Result<String, HookError> {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).map_err(|_| HookError::InvalidSignature)?;
    mac.update(payload);

    Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes())))
}

/// Checks `signature` against the HMAC of `payload`.
///
/// An unset or empty `secret` disables verification. With a secret set, an
/// absent or empty header is rejected, as is any header that is not exactly
/// the string produced by [`sign`] for this body. The comparison runs in
/// constant time.
pub fn verify(secret: Option<&str>, signature: Option<&str>, payload: &[u8]) -> Result<(), HookError> {
    let secret = match secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => return Ok(()),
    };

    let signature = match signature {
        Some(signature) if !signature.is_empty() => signature,
        _ => return Err(HookError::MissingSignature),
    };

    let expected = sign(secret, payload)?;
    if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        Ok(())
    } else {
        Err(HookError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"ref":"refs/heads/main"}"#;

    #[test]
    fn sign_matches_known_digest() {
        // echo -n "The quick brown fox jumps over the lazy dog" | openssl dgst -sha1 -hmac key
        let signature = sign("key", b"The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(signature, "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9");
    }

    #[test]
    fn accepts_matching_signature() {
        let signature = sign("s3cr3t", BODY).unwrap();
        assert!(verify(Some("s3cr3t"), Some(&signature), BODY).is_ok());
    }

    #[test]
    fn skips_verification_without_secret() {
        assert!(verify(None, None, BODY).is_ok());
        assert!(verify(None, Some("sha1=deadbeef"), BODY).is_ok());
        assert!(verify(Some(""), Some("garbage"), BODY).is_ok());
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            verify(Some("s3cr3t"), None, BODY),
            Err(HookError::MissingSignature)
        ));
        assert!(matches!(
            verify(Some("s3cr3t"), Some(""), BODY),
            Err(HookError::MissingSignature)
        ));
    }

    #[test]
    fn rejects_signature_for_other_body() {
        let signature = sign("s3cr3t", b"another body").unwrap();
        assert!(matches!(
            verify(Some("s3cr3t"), Some(&signature), BODY),
            Err(HookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_signature_with_other_secret() {
        let signature = sign("not-the-secret", BODY).unwrap();
        assert!(matches!(
            verify(Some("s3cr3t"), Some(&signature), BODY),
            Err(HookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        let digest = sign("s3cr3t", BODY).unwrap();
        let bare_hex = digest.trim_start_matches("sha1=");

        for header in [bare_hex, "sha256=abcd", "sha1=zzzz", "sha1="] {
            assert!(
                matches!(verify(Some("s3cr3t"), Some(header), BODY), Err(HookError::InvalidSignature)),
                "{header} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_uppercase_digest() {
        let signature = sign("s3cr3t", BODY).unwrap();
        let uppercase = format!("sha1={}", signature.trim_start_matches("sha1=").to_uppercase());
        assert_ne!(uppercase, signature);

        assert!(matches!(
            verify(Some("s3cr3t"), Some(&uppercase), BODY),
            Err(HookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_uppercase_prefix() {
        let signature = sign("s3cr3t", BODY).unwrap().replacen("sha1=", "SHA1=", 1);

        assert!(matches!(
            verify(Some("s3cr3t"), Some(&signature), BODY),
            Err(HookError::InvalidSignature)
        ));
    }
}
