//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the code verifier and S256 challenge used during the OAuth
//! authorization flow. The verifier stays server-side until the token
//! exchange; only the challenge travels in the authorization URL.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::settings::OAuthSettings;

/// Bytes of entropy behind each verifier.
const VERIFIER_BYTES: usize = 32;

/// Generate a cryptographically random PKCE code verifier.
///
/// 32 random bytes encoded as URL-safe base64 without padding, giving a
/// 43 character verifier (the RFC 7636 minimum length).
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate the opaque `state` value echoed back by the provider on callback.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Build the authorization URL the user's browser is redirected to.
pub fn build_authorization_url(settings: &OAuthSettings, state: &str, challenge: &str) -> String {
    let params = [
        ("client_id", settings.client_id.as_str()),
        ("redirect_uri", settings.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", settings.scopes.as_str()),
        ("state", state),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoded(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{query}", settings.authorize_endpoint)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn verifier_is_43_char_url_safe_base64() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(is_url_safe(&verifier), "not URL-safe: {verifier}");
    }

    #[test]
    fn verifier_decodes_to_32_bytes() {
        let decoded = URL_SAFE_NO_PAD.decode(generate_verifier()).unwrap();
        assert_eq!(decoded.len(), VERIFIER_BYTES);
    }

    #[test]
    fn verifiers_are_unique() {
        assert_ne!(generate_verifier(), generate_verifier());
    }

    #[test]
    fn challenge_is_deterministic() {
        let verifier = generate_verifier();
        assert_eq!(compute_challenge(&verifier), compute_challenge(&verifier));
    }

    #[test]
    fn different_verifiers_give_different_challenges() {
        let a = compute_challenge(&generate_verifier());
        let b = compute_challenge(&generate_verifier());
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_does_not_contain_verifier() {
        let verifier = generate_verifier();
        let challenge = compute_challenge(&verifier);
        assert_ne!(challenge, verifier);
        assert_ne!(challenge, URL_SAFE_NO_PAD.encode(verifier.as_bytes()));
    }

    #[test]
    fn challenge_matches_known_value() {
        // SHA256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        assert_eq!(
            compute_challenge("hello"),
            "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ"
        );
    }

    #[test]
    fn challenge_is_43_chars() {
        let challenge = compute_challenge("test-verifier");
        assert_eq!(challenge.len(), 43);
        assert!(is_url_safe(&challenge));
    }

    #[test]
    fn state_is_32_hex_chars_and_unique() {
        let a = generate_state();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_state());
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let settings = OAuthSettings::default();
        let challenge = compute_challenge("test-verifier");
        let url = build_authorization_url(&settings, "state-123", &challenge);

        assert!(url.starts_with("https://auth.tesla.com/oauth2/v3/authorize?"));
        assert!(url.contains("client_id=ownerapi"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fauth.tesla.com%2Fvoid%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20vehicle_device_data%20vehicle_charging_cmd"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains(&format!("code_challenge={challenge}")));
        assert!(url.contains("code_challenge_method=S256"));
    }

    #[test]
    fn urlencoded_escapes_reserved_characters() {
        assert_eq!(urlencoded("a b&c=d/e?"), "a%20b%26c%3Dd%2Fe%3F");
        assert_eq!(urlencoded("safe-_.~"), "safe-_.~");
    }
}
