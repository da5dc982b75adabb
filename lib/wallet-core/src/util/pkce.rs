//! Proof Key for Code Exchange, <https://www.rfc-editor.org/rfc/rfc7636>

use wallet_crypto::hasher::sha256::SHA256;
use wallet_crypto::utilities::{generate_length_in_range, generate_unreserved};
use wallet_crypto::{Hasher, HasherError};

pub const CODE_VERIFIER_MIN_LENGTH: usize = 43;
pub const CODE_VERIFIER_MAX_LENGTH: usize = 128;
pub const CODE_CHALLENGE_METHOD: &str = "S256";

#[derive(Clone, Debug)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl PkceChallenge {
    pub fn generate() -> Result<Self, HasherError> {
        let code_verifier = generate_code_verifier();
        let code_challenge = code_challenge(&code_verifier)?;

        Ok(Self {
            code_verifier,
            code_challenge,
        })
    }
}

pub fn generate_code_verifier() -> String {
    let length = generate_length_in_range(CODE_VERIFIER_MIN_LENGTH, CODE_VERIFIER_MAX_LENGTH);
    generate_unreserved(length)
}

/// `BASE64URL-ENCODE(SHA256(ASCII(code_verifier)))`
pub fn code_challenge(code_verifier: &str) -> Result<String, HasherError> {
    SHA256.hash_base64_url(code_verifier.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_code_verifier_length_and_charset() {
        for _ in 0..200 {
            let verifier = generate_code_verifier();

            assert!(
                (CODE_VERIFIER_MIN_LENGTH..=CODE_VERIFIER_MAX_LENGTH).contains(&verifier.len())
            );
            assert!(
                verifier
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
            );
        }
    }

    #[test]
    fn test_code_challenge_rfc7636_vector() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_generate_matches_challenge() {
        let pkce = PkceChallenge::generate().unwrap();
        assert_eq!(
            pkce.code_challenge,
            code_challenge(&pkce.code_verifier).unwrap()
        );
    }
}
