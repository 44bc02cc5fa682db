//! PKCE (RFC 7636) verifier/challenge and CSRF state for the consent flow

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

const VERIFIER_LENGTH: usize = 64;
const STATE_LENGTH: usize = 32;

/// Unreserved URI characters allowed in a code verifier
const VERIFIER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
const STATE_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn random_string(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Per-authorization secrets: the PKCE pair and the anti-CSRF state
#[derive(Debug, Clone)]
pub struct ConsentChallenge {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl ConsentChallenge {
    pub fn generate() -> Self {
        let verifier = random_string(VERIFIER_CHARSET, VERIFIER_LENGTH);
        let challenge = s256(&verifier);
        let state = random_string(STATE_CHARSET, STATE_LENGTH);
        Self { verifier, challenge, state }
    }
}

/// BASE64URL(SHA256(verifier)) without padding
pub fn s256(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
