//! AES-256-GCM sealing for values persisted in the local client store.
//!
//! Sealed format: base64(nonce[12] || ciphertext).

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::{env, fs};

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from the configured secret, or from a machine identifier
    /// when no secret is configured.
    pub fn from_config(secret: Option<&str>) -> Result<Self, String> {
        match secret {
            Some(s) if !s.is_empty() => Self::from_secret(s),
            _ => Self::from_secret(&machine_id()),
        }
    }

    pub fn from_secret(secret: &str) -> Result<Self, String> {
        let key = derive_key(secret);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| format!("Failed to initialize cipher: {}", e))?;
        Ok(Self { cipher })
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| format!("Encryption failed: {}", e))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    pub fn open(&self, sealed: &str) -> Result<String, String> {
        let combined = general_purpose::STANDARD
            .decode(sealed)
            .map_err(|e| format!("Invalid base64: {}", e))?;

        if combined.len() <= NONCE_LEN {
            return Err("Invalid ciphertext format".to_string());
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| format!("Decryption failed: {}", e))?;

        String::from_utf8(plaintext).map_err(|e| format!("Invalid UTF-8 in decrypted data: {}", e))
    }
}

/// 8 bytes of hash followed by up to 24 bytes of the secret itself.
fn derive_key(secret: &str) -> [u8; 32] {
    let mut hasher = DefaultHasher::new();
    secret.hash(&mut hasher);

    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&hasher.finish().to_le_bytes());
    for (i, &b) in secret.as_bytes().iter().take(24).enumerate() {
        key[8 + i] = b;
    }
    key
}

fn machine_id() -> String {
    if let Ok(id) = fs::read_to_string("/etc/machine-id") {
        return id.trim().to_string();
    }
    env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let cipher = TokenCipher::from_secret("society-secret").unwrap();
        let sealed = cipher.seal("bearer-token-123").unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), "bearer-token-123");
    }

    #[test]
    fn test_nonce_differs_per_seal() {
        let cipher = TokenCipher::from_secret("society-secret").unwrap();
        let a = cipher.seal("same").unwrap();
        let b = cipher.seal("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let sealed = TokenCipher::from_secret("one").unwrap().seal("token").unwrap();
        assert!(TokenCipher::from_secret("two").unwrap().open(&sealed).is_err());
        assert!(TokenCipher::from_secret("one").unwrap().open("bm9wZQ==").is_err());
    }
}
