//! AES-256-GCM payload encryption
//!
//! Wire format is `ivHex:tagHex:cipherHex` with a 16-byte IV and 16-byte
//! authentication tag, interoperable with Node's crypto aes-256-gcm output.

use aes_gcm::{
    AesGcm,
    aead::{Aead, KeyInit, consts::U16, generic_array::GenericArray},
    aes::Aes256,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{AppError, Result};

/// AES-256-GCM with a 16-byte nonce
type Cipher = AesGcm<Aes256, U16>;

const IV_LEN: usize = 16;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Symmetric encryption helper
pub struct Encryption {
    key: [u8; KEY_LEN],
}

impl Encryption {
    /// Build from a 64-character hex key
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key)
            .map_err(|e| AppError::Crypto(format!("Invalid key hex: {}", e)))?;
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| AppError::Crypto("Key must be 32 bytes".to_string()))?;
        Ok(Self { key })
    }

    /// Encrypt to `ivHex:tagHex:cipherHex`
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = Cipher::new_from_slice(&self.key)
            .map_err(|e| AppError::Crypto(e.to_string()))?;

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut ciphertext = cipher
            .encrypt(GenericArray::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| AppError::Crypto("Encryption failed".to_string()))?;

        // The tag is appended to the ciphertext.
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

        Ok(format!(
            "{}:{}:{}",
            hex::encode(iv),
            hex::encode(tag),
            hex::encode(ciphertext)
        ))
    }

    /// Decrypt a `ivHex:tagHex:cipherHex` payload
    pub fn decrypt(&self, payload: &str) -> Result<String> {
        let parts: Vec<&str> = payload.split(':').collect();
        if parts.len() != 3 {
            return Err(AppError::Crypto("Malformed encrypted payload".to_string()));
        }

        let iv = hex::decode(parts[0])
            .map_err(|_| AppError::Crypto("Malformed encrypted payload".to_string()))?;
        let tag = hex::decode(parts[1])
            .map_err(|_| AppError::Crypto("Malformed encrypted payload".to_string()))?;
        let ciphertext = hex::decode(parts[2])
            .map_err(|_| AppError::Crypto("Malformed encrypted payload".to_string()))?;

        if iv.len() != IV_LEN || tag.len() != TAG_LEN {
            return Err(AppError::Crypto("Malformed encrypted payload".to_string()));
        }

        let cipher = Cipher::new_from_slice(&self.key)
            .map_err(|e| AppError::Crypto(e.to_string()))?;

        let mut combined = ciphertext;
        combined.extend_from_slice(&tag);

        let plaintext = cipher
            .decrypt(GenericArray::from_slice(&iv), combined.as_ref())
            .map_err(|_| AppError::Crypto("Decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Crypto("Decrypted payload is not UTF-8".to_string()))
    }

    /// Encrypt and base64-wrap the result
    pub fn encrypt_base64(&self, plaintext: &str) -> Result<String> {
        Ok(BASE64.encode(self.encrypt(plaintext)?))
    }

    /// Unwrap a base64 payload and decrypt it
    pub fn decrypt_base64(&self, payload: &str) -> Result<String> {
        let decoded = BASE64
            .decode(payload)
            .map_err(|_| AppError::Crypto("Invalid base64 payload".to_string()))?;
        let inner = String::from_utf8(decoded)
            .map_err(|_| AppError::Crypto("Invalid base64 payload".to_string()))?;
        self.decrypt(&inner)
    }

    /// Generate a fresh 32-byte key as hex
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        hex::encode(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryption() -> Encryption {
        Encryption::from_hex(&Encryption::generate_key()).unwrap()
    }

    #[test]
    fn round_trip() {
        let enc = encryption();
        let payload = enc.encrypt("warden secret").unwrap();
        assert_eq!(payload.split(':').count(), 3);
        assert_eq!(enc.decrypt(&payload).unwrap(), "warden secret");
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let enc = encryption();
        let payload = enc.encrypt("warden secret").unwrap();
        let mut parts: Vec<String> = payload.split(':').map(String::from).collect();
        // Flip the first ciphertext nibble.
        let flipped = if parts[2].starts_with('0') { "1" } else { "0" };
        parts[2].replace_range(0..1, flipped);
        assert!(enc.decrypt(&parts.join(":")).is_err());
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let enc = encryption();
        assert!(enc.decrypt("not-an-envelope").is_err());
        assert!(enc.decrypt("aa:bb").is_err());
        assert!(enc.decrypt("zz:zz:zz").is_err());
    }

    #[test]
    fn base64_round_trip() {
        let enc = encryption();
        let payload = enc.encrypt_base64("warden secret").unwrap();
        assert_eq!(enc.decrypt_base64(&payload).unwrap(), "warden secret");
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let payload = encryption().encrypt("warden secret").unwrap();
        assert!(encryption().decrypt(&payload).is_err());
    }

    #[test]
    fn generate_key_is_64_hex_chars() {
        let key = Encryption::generate_key();
        assert_eq!(key.len(), 64);
        assert!(hex::decode(&key).is_ok());
    }
}
