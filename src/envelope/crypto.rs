//! Encryption envelope.
//!
//! Encrypted properties wrap their plaintext as `IV(16) || ciphertext`
//! inside the chunked binary envelope. Cipher: AES-256-CBC with PKCS#7
//! padding, a fresh random IV per serialize, and a caller-supplied 32-byte
//! key that is never retained across the call.

use crate::constants::{IV_SIZE, KEY_SIZE, MAX_ENCRYPTED_PLAINTEXT};
use crate::errors::{CodecError, Result};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use std::fmt;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

/// A 32-byte AES-256 key.
///
/// Key material never appears in `Debug` output.
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Wrap 32 raw key bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap a byte slice, rejecting any length other than 32.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CodecError::FormatInvalid {
            type_name: "encryption key",
            property: format!("{} bytes", bytes.len()),
            message: format!("key must be exactly {KEY_SIZE} bytes"),
        })?;
        Ok(Self(raw))
    }

    /// Decode a standard-base64 key blob.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = STANDARD.decode(encoded).map_err(|e| CodecError::FormatInvalid {
            type_name: "encryption key",
            property: "base64".to_string(),
            message: format!("base64 decode failed: {e}"),
        })?;
        Self::from_slice(&raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([redacted])")
    }
}

/// Fetch the caller's key, failing when an encrypted type was invoked
/// without one.
pub(crate) fn require_key<'a>(
    type_name: &'static str,
    property: &str,
    key: Option<&'a EncryptionKey>,
) -> Result<&'a EncryptionKey> {
    key.ok_or_else(|| CodecError::FormatInvalid {
        type_name,
        property: property.to_string(),
        message: "encryption key required".to_string(),
    })
}

/// Encrypt `plaintext` under `key`, returning `IV || ciphertext`.
pub(crate) fn seal(
    type_name: &'static str,
    property: &str,
    key: &EncryptionKey,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    if plaintext.len() > MAX_ENCRYPTED_PLAINTEXT {
        return Err(CodecError::SizeExceeded {
            type_name,
            property: property.to_string(),
            size: plaintext.len(),
            limit: MAX_ENCRYPTED_PLAINTEXT,
        });
    }

    let mut iv = [0u8; IV_SIZE];
    rand::rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut sealed = Vec::with_capacity(IV_SIZE + ciphertext.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);

    tracing::trace!(property, plaintext_size = plaintext.len(), "Sealed encrypted payload");
    Ok(sealed)
}

/// Decrypt an `IV || ciphertext` payload under `key`.
pub(crate) fn open(
    type_name: &'static str,
    property: &str,
    key: &EncryptionKey,
    sealed: &[u8],
) -> Result<Vec<u8>> {
    let decode_failure = |message: &str| CodecError::DecodeFailure {
        type_name,
        property: property.to_string(),
        message: message.to_string(),
    };

    if sealed.len() < IV_SIZE + BLOCK_SIZE {
        return Err(decode_failure("truncated ciphertext"));
    }
    let (iv, ciphertext) = sealed.split_at(IV_SIZE);
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(decode_failure("ciphertext length is not a multiple of the block size"));
    }
    let iv: [u8; IV_SIZE] = iv
        .try_into()
        .map_err(|_| decode_failure("truncated ciphertext"))?;

    Aes256CbcDec::new(key.as_bytes().into(), (&iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| decode_failure("decryption failed (wrong key or corrupted ciphertext)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(fill: u8) -> EncryptionKey {
        EncryptionKey::from_bytes([fill; KEY_SIZE])
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = test_key(0);
        let sealed = seal("encrypted blob", "p", &key, b"secret").unwrap();

        // 16-byte IV plus one padded block.
        assert_eq!(sealed.len(), IV_SIZE + BLOCK_SIZE);
        assert_eq!(open("encrypted blob", "p", &key, &sealed).unwrap(), b"secret");
    }

    #[test]
    fn test_seal_uses_fresh_iv() {
        let key = test_key(1);
        let first = seal("encrypted blob", "p", &key, b"same plaintext").unwrap();
        let second = seal("encrypted blob", "p", &key, b"same plaintext").unwrap();
        assert_ne!(first, second);
        assert_ne!(first[..IV_SIZE], second[..IV_SIZE]);
    }

    #[test]
    fn test_open_with_wrong_key_fails_or_differs() {
        let sealed = seal("encrypted blob", "p", &test_key(0), b"secret").unwrap();
        match open("encrypted blob", "p", &test_key(9), &sealed) {
            Err(err) => assert!(matches!(err, CodecError::DecodeFailure { .. })),
            // Padding can survive by chance; the plaintext cannot.
            Ok(recovered) => assert_ne!(recovered, b"secret"),
        }
    }

    #[test]
    fn test_open_rejects_truncated_payload() {
        let err = open("encrypted blob", "p", &test_key(0), &[0u8; IV_SIZE]).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }

    #[test]
    fn test_open_rejects_partial_block() {
        let sealed = vec![0u8; IV_SIZE + BLOCK_SIZE + 5];
        let err = open("encrypted blob", "p", &test_key(0), &sealed).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { .. }));
    }

    #[test]
    fn test_plaintext_ceiling() {
        let key = test_key(0);
        let max = vec![0u8; MAX_ENCRYPTED_PLAINTEXT];
        assert!(seal("encrypted blob", "p", &key, &max).is_ok());

        let over = vec![0u8; MAX_ENCRYPTED_PLAINTEXT + 1];
        let err = seal("encrypted blob", "p", &key, &over).unwrap_err();
        assert!(matches!(err, CodecError::SizeExceeded { .. }));
    }

    #[test]
    fn test_key_from_slice_and_base64() {
        assert!(EncryptionKey::from_slice(&[0u8; 31]).is_err());
        assert!(EncryptionKey::from_slice(&[0u8; KEY_SIZE]).is_ok());

        let encoded = STANDARD.encode([7u8; KEY_SIZE]);
        let key = EncryptionKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; KEY_SIZE]);

        assert!(EncryptionKey::from_base64("@@@").is_err());
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let key = test_key(0x42);
        assert_eq!(format!("{key:?}"), "EncryptionKey([redacted])");
    }
}
