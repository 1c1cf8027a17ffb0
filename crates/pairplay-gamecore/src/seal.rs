//! Sealed envelope: the encrypted layout handed to the client.
//!
//! The per-session key is derived as SHA-256 over fresh key material and
//! the session id, so the key is never embedded in the envelope payload.
//! ChaCha20-Poly1305 gives authenticated encryption: a wrong key or a
//! tampered ciphertext fails loudly instead of silently yielding a wrong
//! layout.
//!
//! The envelope carries no server authority; the server never trusts a
//! client's replay of it. The hash-sealed deployment commits to the layout
//! with [`commit`] and drops the cleartext entirely.

use std::fmt;

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use pairplay_types::constants::DECK_SIZE;
use pairplay_types::{CardLayout, LayoutDigest, PairplayError, Result, SessionId};

use crate::shuffle::fill_random;

/// Ciphertext + nonce handed to the client. Decryptable only with the
/// separately-delivered [`SessionKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 12],
}

/// Per-session symmetric key. Redacted in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey([redacted])")
    }
}

/// Derive the per-session key from random material and the session id.
fn derive_key(material: &[u8; 32], session_id: SessionId) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"pairplay:session-key:v1:");
    hasher.update(material);
    hasher.update(session_id.as_bytes());
    hasher.finalize().into()
}

/// Seal a layout for the given session.
///
/// # Errors
/// [`PairplayError::EntropyFailure`] if the OS entropy source fails;
/// [`PairplayError::SealFailure`] if encryption fails.
pub fn seal(layout: &CardLayout, session_id: SessionId) -> Result<(SealedEnvelope, SessionKey)> {
    let mut material = [0u8; 32];
    fill_random(&mut material)?;
    let key_bytes = derive_key(&material, session_id);

    let mut nonce = [0u8; 12];
    fill_random(&mut nonce)?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key_bytes));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), layout.as_bytes().as_slice())
        .map_err(|e| PairplayError::SealFailure(e.to_string()))?;

    Ok((
        SealedEnvelope { ciphertext, nonce },
        SessionKey(key_bytes),
    ))
}

/// Open a sealed envelope with the session key.
///
/// Used by tests and by the trusted development client shim; the server
/// itself never unseals a client-supplied envelope as authority.
///
/// # Errors
/// [`PairplayError::EnvelopeAuthFailed`] on a wrong key or tampered
/// ciphertext; never silently returns wrong data.
pub fn unseal(envelope: &SealedEnvelope, key: &SessionKey) -> Result<CardLayout> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.nonce), envelope.ciphertext.as_slice())
        .map_err(|_| PairplayError::EnvelopeAuthFailed)?;

    let cards: [u8; DECK_SIZE] = plaintext
        .try_into()
        .map_err(|_| PairplayError::EnvelopeAuthFailed)?;
    CardLayout::from_cards(cards)
}

/// Salted commitment to a layout for the hash-sealed deployment.
pub fn commit(layout: &CardLayout) -> Result<LayoutDigest> {
    let mut salt = [0u8; 16];
    fill_random(&mut salt)?;
    Ok(LayoutDigest {
        hash: digest_with_salt(&salt, layout),
        salt,
    })
}

/// Check a layout against a previously stored commitment.
#[must_use]
pub fn verify_commitment(digest: &LayoutDigest, layout: &CardLayout) -> bool {
    digest_with_salt(&digest.salt, layout) == digest.hash
}

fn digest_with_salt(salt: &[u8; 16], layout: &CardLayout) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"pairplay:layout:v1:");
    hasher.update(salt);
    hasher.update(layout.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::create_layout;

    #[test]
    fn seal_unseal_roundtrip() {
        let layout = create_layout().unwrap();
        let session_id = SessionId::new();
        let (envelope, key) = seal(&layout, session_id).unwrap();
        let opened = unseal(&envelope, &key).unwrap();
        assert_eq!(opened, layout);
    }

    #[test]
    fn wrong_key_fails_loudly() {
        let layout = create_layout().unwrap();
        let (envelope, _key) = seal(&layout, SessionId::new()).unwrap();
        let wrong = SessionKey::from_bytes([0x42; 32]);
        let err = unseal(&envelope, &wrong).unwrap_err();
        assert!(matches!(err, PairplayError::EnvelopeAuthFailed));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let layout = create_layout().unwrap();
        let (mut envelope, key) = seal(&layout, SessionId::new()).unwrap();
        envelope.ciphertext[0] ^= 0xFF;
        let err = unseal(&envelope, &key).unwrap_err();
        assert!(matches!(err, PairplayError::EnvelopeAuthFailed));
    }

    #[test]
    fn key_not_embedded_in_envelope() {
        let layout = create_layout().unwrap();
        let (envelope, key) = seal(&layout, SessionId::new()).unwrap();
        let key_bytes = key.as_bytes();
        let found = envelope
            .ciphertext
            .windows(key_bytes.len())
            .any(|w| w == key_bytes);
        assert!(!found, "session key leaked into the ciphertext payload");
    }

    #[test]
    fn same_layout_different_sessions_different_keys() {
        let layout = create_layout().unwrap();
        let (_, k1) = seal(&layout, SessionId::new()).unwrap();
        let (_, k2) = seal(&layout, SessionId::new()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn commitment_verifies_only_the_committed_layout() {
        let layout = create_layout().unwrap();
        let digest = commit(&layout).unwrap();
        assert!(verify_commitment(&digest, &layout));

        let mut other = create_layout().unwrap();
        while other == layout {
            other = create_layout().unwrap();
        }
        assert!(!verify_commitment(&digest, &other));
    }

    #[test]
    fn session_key_debug_redacted() {
        let key = SessionKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{key:?}"), "SessionKey([redacted])");
    }
}
