// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::Hash32;

pub const VK_LEN: usize = 32;
pub const SIG_LEN: usize = 64;
pub const PACKED_MIN_LEN: usize = VK_LEN + SIG_LEN;

pub fn sha256(bytes: &[u8]) -> Hash32 {
    let mut h = Sha256::new();
    h.update(bytes);
    h.finalize().into()
}

/// Detached Ed25519 check. Malformed keys or signatures verify as false.
pub fn verify_ed25519(vk: &[u8], sig: &[u8], msg: &[u8]) -> bool {
    let Ok(key_arr) = <[u8; VK_LEN]>::try_from(vk) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_arr) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(sig) else {
        return false;
    };
    key.verify(msg, &signature).is_ok()
}

/// Verifies `vk[32] | body | sig[64]`, where the signed message is
/// everything before the signature (the key included).
pub fn verify_packed(blob: &[u8]) -> bool {
    if blob.len() < PACKED_MIN_LEN {
        return false;
    }
    let body_end = blob.len() - SIG_LEN;
    verify_ed25519(&blob[..VK_LEN], &blob[body_end..], &blob[..body_end])
}

/// Appends the signature over `body` to produce a signed blob.
pub fn seal(key: &SigningKey, mut body: Vec<u8>) -> Vec<u8> {
    let sig = key.sign(&body);
    body.extend_from_slice(&sig.to_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn genuine_signature_verifies() {
        let sk = key(3);
        let msg = b"grant consume on ns/a";
        let sig = sk.sign(msg).to_bytes();
        assert!(verify_ed25519(sk.verifying_key().as_bytes(), &sig, msg));
    }

    #[test]
    fn any_flipped_byte_fails() {
        let sk = key(4);
        let msg = b"abc".to_vec();
        let sig = sk.sign(&msg).to_bytes();
        let vk = sk.verifying_key().to_bytes();
        for i in 0..SIG_LEN {
            let mut bad = sig;
            bad[i] ^= 0x01;
            assert!(!verify_ed25519(&vk, &bad, &msg), "sig byte {i}");
        }
        for i in 0..msg.len() {
            let mut bad = msg.clone();
            bad[i] ^= 0x80;
            assert!(!verify_ed25519(&vk, &sig, &bad), "msg byte {i}");
        }
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let sk = key(5);
        let sig = sk.sign(b"m").to_bytes();
        let vk = sk.verifying_key().to_bytes();
        assert!(!verify_ed25519(&vk[..31], &sig, b"m"));
        assert!(!verify_ed25519(&vk, &sig[..63], b"m"));
    }

    #[test]
    fn packed_blob_roundtrip() {
        let sk = key(6);
        let mut body = sk.verifying_key().to_bytes().to_vec();
        body.extend_from_slice(b"payload");
        let blob = seal(&sk, body);
        assert!(verify_packed(&blob));

        let mut tampered = blob.clone();
        tampered[33] ^= 1;
        assert!(!verify_packed(&tampered));
    }

    #[test]
    fn packed_blob_shorter_than_minimum_is_rejected() {
        assert!(!verify_packed(&[0u8; PACKED_MIN_LEN - 1]));
    }
}
