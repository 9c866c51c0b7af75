//! OpenPGP detached-signature verification.
//!
//! The detached signature and the announcer's key are both ASCII-armored.
//! Each block must declare the expected armor type and decode to exactly one
//! signature or one public key. The archive bytes are then hashed with the
//! algorithm named in the signature packet and checked against the key's
//! primary public-key packet.
//!
//! Structural problems are errors. A well-formed signature that does not
//! match the archive or the key is a [`SignatureVerdict::Invalid`] value.

use pgp::{Deserializable, SignedPublicKey, StandaloneSignature};
use serde::Serialize;
use std::fmt;
use std::io::{Cursor, Read};

/// Armor block types accepted by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorKind {
    /// `-----BEGIN PGP SIGNATURE-----`
    Signature,
    /// `-----BEGIN PGP PUBLIC KEY BLOCK-----`
    PublicKey,
}

impl ArmorKind {
    /// The block label between `BEGIN ` and the closing dashes.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Signature => "PGP SIGNATURE",
            Self::PublicKey => "PGP PUBLIC KEY BLOCK",
        }
    }
}

impl fmt::Display for ArmorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors arising while decoding signature or key material.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The input is not an armored block of the expected type.
    #[error("not an armored {expected}: {found}")]
    InvalidArmor {
        /// The block type that was required.
        expected: ArmorKind,
        /// What was found instead.
        found: String,
    },

    /// The signature block does not hold exactly one signature packet.
    #[error("not a valid signature file: {reason}")]
    InvalidSignaturePacket {
        /// Description of the parse failure.
        reason: String,
    },

    /// The key block does not hold exactly one public key.
    #[error("not a valid public key file: {reason}")]
    InvalidKeyPacket {
        /// Description of the parse failure.
        reason: String,
    },

    /// Reading the signature or key input failed.
    #[error("failed to read {what}")]
    Io {
        /// Which input was being read.
        what: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result of a cryptographic signature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SignatureVerdict {
    /// The signature was made over these bytes by this key.
    Valid,
    /// The signature does not verify.
    Invalid {
        /// Why verification failed.
        reason: String,
    },
}

impl SignatureVerdict {
    /// Return whether the signature verified.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Verify `archive` against a detached armored `signature` made by `key`.
///
/// # Errors
///
/// Returns [`SignatureError`] if either input cannot be read, is not an
/// armored block of the required type, or does not decode to exactly one
/// packet of the required kind.
pub fn verify_signature(
    archive: &[u8],
    mut signature: impl Read,
    mut key: impl Read,
) -> Result<SignatureVerdict, SignatureError> {
    let signature = decode_signature(read_all(&mut signature, "signature")?)?;
    let key = decode_public_key(read_all(&mut key, "public key")?)?;

    match signature.verify(&key.primary_key, archive) {
        Ok(()) => Ok(SignatureVerdict::Valid),
        Err(e) => Ok(SignatureVerdict::Invalid {
            reason: e.to_string(),
        }),
    }
}

/// Decode an armored detached signature holding exactly one packet.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidArmor`] or
/// [`SignatureError::InvalidSignaturePacket`].
pub fn decode_signature(bytes: Vec<u8>) -> Result<StandaloneSignature, SignatureError> {
    require_armor(&bytes, ArmorKind::Signature)?;
    let (packets, _headers) = StandaloneSignature::from_armor_many(Cursor::new(bytes))
        .map_err(|e| SignatureError::InvalidArmor {
            expected: ArmorKind::Signature,
            found: e.to_string(),
        })?;
    let signatures = packets
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SignatureError::InvalidSignaturePacket {
            reason: e.to_string(),
        })?;
    <[StandaloneSignature; 1]>::try_from(signatures)
        .map(|[signature]| signature)
        .map_err(|found| SignatureError::InvalidSignaturePacket {
            reason: format!("expected one signature packet, found {}", found.len()),
        })
}

/// Decode an armored public key block holding exactly one key.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidArmor`] or
/// [`SignatureError::InvalidKeyPacket`].
pub fn decode_public_key(bytes: Vec<u8>) -> Result<SignedPublicKey, SignatureError> {
    require_armor(&bytes, ArmorKind::PublicKey)?;
    let keys = read_public_keys(bytes).map_err(|e| SignatureError::InvalidKeyPacket {
        reason: e.to_string(),
    })?;
    <[SignedPublicKey; 1]>::try_from(keys)
        .map(|[key]| key)
        .map_err(|found| SignatureError::InvalidKeyPacket {
            reason: format!("expected one public key, found {}", found.len()),
        })
}

/// Parse every transferable public key in an armored keyring.
///
/// # Errors
///
/// Returns the parser error for malformed armor or packets.
pub fn read_public_keys(bytes: Vec<u8>) -> Result<Vec<SignedPublicKey>, pgp::errors::Error> {
    let (keys, _headers) = SignedPublicKey::from_armor_many(Cursor::new(bytes))?;
    keys.collect()
}

/// Check that the first non-blank line opens an armor block of `expected`.
fn require_armor(bytes: &[u8], expected: ArmorKind) -> Result<(), SignatureError> {
    let found = armor_label(bytes);
    match found {
        Some(label) if label == expected.label() => Ok(()),
        Some(label) => Err(SignatureError::InvalidArmor {
            expected,
            found: label.to_owned(),
        }),
        None => Err(SignatureError::InvalidArmor {
            expected,
            found: "no armor header".to_owned(),
        }),
    }
}

/// Return the label of the first armor header line, if any.
fn armor_label(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?
        .strip_prefix("-----BEGIN ")?
        .strip_suffix("-----")
}

fn read_all(input: &mut impl Read, what: &'static str) -> Result<Vec<u8>, SignatureError> {
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .map_err(|source| SignatureError::Io { what, source })?;
    Ok(buf)
}
