//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Hashes are stored as `pbkdf2_sha256$<rounds>$<salt hex>$<digest hex>` so
//! the round count can be raised without invalidating existing accounts.

use std::fmt;

use rand::RngCore;
use sha2::Sha256;

/// Round count applied to newly derived hashes.
pub const DEFAULT_HASH_ROUNDS: u32 = 210_000;

const SCHEME: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Errors raised when parsing an encoded hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashFormatError {
    #[error("password hash must have four '$'-separated fields")]
    MalformedLayout,
    #[error("unsupported password hash scheme: {0}")]
    UnsupportedScheme(String),
    #[error("password hash round count is invalid")]
    InvalidRounds,
    #[error("password hash salt or digest is not valid hex")]
    InvalidHex,
}

/// Encoded password hash.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::PasswordHash;
///
/// let hash = PasswordHash::derive_with_rounds("studentpass", 1_000);
/// assert!(hash.verify("studentpass"));
/// assert!(!hash.verify("wrong"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt and [`DEFAULT_HASH_ROUNDS`].
    pub fn derive(password: &str) -> Self {
        Self::derive_with_rounds(password, DEFAULT_HASH_ROUNDS)
    }

    /// Hash `password` with a fresh random salt and an explicit round count.
    pub fn derive_with_rounds(password: &str, rounds: u32) -> Self {
        let rounds = rounds.max(1);
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = digest(password, &salt, rounds);
        Self(format!(
            "{SCHEME}${rounds}${}${}",
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    /// Accept a previously encoded hash after checking its layout.
    pub fn parse(encoded: impl Into<String>) -> Result<Self, PasswordHashFormatError> {
        let encoded = encoded.into();
        decode(&encoded)?;
        Ok(Self(encoded))
    }

    /// Check `password` against the stored digest in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parts) = decode(&self.0) else {
            return false;
        };
        let candidate = digest(password, &parts.salt, parts.rounds);
        constant_time_eq(&candidate, &parts.digest)
    }

    /// Encoded representation for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

struct DecodedHash {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn decode(encoded: &str) -> Result<DecodedHash, PasswordHashFormatError> {
    let mut fields = encoded.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(digest), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(PasswordHashFormatError::MalformedLayout);
    };
    if scheme != SCHEME {
        return Err(PasswordHashFormatError::UnsupportedScheme(scheme.to_owned()));
    }
    let rounds = rounds
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or(PasswordHashFormatError::InvalidRounds)?;
    let salt = hex::decode(salt).map_err(|_| PasswordHashFormatError::InvalidHex)?;
    let digest = hex::decode(digest).map_err(|_| PasswordHashFormatError::InvalidHex)?;
    if digest.len() != DIGEST_LEN {
        return Err(PasswordHashFormatError::InvalidHex);
    }
    Ok(DecodedHash {
        rounds,
        salt,
        digest,
    })
}

fn digest(password: &str, salt: &[u8], rounds: u32) -> [u8; DIGEST_LEN] {
    let mut out = [0_u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROUNDS: u32 = 1_000;

    #[test]
    fn verifies_matching_password() {
        let hash = PasswordHash::derive_with_rounds("staffpass", ROUNDS);
        assert!(hash.verify("staffpass"));
        assert!(!hash.verify("staffpass "));
    }

    #[test]
    fn salts_differ_between_derivations() {
        let first = PasswordHash::derive_with_rounds("same", ROUNDS);
        let second = PasswordHash::derive_with_rounds("same", ROUNDS);
        assert_ne!(first, second);
    }

    #[test]
    fn encoding_records_scheme_and_rounds() {
        let hash = PasswordHash::derive_with_rounds("pw", ROUNDS);
        assert!(hash.as_str().starts_with("pbkdf2_sha256$1000$"));
        assert_eq!(PasswordHash::parse(hash.as_str()), Ok(hash));
    }

    #[rstest]
    #[case("plain", PasswordHashFormatError::MalformedLayout)]
    #[case("md5$1$00$00", PasswordHashFormatError::UnsupportedScheme("md5".to_owned()))]
    #[case("pbkdf2_sha256$0$00$00", PasswordHashFormatError::InvalidRounds)]
    #[case("pbkdf2_sha256$10$zz$00", PasswordHashFormatError::InvalidHex)]
    fn rejects_malformed_encodings(
        #[case] encoded: &str,
        #[case] expected: PasswordHashFormatError,
    ) {
        assert_eq!(PasswordHash::parse(encoded), Err(expected));
    }

    #[test]
    fn debug_output_hides_digest() {
        let hash = PasswordHash::derive_with_rounds("secret", ROUNDS);
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
