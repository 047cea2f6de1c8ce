//! PBKDF2-SHA256 password hashes, stored as
//! `pbkdf2-sha256$<rounds>$<salt base64>$<hash base64>`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const HASH_LEN: usize = 32;

#[cfg(not(test))]
const ROUNDS: u32 = 210_000;
#[cfg(test)]
const ROUNDS: u32 = 1_000;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn check_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }
    Ok(())
}

pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4();
    let hash = derive(password, salt.as_bytes(), ROUNDS);
    format!(
        "{}${}${}${}",
        SCHEME,
        ROUNDS,
        BASE64.encode(salt.as_bytes()),
        BASE64.encode(hash)
    )
}

/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    let [scheme, rounds, salt, expected] = parts.as_slice() else {
        return false;
    };
    if *scheme != SCHEME {
        return false;
    }
    let (Ok(rounds), Ok(salt), Ok(expected)) = (
        rounds.parse::<u32>(),
        BASE64.decode(salt),
        BASE64.decode(expected),
    ) else {
        return false;
    };
    let actual = derive(password, &salt, rounds);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_right_password() {
        let stored = hash_password("correct horse");
        assert!(stored.starts_with("pbkdf2-sha256$"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("correct horsE", &stored));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("password1"), hash_password("password1"));
    }

    #[test]
    fn malformed_hashes_do_not_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "md5$1$AAAA$AAAA"));
        assert!(!verify_password("x", "pbkdf2-sha256$many$AAAA$AAAA"));
    }

    #[test]
    fn strength_rules() {
        assert!(check_strength("short").is_err());
        assert!(check_strength("        ").is_err());
        assert!(check_strength("long enough").is_ok());
    }
}
