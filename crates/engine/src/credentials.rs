use sb_storage::Credential;
use sha2::{Digest, Sha256};

/// Salted SHA-256, hex-encoded. The format is opaque outside this module;
/// the salt guards against identical digests for identical passwords, not
/// against offline prediction (see DESIGN.md).
pub fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex(&hasher.finalize())
}

pub fn new_credential(password: &str) -> Credential {
    let salt = new_salt();
    let digest = digest_password(&salt, password);
    Credential { digest, salt }
}

pub fn verify(credential: &Credential, password: &str) -> bool {
    digest_password(&credential.salt, password) == credential.digest
}

pub fn new_salt() -> String {
    let mut hasher = Sha256::new();
    hasher.update(entropy_seed().as_bytes());
    hasher.update(b"|salt");
    let full = hex(&hasher.finalize());
    full[..16].to_string()
}

/// Reset flow: a short one-time password the mail collaborator delivers.
pub fn generate_password() -> String {
    let mut hasher = Sha256::new();
    hasher.update(entropy_seed().as_bytes());
    hasher.update(b"|reset");
    let full = hex(&hasher.finalize());
    full[..12].to_string()
}

fn entropy_seed() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos}-{}", std::process::id())
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{digest_password, generate_password, new_credential, verify};

    #[test]
    fn digest_is_deterministic_per_salt() {
        assert_eq!(
            digest_password("salt", "secret"),
            digest_password("salt", "secret")
        );
        assert_ne!(
            digest_password("salt-a", "secret"),
            digest_password("salt-b", "secret")
        );
    }

    #[test]
    fn verify_round_trip() {
        let credential = new_credential("hunter2");
        assert!(verify(&credential, "hunter2"));
        assert!(!verify(&credential, "hunter3"));
    }

    #[test]
    fn generated_passwords_are_short_hex() {
        let password = generate_password();
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
