use md5::{Digest, Md5};

/// Subscriber hash addressing a member in the provider's per-member
/// endpoints: the MD5 hex digest of the lowercased email address.
pub fn subscriber_hash(email: &str) -> String {
    let digest = Md5::digest(email.to_lowercase().as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digest() {
        assert_eq!(subscriber_hash("a@x.com"), "743173788aa9166801df2e18f0e7ff24");
        assert_eq!(subscriber_hash("A@X.com"), "743173788aa9166801df2e18f0e7ff24");
        assert_eq!(subscriber_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn is_case_insensitive() {
        let email = "Jane.Doe@Example.com";
        let hash = subscriber_hash(email);
        assert_eq!(hash, subscriber_hash(&email.to_uppercase()));
        assert_eq!(hash, subscriber_hash(&email.to_lowercase()));
    }

    #[test]
    fn is_stable_lowercase_hex() {
        let first = subscriber_hash("someone@example.org");
        let second = subscriber_hash("someone@example.org");
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
