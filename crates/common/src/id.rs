//! ID generation utilities.

use rand::{Rng, seq::SliceRandom};
use ulid::Ulid;
use uuid::Uuid;

/// Leading segment of every member code.
pub const MEMBER_CODE_PREFIX: &str = "USR";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are lexicographically sortable, so ids double as a creation
    /// order for rows created in different milliseconds.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }

    /// Name segment shared by every member whose name starts the same way,
    /// e.g. `USR-PRI-` for "Priya".
    #[must_use]
    pub fn member_code_stem(&self, name: Option<&str>) -> String {
        let letters: String = name
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(3)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let name_part = if name.is_some_and(|n| !n.trim().is_empty()) {
            format!("{letters:X<3}")
        } else {
            MEMBER_CODE_PREFIX.to_string()
        };
        format!("{MEMBER_CODE_PREFIX}-{name_part}-")
    }

    /// Generate a human readable member code such as `USR-PRI-48213-004`.
    ///
    /// The middle segment samples five digits of the phone number, padded
    /// with zeros, or five random digits when no phone is known. `serial` is
    /// the next free serial for the stem.
    #[must_use]
    pub fn generate_member_code(
        &self,
        name: Option<&str>,
        phone: Option<&str>,
        serial: u32,
    ) -> String {
        let mut rng = rand::thread_rng();
        let digits: Vec<char> = phone
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        let phone_part: String = if phone.is_some() {
            let sampled: String = digits.choose_multiple(&mut rng, 5).collect();
            format!("{sampled:0<5}")
        } else {
            (0..5)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect()
        };

        format!("{}{phone_part}-{serial:03}", self.member_code_stem(name))
    }
}

/// Serial suffix of a member code, if it has one.
#[must_use]
pub fn member_code_serial(code: &str) -> Option<u32> {
    code.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32);
    }

    #[test]
    fn test_member_code_stem() {
        let id_gen = IdGenerator::new();
        assert_eq!(id_gen.member_code_stem(Some("priya")), "USR-PRI-");
        assert_eq!(id_gen.member_code_stem(Some("Al")), "USR-ALX-");
        assert_eq!(id_gen.member_code_stem(Some("J. K")), "USR-JKX-");
        assert_eq!(id_gen.member_code_stem(None), "USR-USR-");
    }

    #[test]
    fn test_member_code_from_phone() {
        let id_gen = IdGenerator::new();
        let code = id_gen.generate_member_code(Some("Ravi"), Some("+91 98765-43210"), 7);

        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "USR");
        assert_eq!(parts[1], "RAV");
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[3], "007");
    }

    #[test]
    fn test_member_code_short_phone_is_padded() {
        let id_gen = IdGenerator::new();
        let code = id_gen.generate_member_code(Some("Ravi"), Some("12"), 1);
        let phone_part = code.split('-').nth(2).unwrap();

        assert_eq!(phone_part.len(), 5);
        assert!(phone_part.ends_with("000"));
    }

    #[test]
    fn test_member_code_serial() {
        assert_eq!(member_code_serial("USR-RAV-12345-012"), Some(12));
        assert_eq!(member_code_serial("garbage"), None);
    }
}
