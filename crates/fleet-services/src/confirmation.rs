//! Confirmation code generation

use fleet_core::config::RentalConfig;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces codes like `BOK-7K2Q9XAB`
#[derive(Debug, Clone)]
pub struct ConfirmationCodeGenerator {
    prefix: String,
    length: usize,
}

impl ConfirmationCodeGenerator {
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    pub fn from_config(config: &RentalConfig) -> Self {
        Self::new(config.confirmation_prefix.clone(), config.code_length)
    }

    /// Fresh random code; uniqueness is enforced by the store
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();

        format!("{}{}", self.prefix, suffix)
    }

    /// Whether `code` has the shape this generator produces
    pub fn is_well_formed(&self, code: &str) -> bool {
        code.strip_prefix(&self.prefix).map_or(false, |suffix| {
            suffix.len() == self.length && suffix.bytes().all(|b| ALPHABET.contains(&b))
        })
    }
}

impl Default for ConfirmationCodeGenerator {
    fn default() -> Self {
        Self::from_config(&RentalConfig::default())
    }
}

/// Normalize a customer-typed booking reference: `" #bok-ab12cd34 "` -> `"BOK-AB12CD34"`
pub fn normalize_reference(reference: &str) -> String {
    reference.trim().trim_start_matches('#').trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_well_formed() {
        let generator = ConfirmationCodeGenerator::default();
        for _ in 0..100 {
            let code = generator.generate();
            assert!(code.starts_with("BOK-"), "{}", code);
            assert_eq!(code.len(), 12);
            assert!(generator.is_well_formed(&code), "{}", code);
        }
    }

    #[test]
    fn test_malformed_codes_rejected() {
        let generator = ConfirmationCodeGenerator::default();
        assert!(!generator.is_well_formed("BOK-abc12345"));
        assert!(!generator.is_well_formed("BOK-ABC123"));
        assert!(!generator.is_well_formed("RES-ABC12345"));
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(" #bok-ab12cd34 "), "BOK-AB12CD34");
        assert_eq!(normalize_reference("#42"), "42");
    }
}
