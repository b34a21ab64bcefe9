//! Random replacement names.
//!
//! A generated name is a fixed-length token of uppercase ASCII letters and
//! digits followed by the original extension. Names are not checked against
//! the directory or against each other; a collision between two generated
//! names is possible and is caught as a failed rename instead of retried.

use crate::matcher::split_extension;
use rand::Rng;

/// Characters a generated token is drawn from.
pub const NAME_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default number of random characters in a generated name.
pub const DEFAULT_NAME_LENGTH: usize = 8;

/// Generates random names of a fixed token length.
#[derive(Debug, Clone, Copy)]
pub struct NameGenerator {
    length: usize,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_LENGTH)
    }
}

impl NameGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Generates a replacement for `original_name` using the thread-local RNG.
    pub fn generate(&self, original_name: &str) -> String {
        self.generate_with(original_name, &mut rand::rng())
    }

    /// Generates a replacement for `original_name` drawing from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(&self, original_name: &str, rng: &mut R) -> String {
        let (_, extension) = split_extension(original_name);
        let mut name = String::with_capacity(self.length + extension.len());
        for _ in 0..self.length {
            let index = rng.random_range(0..NAME_ALPHABET.len());
            name.push(NAME_ALPHABET[index] as char);
        }
        name.push_str(extension);
        name
    }
}

/// Generates a random name of the default length, keeping the extension.
///
/// # Examples
///
/// ```
/// use scrambler::namer::generate_name;
///
/// let name = generate_name("test.txt");
/// assert_eq!(name.len(), 12);
/// assert!(name.ends_with(".txt"));
/// ```
pub fn generate_name(original_name: &str) -> String {
    NameGenerator::default().generate(original_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_name_shape() {
        let result = generate_name("test.txt");

        assert_ne!(result, "test.txt");
        assert_eq!(result.len(), 12);
        assert!(result.ends_with(".txt"));
        assert!(
            result[..8]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn test_extension_preserved_exactly() {
        assert!(generate_name("archive.tar.gz").ends_with(".gz"));
        assert!(generate_name("Photo.JPG").ends_with(".JPG"));
        assert_eq!(generate_name("README").len(), 8);
        assert_eq!(generate_name("file.").len(), 9);
    }

    #[test]
    fn test_custom_length() {
        let generator = NameGenerator::new(16);
        let result = generator.generate("notes.md");

        assert_eq!(result.len(), 19);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = NameGenerator::default();
        let first = generator.generate_with("a.txt", &mut StdRng::seed_from_u64(7));
        let second = generator.generate_with("b.txt", &mut StdRng::seed_from_u64(7));

        assert_eq!(first, second);
    }
}
