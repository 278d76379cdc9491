//! Unique first names for newborns.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

const ONSETS: [&str; 14] = [
    "b", "ch", "h", "k", "l", "m", "n", "p", "s", "t", "tz", "w", "x", "y",
];
const VOWELS: [&str; 5] = ["a", "e", "i", "o", "u"];
const CODAS: [&str; 6] = ["", "", "k", "l", "n", "m"];

/// Builds names from two or three syllables and never repeats one.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    taken: HashSet<String>,
}

impl NameGenerator {
    /// Start with every name already in use.
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: existing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    fn syllable<R: Rng>(rng: &mut R, out: &mut String) {
        for part in [&ONSETS[..], &VOWELS[..], &CODAS[..]] {
            if let Some(piece) = part.choose(rng) {
                out.push_str(piece);
            }
        }
    }

    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> String {
        let mut syllables = 2;
        let mut attempts = 0u32;
        loop {
            let mut name = String::new();
            for _ in 0..syllables {
                Self::syllable(rng, &mut name);
            }
            let name = capitalize(&name);
            if self.taken.insert(name.clone()) {
                return name;
            }
            // Lengthen once the short space gets crowded.
            attempts += 1;
            if attempts % 16 == 0 {
                syllables += 1;
            }
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn names_never_repeat() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut names = NameGenerator::default();
        let generated: Vec<String> = (0..2000).map(|_| names.generate(&mut rng)).collect();
        let unique: HashSet<&String> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
        assert!(generated.iter().all(|n| n.chars().next().unwrap().is_uppercase()));
    }

    #[test]
    fn existing_names_are_avoided() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut first = NameGenerator::default();
        let name = first.generate(&mut rng);

        let mut rng = StdRng::seed_from_u64(1);
        let mut second = NameGenerator::new([name.clone()]);
        assert!(second.is_taken(&name));
        assert_ne!(second.generate(&mut rng), name);
    }
}
