//! Random formatting noise that imitates scanned or hand-typed documents.

use std::ops::RangeInclusive;

use rand::{Rng, RngCore};

/// Symbols scattered into noisy text.
pub const NOISE_SYMBOLS: &[&str] = &["*", "#", "!", "~", "^", "~~"];

/// Probabilities and ranges for each kind of corruption.
#[derive(Debug, Clone, PartialEq)]
pub struct NoisePolicy {
    /// Chance of uppercasing the whole text.
    pub upper_prob: f64,
    /// Chance of lowercasing the whole text (never combined with upper).
    pub lower_prob: f64,
    /// Spaces inserted after each `:`, `,` and `-`.
    pub punctuation_spaces: RangeInclusive<usize>,
    /// Copies emitted for each newline.
    pub newline_repeat: RangeInclusive<usize>,
    /// Chance of swapping `o`/`O` for `0` and `l`/`I` for `1`.
    pub confusion_prob: f64,
    /// Chance of inserting one symbol from [`NOISE_SYMBOLS`].
    pub symbol_prob: f64,
}

impl Default for NoisePolicy {
    fn default() -> Self {
        // Lowercasing happens on 30% of the texts that were not uppercased.
        Self {
            upper_prob: 0.3,
            lower_prob: 0.7 * 0.3,
            punctuation_spaces: 1..=3,
            newline_repeat: 1..=2,
            confusion_prob: 0.2,
            symbol_prob: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseFold {
    Upper,
    Lower,
    Unchanged,
}

/// Apply random formatting noise to `text`.
///
/// Output depends only on `text`, `policy` and the draws taken from `rng`.
pub fn apply_noise(text: &str, policy: &NoisePolicy, rng: &mut dyn RngCore) -> String {
    let draw: f64 = rng.random();
    let case = if draw < policy.upper_prob {
        CaseFold::Upper
    } else if draw < policy.upper_prob + policy.lower_prob {
        CaseFold::Lower
    } else {
        CaseFold::Unchanged
    };

    let folded = match case {
        CaseFold::Upper => text.to_uppercase(),
        CaseFold::Lower => text.to_lowercase(),
        CaseFold::Unchanged => text.to_string(),
    };

    let mut spaced = String::with_capacity(folded.len() + folded.len() / 4);
    for c in folded.chars() {
        spaced.push(c);
        if matches!(c, ':' | ',' | '-') {
            let n = rng.random_range(policy.punctuation_spaces.clone());
            spaced.extend(std::iter::repeat_n(' ', n));
        }
    }

    let mut noisy = String::with_capacity(spaced.len());
    for c in spaced.chars() {
        if c == '\n' {
            let n = rng.random_range(policy.newline_repeat.clone());
            noisy.extend(std::iter::repeat_n('\n', n));
        } else {
            noisy.push(c);
        }
    }

    if rng.random_bool(policy.confusion_prob) {
        noisy = confuse_characters(&noisy);
    }

    if rng.random_bool(policy.symbol_prob) {
        let char_count = noisy.chars().count();
        let position = rng.random_range(0..=char_count);
        let symbol = NOISE_SYMBOLS[rng.random_range(0..NOISE_SYMBOLS.len())];
        let offset = noisy
            .char_indices()
            .nth(position)
            .map(|(i, _)| i)
            .unwrap_or(noisy.len());
        noisy.insert_str(offset, symbol);
    }

    noisy
}

/// Swap letters for the digits OCR tends to confuse them with.
pub fn confuse_characters(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'o' | 'O' => '0',
            'l' | 'I' => '1',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLE: &str = "Invoice: 1a2b3c4d\nCompany: Lopez, Allen and King\nTotal Amount Due: $12.50\n";

    fn quiet() -> NoisePolicy {
        NoisePolicy {
            upper_prob: 0.0,
            lower_prob: 0.0,
            punctuation_spaces: 1..=1,
            newline_repeat: 1..=1,
            confusion_prob: 0.0,
            symbol_prob: 0.0,
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let policy = NoisePolicy::default();
        for seed in 0..20 {
            let a = apply_noise(SAMPLE, &policy, &mut StdRng::seed_from_u64(seed));
            let b = apply_noise(SAMPLE, &policy, &mut StdRng::seed_from_u64(seed));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_punctuation_gets_one_space() {
        let out = apply_noise("a:b,c-d", &quiet(), &mut StdRng::seed_from_u64(0));
        assert_eq!(out, "a: b, c- d");
    }

    #[test]
    fn test_spacing_and_newline_ranges() {
        let policy = NoisePolicy::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let out = apply_noise("x:y\nz", &policy, &mut rng);
            let spaces = out.chars().filter(|&c| c == ' ').count();
            let newlines = out.chars().filter(|&c| c == '\n').count();
            assert!((1..=3).contains(&spaces), "{out:?}");
            assert!((1..=2).contains(&newlines), "{out:?}");
        }
    }

    #[test]
    fn test_case_folding_is_exclusive() {
        let upper = NoisePolicy { upper_prob: 1.0, ..quiet() };
        assert_eq!(apply_noise("Mixed Case", &upper, &mut StdRng::seed_from_u64(1)), "MIXED CASE");

        let lower = NoisePolicy { lower_prob: 1.0, ..quiet() };
        assert_eq!(apply_noise("Mixed Case", &lower, &mut StdRng::seed_from_u64(1)), "mixed case");
    }

    #[test]
    fn test_character_confusion() {
        assert_eq!(confuse_characters("Hello WORLD Ink"), "He110 W0RLD 1nk");
        // Only lowercase l and uppercase I read as 1.
        assert_eq!(confuse_characters("L i"), "L i");

        let policy = NoisePolicy { confusion_prob: 1.0, ..quiet() };
        assert_eq!(apply_noise("lOIo", &policy, &mut StdRng::seed_from_u64(3)), "1010");
    }

    #[test]
    fn test_symbol_insertion() {
        let policy = NoisePolicy { symbol_prob: 1.0, ..quiet() };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..30 {
            let out = apply_noise("plain ünïcode text", &policy, &mut rng);
            let extra: String = out.chars().filter(|c| "*#!~^".contains(*c)).collect();
            assert!(NOISE_SYMBOLS.contains(&extra.as_str()), "{out:?}");
            assert_eq!(out.replace(extra.as_str(), ""), "plain ünïcode text");
        }
    }

    #[test]
    fn test_quiet_policy_is_identity_without_punctuation() {
        let text = "no punctuation here\n";
        assert_eq!(apply_noise(text, &quiet(), &mut StdRng::seed_from_u64(0)), text);
    }
}
