//! Query normalization: raw user text -> searchable terms.
//!
//! Pipeline (pure, deterministic, never fails):
//! 1. strip `? ¿ ! ¡ . ,`
//! 2. drop filler words from a fixed Spanish stop-word list
//! 3. trim
//! 4. naive singularization of the *whole phrase* (trailing "es", else trailing "s")
//! 5. split on whitespace and keep tokens longer than two characters
//!
//! Stop words go before singularization, otherwise a trailing "¿tienes?" would
//! be stemmed to "tien" and survive as a term.
//!
//! Step 4 only ever touches the last word of a multi-word query ("Pastillas
//! Frenos" -> "Pastillas Freno"). That is the behavior the assistant has always
//! had and the catalog searches are tuned to it, so it is kept as-is.

use serde::Serialize;

const PUNCTUATION: [char; 6] = ['?', '¿', '!', '¡', '.', ','];

/// Tokens with this many characters or fewer are never search terms.
const MAX_SKIPPED_CHARS: usize = 2;

/// Conversational filler that would otherwise AND-out every catalog match.
const STOP_WORDS: [&str; 16] = [
    "que", "qué", "hay", "para", "con", "los", "las", "del", "una", "unos", "unas", "tienes",
    "tienen", "tiene", "busco", "necesito",
];

/// Ordered search terms extracted from a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Terms(Vec<String>);

impl Terms {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The longest term by character count; the first one wins on ties.
    pub fn longest(&self) -> Option<&str> {
        let mut best: Option<&str> = None;
        for term in self.iter() {
            match best {
                Some(b) if term.chars().count() <= b.chars().count() => {}
                _ => best = Some(term),
            }
        }
        best
    }
}

impl From<Vec<String>> for Terms {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

/// Steps 1-4: punctuation, stop words, trim, whole-phrase singularization.
pub fn clean_query(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !PUNCTUATION.contains(c)).collect();
    let kept = stripped
        .split_whitespace()
        .filter(|token| !is_stop_word(token))
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = kept.trim();

    let singular = trimmed
        .strip_suffix("es")
        .or_else(|| trimmed.strip_suffix('s'))
        .unwrap_or(trimmed);

    singular.to_string()
}

/// Full pipeline: raw text to ordered search terms (possibly empty).
pub fn normalize(raw: &str) -> Terms {
    let cleaned = clean_query(raw);
    let terms = cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MAX_SKIPPED_CHARS)
        .map(str::to_string)
        .collect();
    Terms(terms)
}

fn is_stop_word(token: &str) -> bool {
    let lower = token.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &str) -> Vec<String> {
        normalize(raw).as_slice().to_vec()
    }

    #[test]
    fn two_word_query_keeps_both_terms() {
        assert_eq!(terms("Radiador Corsa"), vec!["Radiador", "Corsa"]);
    }

    #[test]
    fn single_plural_word_loses_trailing_s() {
        assert_eq!(terms("Pastillas"), vec!["Pastilla"]);
    }

    #[test]
    fn trailing_es_is_dropped_before_trailing_s() {
        assert_eq!(terms("Radiadores"), vec!["Radiador"]);
    }

    #[test]
    fn empty_and_blank_input_yield_no_terms() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
        assert!(normalize("¿?!.").is_empty());
    }

    #[test]
    fn punctuation_and_short_tokens_are_removed() {
        assert_eq!(terms("¿Hay stock de filtro?"), vec!["stock", "filtro"]);
    }

    #[test]
    fn stop_words_are_dropped_case_insensitively() {
        assert_eq!(terms("Tienes pastillas para Corsa"), vec!["pastillas", "Corsa"]);
    }

    #[test]
    fn trailing_stop_word_is_dropped_not_stemmed() {
        assert_eq!(
            terms("Busco radiador para Corsa, ¿tienes?"),
            vec!["radiador", "Corsa"]
        );
        assert!(normalize("¿Tienes?").is_empty());
    }

    #[test]
    fn accented_question_word_is_a_stop_word() {
        assert_eq!(terms("¿Qué filtro hay?"), vec!["filtro"]);
        // The plural left at the end after filler removal is singularized.
        assert_eq!(terms("¿Qué pastillas tienes?"), vec!["pastilla"]);
    }

    #[test]
    fn clean_query_removes_filler_before_singularizing() {
        assert_eq!(clean_query("¿Tienes bujías, que tienes?"), "bujía");
    }

    // Singularization runs on the whole phrase, so only the last word changes.
    // "Pastillas" in the middle survives untouched; "Frenos" loses its "s".
    #[test]
    fn singularization_only_affects_the_last_word() {
        assert_eq!(terms("Pastillas Frenos"), vec!["Pastillas", "Freno"]);
    }

    // Suffix trimming is naive: words that merely end in "es" lose it too.
    #[test]
    fn singularization_is_not_linguistic() {
        assert_eq!(terms("Aceites"), vec!["Aceit"]);
        assert_eq!(terms("Aceite 10W40"), vec!["Aceite", "10W40"]);
    }

    #[test]
    fn punctuation_before_the_suffix_does_not_block_singularization() {
        assert_eq!(terms("¿Bujías?"), vec!["Bujía"]);
    }

    #[test]
    fn longest_prefers_first_on_ties() {
        let t = normalize("Freno Corsa Radiador Bujia1");
        assert_eq!(t.longest(), Some("Radiador"));

        let tie = Terms::from(vec!["abcd".to_string(), "wxyz".to_string()]);
        assert_eq!(tie.longest(), Some("abcd"));
        assert_eq!(Terms::default().longest(), None);
    }

    #[test]
    fn longest_counts_characters_not_bytes() {
        let t = Terms::from(vec!["bujía".to_string(), "filtro".to_string()]);
        assert_eq!(t.longest(), Some("filtro"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: normalization is deterministic for any input.
            #[test]
            fn normalize_is_deterministic(raw in "\\PC{0,60}") {
                prop_assert_eq!(normalize(&raw), normalize(&raw));
            }

            /// Property: every term is longer than two chars and carries no stripped punctuation.
            #[test]
            fn terms_are_long_and_clean(raw in "[a-zA-Záéíóúñ?¿!¡., ]{0,60}") {
                for term in normalize(&raw).iter() {
                    prop_assert!(term.chars().count() > 2);
                    prop_assert!(!term.chars().any(|c| PUNCTUATION.contains(&c)));
                    prop_assert!(!term.chars().any(char::is_whitespace));
                }
            }
        }
    }
}
