//! Canonical word mapping for regional and phonetic spelling variants.

/// Maps common regional/phonetic variants to a canonical form.
const CANONICAL_WORD_MAP: &[(&str, &str)] = &[
    ("aluminium", "aluminum"),
    ("colour", "color"),
    ("flavour", "flavor"),
    ("licence", "license"),
    ("theatre", "theater"),
    ("grey", "gray"),
    ("centre", "center"),
    ("analyse", "analyze"),
    ("organise", "organize"),
    ("behaviour", "behavior"),
];

/// Looks up the canonical form for a lowercased variant.
pub fn canonical_form(variant: &str) -> Option<&'static str> {
    CANONICAL_WORD_MAP
        .iter()
        .find(|(from, _)| *from == variant)
        .map(|(_, to)| *to)
}

/// Normalizes a word by lowercasing and trimming leading/trailing
/// non-alphanumeric characters. Internal hyphens and apostrophes survive.
pub fn normalize_word(word: &str) -> String {
    let lowered = word.to_lowercase();
    lowered
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}
