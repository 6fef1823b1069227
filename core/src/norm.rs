//! Game title normalization for cross-source comparison
//!
//! Storefront listings and library entries rarely agree on punctuation,
//! trademark marks, or edition suffixes. `normalize_game_name` canonicalizes
//! a free-text title so both sides of a comparison go through the same
//! mangling, and `TitleTransform` captures the bounded fallback mutations
//! tried when the canonical form still has no match.

/// Canonicalize a game title for comparison.
///
/// Deterministic and idempotent. Applied identically to catalog names and
/// queried titles so the comparison stays symmetric.
pub fn normalize_game_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let mut out = name.to_lowercase();
    for mark in ["\u{2122}", "\u{00ae}"] {
        out = out.replace(mark, "");
    }
    for ch in ["_", ".", ":", "-"] {
        out = out.replace(ch, "");
    }
    out = out.replace('\u{2019}', "'");
    out = out.replace("goty", "");
    out = out.replace("game of the year edition", "");
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }

    out.trim().to_string()
}

/// A single title mutation tried after the untransformed title fails to
/// resolve.
///
/// The resolver walks an ordered list of these, so the retry policy is an
/// explicit configuration value and termination is bounded by list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleTransform {
    /// Drop colons: some listings write "Game: Subtitle" as "Game Subtitle".
    StripColons,
    /// Append a trademark mark: some listings carry it, libraries rarely do.
    AppendTrademark,
}

impl TitleTransform {
    pub fn apply(&self, title: &str) -> String {
        match self {
            TitleTransform::StripColons => title.replace(':', ""),
            TitleTransform::AppendTrademark => format!("{title}\u{2122}"),
        }
    }
}

/// The fallback order observed to recover the most titles in practice.
pub fn default_title_transforms() -> Vec<TitleTransform> {
    vec![TitleTransform::StripColons, TitleTransform::AppendTrademark]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(normalize_game_name(""), "");
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize_game_name("S.T.A.L.K.E.R.: Shadow-of_Chernobyl"),
            "stalker shadowofchernobyl"
        );
    }

    #[test]
    fn strips_trademark_and_registered_marks() {
        assert_eq!(normalize_game_name("Portal\u{2122}"), "portal");
        assert_eq!(normalize_game_name("Tetris\u{00ae}"), "tetris");
    }

    #[test]
    fn normalizes_right_single_quote() {
        assert_eq!(
            normalize_game_name("Assassin\u{2019}s Creed"),
            "assassin's creed"
        );
    }

    #[test]
    fn removes_goty_suffixes() {
        // Only the literal "goty" is removed; a trailing "Edition" survives
        // because it matches neither removal substring on its own.
        assert_eq!(
            normalize_game_name("The Witcher 3: GOTY Edition"),
            "the witcher 3 edition"
        );
        assert_eq!(
            normalize_game_name("Fallout 4 Game of the Year Edition"),
            "fallout 4"
        );
    }

    #[test]
    fn colon_case_and_goty_insensitive_equivalence() {
        assert_eq!(
            normalize_game_name("The Witcher 3: GOTY"),
            normalize_game_name("the witcher 3")
        );
    }

    #[test]
    fn collapses_double_spaces() {
        assert_eq!(normalize_game_name("Half  Life   2"), "half life 2");
    }

    #[test]
    fn idempotent() {
        for title in [
            "The Witcher 3: GOTY Edition",
            "S.T.A.L.K.E.R.",
            "Portal\u{2122}",
            "  spaced  out  ",
            "",
        ] {
            let once = normalize_game_name(title);
            assert_eq!(normalize_game_name(&once), once);
        }
    }

    #[test]
    fn strip_colons_transform() {
        assert_eq!(
            TitleTransform::StripColons.apply("Deus Ex: Mankind Divided"),
            "Deus Ex Mankind Divided"
        );
    }

    #[test]
    fn append_trademark_transform() {
        assert_eq!(
            TitleTransform::AppendTrademark.apply("Borderlands"),
            "Borderlands\u{2122}"
        );
    }

    #[test]
    fn default_transform_order() {
        assert_eq!(
            default_title_transforms(),
            vec![TitleTransform::StripColons, TitleTransform::AppendTrademark]
        );
    }
}
