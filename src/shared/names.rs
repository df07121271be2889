pub const MAX_LEAGUE_ID_LENGTH: usize = 40;

/// Derives the store key for a league from its display name.
///
/// Lowercases, keeps ASCII letters, digits, whitespace and `-`, collapses each
/// whitespace run into one `-` and caps the result at
/// [`MAX_LEAGUE_ID_LENGTH`] characters.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace() || *ch == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len().min(MAX_LEAGUE_ID_LENGTH));
    let mut pending_gap = false;
    for ch in kept.trim().chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        if pending_gap {
            slug.push('-');
            pending_gap = false;
        }
        slug.push(ch);
    }
    slug.chars().take(MAX_LEAGUE_ID_LENGTH).collect()
}

pub fn clean_player_name(name: &str) -> String {
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Sunday Smashers"), "sunday-smashers");
        assert_eq!(slugify("  Office   XI  "), "office-xi");
    }

    #[test]
    fn slugify_strips_punctuation_but_keeps_hyphens() {
        assert_eq!(slugify("Rock'n'Roll C.C. (2024)"), "rocknroll-cc-2024");
        assert_eq!(slugify("north-east league"), "north-east-league");
        assert_eq!(slugify("Café Cup"), "caf-cup");
    }

    #[test]
    fn slugify_is_empty_for_symbol_only_names() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn slugify_is_idempotent_and_bounded() {
        let sources = [
            "Sunday Smashers",
            "A very long league name that keeps going well past forty characters",
            "tabs\tand\nnewlines",
            "--edge--",
            "x y z 1 2 3 !@# $%^",
            "ÜBER liga 2025",
        ];
        for source in sources {
            let once = slugify(source);
            assert!(once.chars().count() <= MAX_LEAGUE_ID_LENGTH, "{once}");
            assert_eq!(slugify(&once), once, "slug of {source:?} is not stable");
            assert_eq!(slugify(source), once);
        }
    }

    #[test]
    fn clean_player_name_trims_whitespace() {
        assert_eq!(clean_player_name("  Virat Kohli \n"), "Virat Kohli");
        assert_eq!(clean_player_name("   "), "");
    }
}
