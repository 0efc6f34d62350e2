//! URL slug normalization.

/// Normalizes a title into a URL slug: lowercased, quotes stripped, runs of
/// non-alphanumeric characters collapsed to single hyphens, no leading or
/// trailing hyphen. May return an empty string; callers pick the fallback.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch == '\'' || ch == '"' {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Trimmed  "), "trimmed");
    }

    #[test]
    fn test_quotes_removed_without_hyphen() {
        assert_eq!(slugify("Don't Stop"), "dont-stop");
        assert_eq!(slugify("\"Quoted\" Title"), "quoted-title");
    }

    #[test]
    fn test_runs_collapse_to_single_hyphen() {
        assert_eq!(slugify("a -- b__c"), "a-b-c");
        assert_eq!(slugify("rock & roll"), "rock-roll");
    }

    #[test]
    fn test_no_edge_hyphens() {
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("!!!"), "");
    }
}
