use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Keyword relevance score: +2 per positive keyword present, -4 per negative
/// keyword present. Case-insensitive substring containment, counted once per
/// distinct keyword, additive and unclamped. A single negative hit is meant
/// to outweigh a couple of positives.
pub fn score_text(text: &str, positive: &[String], negative: &[String]) -> i32 {
    let haystack = text.to_lowercase();
    let mut score = 0;
    for keyword in positive {
        if haystack.contains(&keyword.to_lowercase()) {
            score += 2;
        }
    }
    for keyword in negative {
        if haystack.contains(&keyword.to_lowercase()) {
            score -= 4;
        }
    }
    score
}

/// Scraped card text arrives with nested-markup line breaks and indentation.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn positive_hit_scores_two() {
        assert_eq!(score_text("SOC Analyst role", &keywords(&["soc"]), &[]), 2);
    }

    #[test]
    fn negative_hit_outweighs_positive() {
        assert_eq!(
            score_text("SOC Analyst intern", &keywords(&["soc"]), &keywords(&["intern"])),
            -2
        );
    }

    #[test]
    fn keywords_count_once_regardless_of_occurrences() {
        assert_eq!(
            score_text("security security security", &keywords(&["security"]), &[]),
            2
        );
    }

    #[test]
    fn score_is_order_independent() {
        let text = "Senior SOC Analyst, blue team, SIEM";
        let forward = keywords(&["soc", "blue team", "siem"]);
        let reversed = keywords(&["siem", "blue team", "soc"]);
        assert_eq!(score_text(text, &forward, &[]), score_text(text, &reversed, &[]));
        assert_eq!(score_text(text, &forward, &[]), 6);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(score_text("DEVSECOPS ENGINEER", &keywords(&["devsecops"]), &[]), 2);
        assert_eq!(score_text("graduate Sales role", &[], &keywords(&["SALES"])), -4);
    }

    #[test]
    fn collapse_whitespace_flattens_card_text() {
        let card = "  SOC Analyst\n\n      London, UK\n  2 days ago  ";
        assert_eq!(collapse_whitespace(card), "SOC Analyst London, UK 2 days ago");
    }
}
