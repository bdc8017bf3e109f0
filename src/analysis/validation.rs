use serde::Serialize;

/// Characters stripped from transcripts and accepted phrases before comparing.
const CJK_PUNCTUATION: &[char] = &['。', '、', '！', '？', '「', '」', '・', '…', '，', '．', '　'];

/// Outcome of checking a transcript against a phrase's accepted texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextCheck {
    pub matched: bool,
    /// Best similarity ratio seen, 1.0 for a substring match.
    pub best_ratio: f32,
}

impl TextCheck {
    /// Used when there is nothing to validate against.
    pub fn unvalidated() -> Self {
        Self {
            matched: true,
            best_ratio: 0.0,
        }
    }
}

/// Lower-case, trim and strip punctuation from recognized text.
///
/// Recognizers sometimes loop on a word ("watashi watashi watashi ...").
/// Anything longer than `max_chars` is cut to its first `truncate_to`
/// characters so the loop doesn't drown the similarity ratio.
pub fn normalize_transcript(text: &str, max_chars: usize, truncate_to: usize) -> String {
    let mut text = text.trim().to_lowercase();

    if text.chars().count() > max_chars {
        text = text.chars().take(truncate_to).collect();
    }

    strip_punctuation(&text).trim().to_string()
}

fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation() && !CJK_PUNCTUATION.contains(c))
        .collect()
}

/// Does `heard` match any of `accepted`?
///
/// A match is either containment (an accepted phrase appears inside the
/// transcript) or a similarity ratio of at least `threshold`.
pub fn validate(heard: &str, accepted: &[String], threshold: f32) -> TextCheck {
    let candidates: Vec<String> = accepted
        .iter()
        .map(|p| strip_punctuation(&p.to_lowercase()).trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if candidates.iter().any(|p| heard.contains(p.as_str())) {
        return TextCheck {
            matched: true,
            best_ratio: 1.0,
        };
    }

    let best_ratio = candidates
        .iter()
        .map(|p| similarity_ratio(p, heard))
        .fold(0.0_f32, f32::max);

    TextCheck {
        matched: best_ratio >= threshold,
        best_ratio,
    }
}

/// Ratcliff/Obershelp similarity: 2 * matching characters / total characters.
///
/// Matching characters are found by taking the longest common block, then
/// recursing on the pieces to its left and right. Two empty strings are
/// identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f32 / total as f32
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common contiguous block as (start in a, start in b, length).
/// Ties go to the block that starts earliest in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run[j + 1] = length of the common run ending at a[i], b[j]
    let mut prev = vec![0_usize; b.len() + 1];
    let mut run = vec![0_usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            run[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = run[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match() {
        let check = validate("konnichiwa", &accepted(&["konnichiwa", "hello"]), 0.6);
        assert!(check.matched);
        assert_eq!(check.best_ratio, 1.0);
    }

    #[test]
    fn containment_match() {
        let heard = normalize_transcript("はい、私は先生です。", 50, 20);
        assert_eq!(heard, "はい私は先生です");
        assert!(validate(&heard, &accepted(&["先生"]), 0.6).matched);
    }

    #[test]
    fn accepted_punctuation_is_ignored() {
        let heard = normalize_transcript("はい私は先生です", 50, 20);
        assert!(validate(&heard, &accepted(&["はい、私は先生です"]), 0.6).matched);
    }

    #[test]
    fn ratio_at_threshold_matches() {
        // "abc" in common: 2 * 3 / 10 = 0.6
        assert_eq!(similarity_ratio("abcde", "abcxy"), 0.6);
        assert!(validate("abcxy", &accepted(&["abcde"]), 0.6).matched);
    }

    #[test]
    fn ratio_below_threshold_does_not_match() {
        // 2 * 2 / 10 = 0.4
        let check = validate("abxyz", &accepted(&["abcde"]), 0.6);
        assert!(!check.matched);
        assert!((check.best_ratio - 0.4).abs() < 1e-6);
    }

    #[test]
    fn ratio_recurses_around_longest_block() {
        // "ab" + "d": 2 * 3 / 8
        assert!((similarity_ratio("abcd", "abxd") - 0.75).abs() < 1e-6);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn near_miss_romaji_matches() {
        // "sens" + "i": 2 * 5 / 12
        let check = validate("sensai", &accepted(&["sensei"]), 0.6);
        assert!(check.matched, "ratio was {}", check.best_ratio);
    }

    #[test]
    fn normalize_lowercases_and_strips() {
        assert_eq!(normalize_transcript("  Hai! Desu?  ", 50, 20), "hai desu");
    }

    #[test]
    fn runaway_repetition_is_truncated() {
        let looped = "watashi ".repeat(10);
        let heard = normalize_transcript(&looped, 50, 20);
        assert_eq!(heard.chars().count(), 20);
        assert_eq!(heard, "watashi watashi wata");
    }

    #[test]
    fn empty_transcript_fails_validation() {
        assert!(!validate("", &accepted(&["hai"]), 0.6).matched);
    }
}
