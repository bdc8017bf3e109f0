use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Syllable labels and accepted transcripts for one practice phrase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseDefinition {
    /// Syllables in speaking order, used to label regions of the reference.
    pub syllables: Vec<String>,
    /// Transcripts that count as saying the phrase (romaji, kana, kanji, English).
    pub accepted: Vec<String>,
}

/// Read-only phrase table, keyed by phrase id (also the reference file stem).
///
/// Loaded once at startup and shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhraseBook {
    #[serde(default)]
    phrases: BTreeMap<String, PhraseDefinition>,
}

impl PhraseBook {
    /// Load `phrases.toml` if it exists, otherwise the built-in lesson set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::builtin());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read phrase file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse phrase file: {}", path.display()))
    }

    pub fn get(&self, id: &str) -> Option<&PhraseDefinition> {
        self.phrases.get(id)
    }

    pub fn syllables(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|p| p.syllables.as_slice())
    }

    /// None means "no expectation": any transcript is accepted.
    pub fn accepted_text(&self, id: &str) -> Option<&[String]> {
        self.get(id)
            .map(|p| p.accepted.as_slice())
            .filter(|a| !a.is_empty())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.phrases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn insert(&mut self, id: impl Into<String>, phrase: PhraseDefinition) {
        self.phrases.insert(id.into(), phrase);
    }

    /// The beginner Japanese lesson set. Each phrase has a male and a
    /// female reference recording that share syllables.
    pub fn builtin() -> Self {
        let lessons: &[(&str, &[&str], &[&str], &[&str])] = &[
            (
                "Hello",
                &["Ko", "n", "Ni", "Chi", "Wa"],
                &["konnichiwa", "hello", "こんにちは", "こんにちわ"],
                &[],
            ),
            ("Yes", &["Ha", "i"], &["hai", "hi", "yes", "はい"], &[]),
            ("I", &["Wa", "Ta", "Shi"], &["watashi", "watashiwa", "私", "わたし"], &[]),
            ("Be", &["De", "Su"], &["desu", "dess", "です"], &[]),
            (
                "Teacher",
                &["Se", "n", "Se", "i"],
                &["sensei", "sensay", "先生", "せんせい"],
                &[],
            ),
            (
                "YesIAmATeacher",
                &["Ha", "i", "Wa", "Ta", "Shi", "Wa", "Se", "n", "Se", "i", "De", "Su"],
                &[
                    "hai watashi wa sensei desu",
                    "はい私は先生です",
                    "はいわたしはせんせいです",
                    "はい、私は先生です",
                ],
                &["i am a teacher"],
            ),
            (
                "IAmAStudent",
                &["Wa", "Ta", "Shi", "Wa", "Ga", "Ku", "Se", "i", "De", "Su"],
                &["watashi wa gakusei desu", "私は学生です", "わたしはがくせいです"],
                &["i am a student"],
            ),
        ];

        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut book = Self::default();
        for &(stem, syllables, accepted, male_only) in lessons {
            for voice in ["Male", "Female"] {
                let mut accepted = to_strings(accepted);
                if voice == "Male" {
                    accepted.extend(to_strings(male_only));
                }
                book.insert(
                    format!("{stem}{voice}"),
                    PhraseDefinition {
                        syllables: to_strings(syllables),
                        accepted,
                    },
                );
            }
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_has_both_voices() {
        let book = PhraseBook::builtin();
        assert_eq!(book.len(), 14);
        assert_eq!(book.syllables("HelloMale"), book.syllables("HelloFemale"));
        assert_eq!(book.syllables("YesMale").unwrap(), ["Ha", "i"]);
    }

    #[test]
    fn english_variant_only_for_male_sentence() {
        let book = PhraseBook::builtin();
        let male = book.accepted_text("IAmAStudentMale").unwrap();
        let female = book.accepted_text("IAmAStudentFemale").unwrap();
        assert!(male.iter().any(|a| a == "i am a student"));
        assert!(!female.iter().any(|a| a == "i am a student"));
    }

    #[test]
    fn unknown_phrase_is_none() {
        let book = PhraseBook::builtin();
        assert!(book.get("GoodbyeMale").is_none());
        assert!(book.syllables("GoodbyeMale").is_none());
    }

    #[test]
    fn empty_accepted_list_means_no_expectation() {
        let mut book = PhraseBook::default();
        book.insert(
            "Hum",
            PhraseDefinition {
                syllables: vec!["M".into()],
                accepted: Vec::new(),
            },
        );
        assert!(book.accepted_text("Hum").is_none());
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let tmp = TempDir::new().unwrap();
        let book = PhraseBook::load(&tmp.path().join("phrases.toml")).unwrap();
        assert_eq!(book, PhraseBook::builtin());
    }

    #[test]
    fn override_file_replaces_builtin() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("phrases.toml");
        std::fs::write(
            &path,
            r#"
[phrases.ArigatouFemale]
syllables = ["A", "Ri", "Ga", "To", "U"]
accepted = ["arigatou", "ありがとう"]
"#,
        )
        .unwrap();

        let book = PhraseBook::load(&path).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.syllables("ArigatouFemale").unwrap().len(), 5);
        assert!(book.get("HelloMale").is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("phrases.toml");
        std::fs::write(&path, "[phrases.Bad]\nsyllables = 3\n").unwrap();
        assert!(PhraseBook::load(&path).is_err());
    }
}
