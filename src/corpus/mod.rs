use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::error::Error;

static CORPUS_DIR: Dir = include_dir!("src/corpus");

/// Difficulty tier attached to every passage in the corpus.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// An immutable practice passage. Created at selection time, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingText {
    pub id: String,
    pub content: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Deserialize)]
struct CorpusFile {
    #[allow(dead_code)]
    language: String,
    texts: Vec<TypingText>,
}

/// Filter applied when picking a passage. Both fields optional; an empty
/// filter matches the whole corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFilter {
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

impl TextFilter {
    fn matches(&self, text: &TypingText) -> bool {
        self.difficulty.map_or(true, |d| text.difficulty == d)
            && self
                .category
                .as_deref()
                .map_or(true, |c| text.category == c)
    }
}

/// The static passage corpus, embedded in the binary.
#[derive(Debug, Clone)]
pub struct Corpus {
    texts: Vec<TypingText>,
}

impl Corpus {
    /// Load the embedded corpus. Panics only if the compiled-in asset is
    /// malformed, which a build with intact sources cannot produce.
    pub fn embedded() -> Self {
        read_corpus_from_file("en.json").unwrap()
    }

    pub fn from_texts(texts: Vec<TypingText>) -> Self {
        Self { texts }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Pick a uniform-random passage matching the filter. If nothing matches,
    /// the filter is dropped and the whole corpus is sampled instead; `None`
    /// only for an empty corpus.
    pub fn select(&self, filter: &TextFilter) -> Option<TypingText> {
        let rng = &mut rand::thread_rng();
        let matching: Vec<&TypingText> = self.texts.iter().filter(|t| filter.matches(t)).collect();

        let pool = if matching.is_empty() {
            self.texts.iter().collect()
        } else {
            matching
        };

        pool.choose(rng).map(|t| (*t).clone())
    }

    pub fn by_id(&self, id: &str) -> Option<&TypingText> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn texts_with_difficulty(&self, difficulty: Difficulty) -> Vec<&TypingText> {
        self.texts
            .iter()
            .filter(|t| t.difficulty == difficulty)
            .collect()
    }

    pub fn texts_in_category(&self, category: &str) -> Vec<&TypingText> {
        self.texts
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Distinct categories, sorted for stable display.
    pub fn categories(&self) -> Vec<String> {
        self.texts
            .iter()
            .map(|t| t.category.clone())
            .unique()
            .sorted()
            .collect()
    }
}

fn read_corpus_from_file(file_name: &str) -> Result<Corpus, Box<dyn Error>> {
    let file = CORPUS_DIR
        .get_file(file_name)
        .expect("Corpus file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let parsed: CorpusFile = from_str(file_as_str)?;

    Ok(Corpus {
        texts: parsed.texts,
    })
}
