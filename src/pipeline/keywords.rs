//! Related-keyword ranking for the keyword cloud.
//!
//! Tags score `1 + 0.5 × performance ratio` per occurrence, so tags on
//! over-performing videos float up. Title words add a small flat score to
//! surface terms that are not tagged.

use std::collections::HashMap;

use serde::Serialize;

use crate::record::MediaRecord;

/// Default number of keywords shown in the cloud.
pub const DEFAULT_KEYWORD_LIMIT: usize = 15;

const TAG_BASE_SCORE: f64 = 1.0;
const TAG_RATIO_WEIGHT: f64 = 0.5;
const TITLE_WORD_SCORE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub word: String,
    pub score: f64,
}

impl Keyword {
    /// Font size for the cloud: 12px plus the score, capped at 24px.
    pub fn font_size(&self) -> f64 {
        12.0 + self.score.min(12.0)
    }
}

/// Rank keywords across the view, highest score first. Equal scores keep
/// first-seen order.
pub fn rank_keywords(records: &[MediaRecord], limit: usize) -> Vec<Keyword> {
    let mut scores = OrderedScores::default();

    for record in records {
        let tag_score = TAG_BASE_SCORE + record.performance_ratio() * TAG_RATIO_WEIGHT;
        for tag in record.tags() {
            scores.add(tag, tag_score);
        }

        for word in record.title().split_whitespace().filter(|w| is_keyword_word(w)) {
            scores.add(word, TITLE_WORD_SCORE);
        }
    }

    let mut ranked = scores.into_vec();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

/// A title word qualifies if it has more than one character and every
/// character is an ASCII word character or a Hangul syllable.
pub fn is_keyword_word(word: &str) -> bool {
    word.chars().count() > 1
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || ('가'..='힣').contains(&c))
}

/// Insertion-ordered score accumulator.
#[derive(Default)]
struct OrderedScores {
    index: HashMap<String, usize>,
    entries: Vec<Keyword>,
}

impl OrderedScores {
    fn add(&mut self, word: &str, score: f64) {
        match self.index.get(word) {
            Some(&i) => self.entries[i].score += score,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push(Keyword {
                    word: word.to_string(),
                    score,
                });
            }
        }
    }

    fn into_vec(self) -> Vec<Keyword> {
        self.entries
    }
}
