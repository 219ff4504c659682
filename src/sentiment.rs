//! Two-tier sentiment classification of free-text campaign responses.
//!
//! Short replies full of slang, emoji and Portuguese defeat generic
//! polarity scoring, so a keyword lexicon decides first and a
//! [`PolarityScorer`] only sees what the lexicon could not place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InsightsResult;
use crate::models::SentimentBreakdown;
use crate::stats::round_to;

const POSITIVE_KEYWORDS: &[&str] = &[
    "gostei", "amei", "ótimo", "excelente", "obrigado", "obrigada", "bom", "maravilhoso", "😍",
    "😁", "👍",
];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "ruim", "péssimo", "demora", "caro", "horrível", "não", "interesse", "😡", "😠", "👎",
];

const POLARITY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

pub trait PolarityScorer {
    /// Polarity in [-1, 1].
    fn polarity(&self, text: &str) -> InsightsResult<f64>;
}

/// Word-lexicon polarity: mean polarity of the known words in the text.
/// A preceding negation flips and halves a word, an intensifier scales it.
pub struct LexiconPolarity {
    words: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconPolarity {
    pub fn new() -> Self {
        let words = HashMap::from([
            ("good", 0.7),
            ("great", 0.8),
            ("excellent", 1.0),
            ("amazing", 0.6),
            ("awesome", 1.0),
            ("perfect", 1.0),
            ("best", 1.0),
            ("delicious", 1.0),
            ("tasty", 0.5),
            ("fresh", 0.3),
            ("love", 0.5),
            ("loved", 0.7),
            ("nice", 0.6),
            ("happy", 0.8),
            ("fine", 0.4),
            ("ok", 0.5),
            ("okay", 0.5),
            ("fast", 0.2),
            ("quick", 0.3),
            ("bad", -0.7),
            ("poor", -0.4),
            ("terrible", -1.0),
            ("awful", -1.0),
            ("horrible", -1.0),
            ("worst", -1.0),
            ("disappointing", -0.6),
            ("cold", -0.6),
            ("slow", -0.3),
            ("late", -0.3),
            ("expensive", -0.5),
            ("wrong", -0.5),
            ("hate", -0.8),
            ("rude", -0.3),
        ]);
        let intensifiers = HashMap::from([
            ("very", 1.3),
            ("really", 1.3),
            ("so", 1.3),
            ("super", 1.3),
            ("extremely", 1.5),
        ]);
        Self {
            words,
            intensifiers,
        }
    }

    fn is_negation(token: &str) -> bool {
        matches!(token, "not" | "no" | "never" | "nunca") || token.ends_with("n't")
    }
}

impl PolarityScorer for LexiconPolarity {
    fn polarity(&self, text: &str) -> InsightsResult<f64> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut scores = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(base) = self.words.get(token) else {
                continue;
            };
            let mut score = *base;
            let mut back = i;
            while back > 0 {
                back -= 1;
                let previous = tokens[back];
                if let Some(factor) = self.intensifiers.get(previous) {
                    score = (score * factor).clamp(-1.0, 1.0);
                } else if Self::is_negation(previous) {
                    score *= -0.5;
                    break;
                } else {
                    break;
                }
            }
            scores.push(score);
        }

        if scores.is_empty() {
            Ok(0.0)
        } else {
            Ok(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

fn keyword_match(text: &str) -> Option<Sentiment> {
    if POSITIVE_KEYWORDS.iter().any(|k| text.contains(k)) {
        Some(Sentiment::Positive)
    } else if NEGATIVE_KEYWORDS.iter().any(|k| text.contains(k)) {
        Some(Sentiment::Negative)
    } else {
        None
    }
}

pub fn classify(text: &str, scorer: &dyn PolarityScorer) -> Sentiment {
    let lowered = text.to_lowercase();
    if let Some(sentiment) = keyword_match(&lowered) {
        return sentiment;
    }

    let polarity = scorer.polarity(&lowered).unwrap_or_else(|err| {
        debug!(error = %err, "polarity scorer failed, treating response as neutral");
        0.0
    });
    if polarity > POLARITY_THRESHOLD {
        Sentiment::Positive
    } else if polarity < -POLARITY_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn analyze<'a, I>(responses: I, scorer: &dyn PolarityScorer) -> SentimentBreakdown
where
    I: IntoIterator<Item = &'a str>,
{
    let mut breakdown = SentimentBreakdown::default();
    for response in responses {
        match classify(response, scorer) {
            Sentiment::Positive => breakdown.positive += 1,
            Sentiment::Neutral => breakdown.neutral += 1,
            Sentiment::Negative => breakdown.negative += 1,
        }
    }

    let total = (breakdown.positive + breakdown.neutral + breakdown.negative).max(1) as f64;
    breakdown.positive_pct = round_to(breakdown.positive as f64 / total * 100.0, 1);
    breakdown.neutral_pct = round_to(breakdown.neutral as f64 / total * 100.0, 1);
    breakdown.negative_pct = round_to(breakdown.negative as f64 / total * 100.0, 1);
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightsError;

    struct BrokenScorer;

    impl PolarityScorer for BrokenScorer {
        fn polarity(&self, _text: &str) -> InsightsResult<f64> {
            Err(InsightsError::Polarity("model unavailable".to_string()))
        }
    }

    #[test]
    fn lexicon_decides_before_the_scorer() {
        let scorer = BrokenScorer;
        assert_eq!(classify("Ótimo atendimento", &scorer), Sentiment::Positive);
        assert_eq!(classify("muito RUIM", &scorer), Sentiment::Negative);
        assert_eq!(classify("chegou 👎", &scorer), Sentiment::Negative);
    }

    #[test]
    fn positive_keywords_win_over_negative() {
        let scorer = LexiconPolarity::new();
        assert_eq!(classify("não gostei? gostei sim", &scorer), Sentiment::Positive);
    }

    #[test]
    fn scorer_failure_is_neutral() {
        assert_eq!(classify("the pizza arrived", &BrokenScorer), Sentiment::Neutral);
    }

    #[test]
    fn lexicon_polarity_handles_negation_and_intensity() {
        let scorer = LexiconPolarity::new();
        assert!(scorer.polarity("really good food").unwrap() > 0.7);
        assert!(scorer.polarity("not good").unwrap() < -0.1);
        assert_eq!(scorer.polarity("delivered at noon").unwrap(), 0.0);
        assert_eq!(classify("terrible and cold", &scorer), Sentiment::Negative);
    }

    #[test]
    fn scenario_mixed_responses() {
        let scorer = LexiconPolarity::new();
        let breakdown = analyze(["ótimo atendimento", "muito ruim", "ok"], &scorer);
        assert_eq!(breakdown.negative, 1);
        assert_eq!(breakdown.positive + breakdown.neutral, 2);
        assert!(breakdown.positive >= 1);
        let sum = breakdown.positive_pct + breakdown.neutral_pct + breakdown.negative_pct;
        assert!((sum - 100.0).abs() <= 0.1);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let scorer = LexiconPolarity::new();
        let responses = ["amei", "ok", "whatever", "caro demais", "great", "meh", "👍"];
        let breakdown = analyze(responses, &scorer);
        let sum = breakdown.positive_pct + breakdown.neutral_pct + breakdown.negative_pct;
        assert!((sum - 100.0).abs() <= 0.1);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let breakdown = analyze(std::iter::empty(), &LexiconPolarity::new());
        assert_eq!(breakdown, SentimentBreakdown::default());
    }
}
