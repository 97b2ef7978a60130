//! Deterministic quality scoring for (requirement, response) pairs.
//!
//! Every heuristic here is a pure function over the two input strings, so
//! each one can be unit-tested in isolation and the composed score is
//! reproducible: identical input always yields an identical `QualityScore`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Hand-tuned dimension weights. Treated as configuration constants,
/// not values to re-derive.
pub const WEIGHT_COMPLETENESS: f32 = 0.30;
pub const WEIGHT_CLARITY: f32 = 0.25;
pub const WEIGHT_PROFESSIONALISM: f32 = 0.25;
pub const WEIGHT_RELEVANCE: f32 = 0.20;

/// Status thresholds on the weighted overall score.
pub const EXCELLENT_THRESHOLD: f32 = 85.0;
pub const GOOD_THRESHOLD: f32 = 75.0;
pub const NEEDS_REVIEW_THRESHOLD: f32 = 60.0;

const POSITIVE_PHRASES: &[&str] = &[
    "demonstrated experience",
    "proven track record",
    "comprehensive approach",
    "industry best practices",
    "established methodology",
    "quality assurance",
    "client satisfaction",
    "measurable results",
    "continuous improvement",
    "subject matter expertise",
    "strategic partnership",
    "value proposition",
];

const HEDGING_PHRASES: &[&str] = &[
    "maybe",
    "might",
    "probably",
    "i think",
    "in my opinion",
    "not sure",
    "could be",
    "sort of",
    "kind of",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should",
];

static GOOD_CLARITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(first|second|third|finally)\b",
        r"\b(however|therefore|furthermore|additionally)\b",
        r"\b(specifically|for example|such as)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static POOR_CLARITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\b(uh|um|er)\b", r"\.{3,}", r"\b(thing|stuff|whatever)\b"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static ANSWER_INDICATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(yes|no|we will|we can|we provide|our approach|we have)\b").unwrap()
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());

static FIRST_PERSON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(I|we)\b").unwrap());

static PASSIVE_VOICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(is|are|was|were)\s+\w+ed\b").unwrap());

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-•\d+]\s").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityStatus {
    Excellent,
    Good,
    #[serde(rename = "Needs Review")]
    NeedsReview,
    Poor,
}

impl std::fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsReview => "Needs Review",
            Self::Poor => "Poor",
        };
        write!(f, "{s}")
    }
}

/// Quality rating of a response, all dimensions in `[0, 100]` rounded to
/// one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityScore {
    pub overall: f32,
    pub completeness: f32,
    pub clarity: f32,
    pub professionalism: f32,
    pub relevance: f32,
    pub feedback: Vec<String>,
    pub status: QualityStatus,
}

/// Scores a response against its requirement. Never fails: an empty or
/// whitespace-only response yields an all-zero `Poor` score with an
/// "empty" feedback entry.
#[must_use]
pub fn score(requirement: &str, response: &str) -> QualityScore {
    if response.trim().is_empty() {
        return QualityScore {
            overall: 0.0,
            completeness: 0.0,
            clarity: 0.0,
            professionalism: 0.0,
            relevance: 0.0,
            feedback: vec!["Response is empty or missing".to_string()],
            status: QualityStatus::Poor,
        };
    }

    let completeness = score_completeness(requirement, response);
    let clarity = score_clarity(response);
    let professionalism = score_professionalism(response);
    let relevance = score_relevance(requirement, response);

    let overall = completeness * WEIGHT_COMPLETENESS
        + clarity * WEIGHT_CLARITY
        + professionalism * WEIGHT_PROFESSIONALISM
        + relevance * WEIGHT_RELEVANCE;

    let feedback = generate_feedback(completeness, clarity, professionalism, relevance, response);

    QualityScore {
        overall: round1(overall),
        completeness: round1(completeness),
        clarity: round1(clarity),
        professionalism: round1(professionalism),
        relevance: round1(relevance),
        feedback,
        status: status_for(overall),
    }
}

/// Scores an ordered batch of (requirement, response) pairs. Output order
/// is 1:1 with input order.
pub fn score_batch<'a, I>(pairs: I) -> Vec<QualityScore>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(requirement, response)| score(requirement, response))
        .collect()
}

/// Summary statistics over a scored batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_responses: usize,
    pub average_score: f32,
    pub min_score: f32,
    pub max_score: f32,
    pub excellent_count: usize,
    pub good_count: usize,
    pub needs_review_count: usize,
    pub poor_count: usize,
}

pub fn batch_summary(scores: &[QualityScore]) -> Option<BatchSummary> {
    if scores.is_empty() {
        return None;
    }
    let overalls: Vec<f32> = scores.iter().map(|s| s.overall).collect();
    let count_status = |status: QualityStatus| scores.iter().filter(|s| s.status == status).count();
    Some(BatchSummary {
        total_responses: scores.len(),
        average_score: round1(overalls.iter().sum::<f32>() / overalls.len() as f32),
        min_score: overalls.iter().copied().fold(f32::INFINITY, f32::min),
        max_score: overalls.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        excellent_count: count_status(QualityStatus::Excellent),
        good_count: count_status(QualityStatus::Good),
        needs_review_count: count_status(QualityStatus::NeedsReview),
        poor_count: count_status(QualityStatus::Poor),
    })
}

/// How completely the response addresses the requirement.
///
/// Anything under 50 characters is flatly judged too short to be complete.
pub fn score_completeness(requirement: &str, response: &str) -> f32 {
    if response.trim().chars().count() < 50 {
        return 30.0;
    }

    let mut score: f32 = 60.0;

    let req_words = requirement.split_whitespace().count();
    let resp_words = response.split_whitespace().count();
    if resp_words as f32 >= req_words as f32 * 0.5 {
        score += 15.0;
    }
    if resp_words >= req_words {
        score += 10.0;
    }

    let questions = requirement.matches('?').count();
    if questions > 0 {
        let indicators = ANSWER_INDICATORS
            .find_iter(&response.to_lowercase())
            .count();
        if indicators >= questions {
            score += 15.0;
        }
    } else {
        score += 15.0;
    }

    score.min(100.0)
}

/// Clarity and structure: connector phrases help, filler hurts, and both
/// run-on sentences and bullet lists move the score.
pub fn score_clarity(response: &str) -> f32 {
    let mut score = 70.0;
    let lower = response.to_lowercase();

    for pattern in GOOD_CLARITY_PATTERNS.iter() {
        let matches = pattern.find_iter(&lower).count();
        score += (matches as f32 * 5.0).min(15.0);
    }
    for pattern in POOR_CLARITY_PATTERNS.iter() {
        score -= pattern.find_iter(&lower).count() as f32 * 10.0;
    }

    let sentence_lengths: Vec<usize> = response
        .split('.')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split_whitespace().count())
        .collect();
    if !sentence_lengths.is_empty() {
        let avg = sentence_lengths.iter().sum::<usize>() as f32 / sentence_lengths.len() as f32;
        if (10.0..=25.0).contains(&avg) {
            score += 10.0;
        } else if avg > 40.0 {
            score -= 15.0;
        }
    }

    if BULLET_LINE.is_match(response) {
        score += 10.0;
    }

    score.clamp(0.0, 100.0)
}

/// Professional business tone: fixed positive and hedging phrase lists,
/// first-person usage, passive-voice ratio, and leading capitalization.
pub fn score_professionalism(response: &str) -> f32 {
    let mut score: f32 = 70.0;
    let lower = response.to_lowercase();

    for phrase in POSITIVE_PHRASES {
        if lower.contains(phrase) {
            score += 3.0;
        }
    }
    for phrase in HEDGING_PHRASES {
        if lower.contains(phrase) {
            score -= 10.0;
        }
    }

    if FIRST_PERSON.is_match(response) {
        score += 5.0;
    }

    let total_words = response.split_whitespace().count();
    if total_words > 0 {
        let passive = PASSIVE_VOICE.find_iter(response).count();
        if passive as f32 / total_words as f32 > 0.3 {
            score -= 15.0;
        }
    }

    if response.chars().next().is_some_and(char::is_uppercase) {
        score += 5.0;
    }

    score.clamp(0.0, 100.0)
}

/// Stopword-filtered token overlap between requirement and response, with
/// a bonus for echoing the requirement's longer, more technical terms.
pub fn score_relevance(requirement: &str, response: &str) -> f32 {
    let req_tokens = meaningful_tokens(requirement);
    if req_tokens.is_empty() {
        return 70.0;
    }
    let resp_tokens = meaningful_tokens(response);

    let overlap: HashSet<&String> = req_tokens.intersection(&resp_tokens).collect();
    let overlap_ratio = overlap.len() as f32 / req_tokens.len() as f32;
    let mut score = 50.0 + overlap_ratio * 50.0;

    let technical = req_tokens.iter().filter(|w| w.chars().count() > 6).count();
    if technical > 0 {
        let addressed = overlap.iter().filter(|w| w.chars().count() > 6).count();
        score += addressed as f32 / technical as f32 * 20.0;
    }

    score.min(100.0)
}

fn meaningful_tokens(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn generate_feedback(
    completeness: f32,
    clarity: f32,
    professionalism: f32,
    relevance: f32,
    response: &str,
) -> Vec<String> {
    let mut feedback = Vec::new();

    if completeness < 70.0 {
        feedback
            .push("Response seems incomplete. Consider providing more detailed information.".into());
    }
    if clarity < 70.0 {
        feedback.push("Response could be clearer. Try using bullet points or numbered lists.".into());
    }
    if professionalism < 70.0 {
        feedback.push("Consider using more professional business language.".into());
    }
    if relevance < 70.0 {
        feedback.push(
            "Response doesn't fully address the requirement. Include more specific details.".into(),
        );
    }
    if response.split_whitespace().count() < 30 {
        feedback.push("Response is too brief. Provide more comprehensive information.".into());
    }

    let dimensions = [completeness, clarity, professionalism, relevance];
    if dimensions.iter().all(|s| *s >= 80.0) {
        feedback.push("Excellent response! Ready for submission.".into());
    } else if dimensions.iter().all(|s| *s >= 70.0) {
        feedback.push("Good response with minor room for improvement.".into());
    }

    if feedback.is_empty() {
        feedback.push("Response meets basic quality standards.".into());
    }
    feedback
}

fn status_for(overall: f32) -> QualityStatus {
    if overall >= EXCELLENT_THRESHOLD {
        QualityStatus::Excellent
    } else if overall >= GOOD_THRESHOLD {
        QualityStatus::Good
    } else if overall >= NEEDS_REVIEW_THRESHOLD {
        QualityStatus::NeedsReview
    } else {
        QualityStatus::Poor
    }
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
