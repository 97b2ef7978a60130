//! Turns tabular requirement/response exports into indexable documents.
//!
//! The ingestion layer hands over a plain [`Table`] (spreadsheet parsing
//! happens outside the core); this module finds the two interesting
//! columns, filters out blank rows, and renders each pair with the fixed
//! document template the retrieval side matches against.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Candidate requirement header names, in priority order.
const REQUIREMENT_CANDIDATES: &[&str] = &[
    "requirement",
    "requirements",
    "question",
    "questions",
    "query",
    "queries",
    "item",
    "items",
    "task",
    "tasks",
    "rfp_requirement",
    "rfp_question",
    "description",
];

/// Candidate response header names, in priority order.
const RESPONSE_CANDIDATES: &[&str] = &[
    "response",
    "responses",
    "answer",
    "answers",
    "reply",
    "replies",
    "solution",
    "solutions",
    "description",
    "details",
    "content",
    "rfp_response",
    "our_response",
    "proposal_response",
];

/// A column qualifies as requirement-like when its sampled cells average
/// at least this many heuristic points.
const CONTENT_SCORE_THRESHOLD: f32 = 1.5;
const CONTENT_SAMPLE_ROWS: usize = 10;

const BUSINESS_TERMS: &[&str] = &[
    "must",
    "shall",
    "should",
    "require",
    "vendor",
    "contractor",
    "experience",
    "compliance",
    "capability",
    "approach",
    "solution",
    "service",
];

static QUESTION_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(what|how|why|when|where|which|who|describe|provide|explain|list|detail|outline|do|does|can|will|is|are)\b",
    )
    .unwrap()
});

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("could not detect requirement and response columns (available: {available:?})")]
    ColumnsNotDetected { available: Vec<String> },
}

/// Header row plus data rows, as supplied by the ingestion layer.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    fn cell<'a>(&self, row: &'a [String], column: usize) -> Option<&'a str> {
        row.get(column).map(String::as_str)
    }
}

/// One historical requirement/response pair, already trimmed and non-blank.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RfpPair {
    pub requirement: String,
    pub response: String,
}

/// Finds the requirement and response column indices.
///
/// Header matching is deterministic: an exact case-insensitive match always
/// wins over a partial (substring-either-way) one, and among partial
/// matches the longer candidate name wins. The response column is forced
/// distinct from the requirement column. When no requirement header
/// matches, columns whose sampled content looks like requirement text
/// (question marks, question leads, business terms) are considered as a
/// fallback.
pub fn detect_columns(table: &Table) -> (Option<usize>, Option<usize>) {
    let headers_lower: Vec<String> = table
        .headers
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let requirement = match_column(&headers_lower, REQUIREMENT_CANDIDATES, None)
        .or_else(|| requirement_column_by_content(table));
    let response = match_column(&headers_lower, RESPONSE_CANDIDATES, requirement);

    debug!(?requirement, ?response, "detected columns");
    (requirement, response)
}

fn match_column(
    headers_lower: &[String],
    candidates: &[&str],
    exclude: Option<usize>,
) -> Option<usize> {
    let usable = |index: usize| Some(index) != exclude && !headers_lower[index].is_empty();

    // exact match beats any partial match
    for candidate in candidates {
        if let Some(index) = headers_lower
            .iter()
            .position(|h| h == candidate)
            .filter(|i| usable(*i))
        {
            return Some(index);
        }
    }

    // among partial matches the longest candidate wins; a header that
    // contains the candidate beats one the candidate merely contains, and
    // list/column order breaks whatever remains
    let mut best: Option<(usize, bool, usize)> = None; // (candidate_len, header_contains, column)
    for candidate in candidates {
        for (index, header) in headers_lower.iter().enumerate() {
            if !usable(index) {
                continue;
            }
            let header_contains = header.contains(candidate);
            if !header_contains && !candidate.contains(header.as_str()) {
                continue;
            }
            let better = best.is_none_or(|(len, contains, _)| {
                candidate.len() > len || (candidate.len() == len && header_contains && !contains)
            });
            if better {
                best = Some((candidate.len(), header_contains, index));
            }
        }
    }
    best.map(|(_, _, index)| index)
}

fn requirement_column_by_content(table: &Table) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for column in 0..table.headers.len() {
        let sampled: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|row| table.cell(row, column))
            .filter(|cell| !cell.trim().is_empty())
            .take(CONTENT_SAMPLE_ROWS)
            .collect();
        if sampled.is_empty() {
            continue;
        }
        let average =
            sampled.iter().map(|cell| content_score(cell)).sum::<f32>() / sampled.len() as f32;
        if average >= CONTENT_SCORE_THRESHOLD
            && best.is_none_or(|(score, _)| average > score)
        {
            best = Some((average, column));
        }
    }
    best.map(|(_, column)| column)
}

/// Question/business-term heuristic for a single cell: one point each for
/// a question mark, a question-style opening word, and business vocabulary.
fn content_score(cell: &str) -> f32 {
    let trimmed = cell.trim();
    let lower = trimmed.to_lowercase();
    let mut score = 0.0;
    if trimmed.contains('?') {
        score += 1.0;
    }
    if QUESTION_LEAD.is_match(trimmed) {
        score += 1.0;
    }
    if BUSINESS_TERMS.iter().any(|term| lower.contains(term)) {
        score += 1.0;
    }
    score
}

/// Extracts trimmed requirement/response pairs, dropping rows where either
/// side is blank.
pub fn extract_pairs(table: &Table) -> Result<Vec<RfpPair>, IndexerError> {
    let (Some(req_col), Some(resp_col)) = detect_columns(table) else {
        return Err(IndexerError::ColumnsNotDetected {
            available: table.headers.clone(),
        });
    };

    let pairs: Vec<RfpPair> = table
        .rows
        .iter()
        .filter_map(|row| {
            let requirement = table.cell(row, req_col)?.trim();
            let response = table.cell(row, resp_col)?.trim();
            if requirement.is_empty() || response.is_empty() {
                return None;
            }
            Some(RfpPair {
                requirement: requirement.to_string(),
                response: response.to_string(),
            })
        })
        .collect();

    debug!(pairs = pairs.len(), "extracted requirement/response pairs");
    Ok(pairs)
}

/// Renders pairs into the fixed document template, numbered from 1.
///
/// The template text is part of the retrieval contract: query-time matching
/// happens against these documents, so the wording must stay stable.
pub fn to_documents(pairs: &[RfpPair]) -> Vec<String> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            format!(
                "RFP Response #{n}\n\n\
                 Requirement: {requirement}\n\n\
                 Response: {response}\n\n\
                 ---\n\
                 This is a historical RFP response that demonstrates how our organization \
                 has addressed similar requirements in the past. The response can be used \
                 as reference for generating responses to similar future requirements.",
                n = i + 1,
                requirement = pair.requirement,
                response = pair.response,
            )
        })
        .collect()
}
