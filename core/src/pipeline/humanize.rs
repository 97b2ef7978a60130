//! Post-processing that strips generation artifacts from answer text.

use std::sync::LazyLock;

use regex::Regex;

/// Ordered phrase/marker patterns. Phrase removal must run before the
/// newline collapse: stripping a label or bullet prefix can leave extra
/// blank lines behind that the collapse then folds away.
static PHRASE_PATTERNS: LazyLock<Vec<(Regex, &str)>> = LazyLock::new(|| {
    [
        // pleasantry openers on their own line
        (r"(?im)^(hello|hi there|hi|greetings|dear)\b[^\n]*\n+", ""),
        (
            r"(?i)i hope this (message|email|response) finds you well[.!]?\s*",
            "",
        ),
        (r"(?im)^(certainly|sure|of course)[,!.]\s*", ""),
        // assistant-style labels
        (r"(?im)^(summary|response|answer):\s*", ""),
        // markdown emphasis markers, bold before italic
        (r"\*\*([^*]+)\*\*", "$1"),
        (r"\*([^*\n]+)\*", "$1"),
        // bullet-line prefixes
        (r"(?m)^\s*[-*•]\s+", ""),
    ]
    .iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
    .collect()
});

static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Removes filler phrases, labels, and markdown markers, then collapses
/// runs of blank lines and trims the result.
#[must_use]
pub fn humanize(text: &str) -> String {
    let mut cleaned = text.to_string();
    for (pattern, replacement) in PHRASE_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, *replacement).into_owned();
    }
    let cleaned = EXTRA_NEWLINES.replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}
