use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{Taxonomy, DEFAULT_PREFIX, EVIDENCE_PREFIX, JUDGMENT_PREFIX, SUBMISSION_PREFIX};

/// Structural shape of an applied category prefix: digit group, underscore,
/// label, underscore.
static PREFIX_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+_[^_]+_").unwrap());

/// Does the name already carry a category prefix?
pub fn has_prefix(filename: &str) -> bool {
    PREFIX_SHAPE.is_match(filename)
}

/// Strip a leading category prefix, if any.
pub fn strip_prefix(filename: &str) -> &str {
    match PREFIX_SHAPE.find(filename) {
        Some(m) => &filename[m.end()..],
        None => filename,
    }
}

/// Prepend the numeric-category prefix for a (usually semantically renamed)
/// filename.
///
/// A stale prefix is stripped and the name re-evaluated, so prefixes never
/// accumulate and re-applying to a correctly prefixed file is a no-op.
/// Judgment-adjacent literals take precedence over the taxonomy scan,
/// mirroring the classifier's priority order; when nothing matches the name
/// falls back to the basic-info prefix, so every file ends with exactly one.
pub fn apply_prefix(filename: &str, taxonomy: &Taxonomy) -> String {
    let bare = strip_prefix(filename);
    let (stem, _ext) = match bare.rfind('.') {
        Some(idx) if idx > 0 => (&bare[..idx], &bare[idx..]),
        _ => (bare, ""),
    };

    // Special cases first, highest precedence on top.
    if stem.contains("판결선고조서") {
        return format!("{}{}", SUBMISSION_PREFIX, bare);
    }
    if stem.contains("판결문") {
        return format!("{}{}", JUDGMENT_PREFIX, bare);
    }
    if stem.contains("항소이유서") {
        return format!("{}{}", SUBMISSION_PREFIX, bare);
    }
    if stem.contains("사실조회 회신") || stem.contains("사실조회회신") {
        return format!("{}{}", EVIDENCE_PREFIX, bare);
    }

    for (prefix, patterns) in taxonomy.rules() {
        if patterns.is_empty() {
            continue;
        }
        if patterns.iter().any(|p| p.is_match(stem)) {
            return format!("{}{}", prefix, bare);
        }
    }

    format!("{}{}", DEFAULT_PREFIX, bare)
}
