use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{Taxonomy, EVIDENCE_PREFIX, JUDGMENT_PREFIX, SUBMISSION_PREFIX};

/// Closed set of document classes produced by the e-filing download dump.
/// Assigned once per file and reused by both the rename pipeline and the
/// markdown pipeline so the two never diverge on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    Evidence,
    Submission,
    Judgment,
    JudgmentDeclaration,
    AppealReason,
    WitnessRecord,
    Transcript,
    WitnessQuestion,
    FactInquiryResponse,
    Procedural,
    Unclassified,
}

/// Markdown template / page-marker family a category selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Evidence,
    Submission,
    Judgment,
    Default,
}

static EVIDENCE_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(갑|을)\d+").unwrap());

/// Court-produced procedural filings that share the submission rename
/// template but classify separately.
const PROCEDURAL_MARKERS: [&str; 2] = ["변론조서", "기일변경신청서"];

/// Map a raw filename to its category against the loaded taxonomy.
///
/// Recognizers run in a fixed priority order; the first match wins, which
/// resolves names that satisfy several categories at once (a 판결선고조서 also
/// contains generic submission markers, for example). Absence of a match is a
/// valid terminal value, not a failure.
pub fn classify(filename: &str, taxonomy: &Taxonomy) -> DocumentCategory {
    let recognizers: [(&dyn Fn(&str, &Taxonomy) -> bool, DocumentCategory); 10] = [
        (&is_judgment_declaration, DocumentCategory::JudgmentDeclaration),
        (&is_judgment, DocumentCategory::Judgment),
        (&is_appeal_reason, DocumentCategory::AppealReason),
        (&is_fact_inquiry_response, DocumentCategory::FactInquiryResponse),
        (&is_witness_record, DocumentCategory::WitnessRecord),
        (&is_transcript, DocumentCategory::Transcript),
        (&is_witness_question, DocumentCategory::WitnessQuestion),
        (&is_evidence, DocumentCategory::Evidence),
        (&is_procedural, DocumentCategory::Procedural),
        (&is_submission, DocumentCategory::Submission),
    ];
    for (recognizer, category) in recognizers {
        if recognizer(filename, taxonomy) {
            return category;
        }
    }
    DocumentCategory::Unclassified
}

/// Which metadata template and page-marker style a category uses.
/// Single source of truth for the category/template coupling invariant.
pub fn template_kind(category: DocumentCategory) -> TemplateKind {
    use DocumentCategory::*;
    match category {
        Evidence | FactInquiryResponse | WitnessRecord | Transcript | WitnessQuestion => {
            TemplateKind::Evidence
        }
        Submission | Procedural | AppealReason | JudgmentDeclaration => TemplateKind::Submission,
        Judgment => TemplateKind::Judgment,
        Unclassified => TemplateKind::Default,
    }
}

fn is_judgment_declaration(name: &str, _taxonomy: &Taxonomy) -> bool {
    name.contains("판결선고조서")
}

fn is_judgment(name: &str, taxonomy: &Taxonomy) -> bool {
    name.contains("판결문") && taxonomy.mentions(JUDGMENT_PREFIX, "판결문")
}

fn is_appeal_reason(name: &str, taxonomy: &Taxonomy) -> bool {
    name.contains("항소이유서") && taxonomy.mentions(SUBMISSION_PREFIX, "항소이유서")
}

fn is_fact_inquiry_response(name: &str, taxonomy: &Taxonomy) -> bool {
    (name.contains("사실조회 회신") || name.contains("사실조회회신"))
        && (taxonomy.mentions(EVIDENCE_PREFIX, "사실조회 회신")
            || taxonomy.mentions(EVIDENCE_PREFIX, "사실조회회신"))
}

fn is_witness_record(name: &str, taxonomy: &Taxonomy) -> bool {
    name.contains("증인신문조서") && taxonomy.mentions(EVIDENCE_PREFIX, "증인신문조서")
}

fn is_transcript(name: &str, taxonomy: &Taxonomy) -> bool {
    name.contains("녹취서") && taxonomy.mentions(EVIDENCE_PREFIX, "녹취서")
}

fn is_witness_question(name: &str, taxonomy: &Taxonomy) -> bool {
    (name.contains("증인 신문사항") || name.contains("신문사항"))
        && taxonomy.mentions(EVIDENCE_PREFIX, "신문사항")
}

fn is_evidence(name: &str, taxonomy: &Taxonomy) -> bool {
    // Only the party-letter rules count here; the other evidence-family
    // patterns have dedicated recognizers above.
    taxonomy
        .sources(EVIDENCE_PREFIX)
        .zip(taxonomy.patterns(EVIDENCE_PREFIX))
        .any(|(src, re)| {
            (src.starts_with('갑') || src.starts_with('을'))
                && EVIDENCE_MARKER_PATTERN.is_match(name)
                && re.is_match(name)
        })
}

fn is_procedural(name: &str, _taxonomy: &Taxonomy) -> bool {
    if name.contains("첨부") || name.contains("서증") {
        return false;
    }
    PROCEDURAL_MARKERS.iter().any(|m| name.contains(m))
}

fn is_submission(name: &str, taxonomy: &Taxonomy) -> bool {
    if name.contains("첨부") || name.contains("서증") {
        return false;
    }
    taxonomy.sources(SUBMISSION_PREFIX).any(|pat| name.contains(pat))
}
