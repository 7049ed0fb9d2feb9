use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::DocumentCategory;

/// Date token as it appears in e-filing download names: an
/// underscore-delimited `yyyy.mm.dd` segment, sometimes with a stray
/// trailing dot before the next underscore.
static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\d{4})\.(\d{2})\.(\d{2})\.?_").unwrap());

static EVIDENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(갑|을)(\d+)(?:-(\d+))?").unwrap());

static EVIDENCE_DESCRIPTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:갑|을)\d+(?:-\d+)?_([^_]+)").unwrap());

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]+)\)").unwrap());

static MARKER_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:갑|을)\d+(?:-\d+)?").unwrap());

static DESCRIPTOR_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s가-힣()]").unwrap());

static HEARING_ROUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"변론조서 ?\((\d+)회\)").unwrap());

static APPLICATION_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣]+신청서)(?:\(([^)]+)\))?").unwrap());

static JUDGE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"판사_([^_]+)").unwrap());

static TRANSCRIPT_SUBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"녹취서요지\(([^)]+)\)").unwrap());

static WITNESS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"증인신청서\(([^)]+)\)").unwrap());

static INQUIRY_ORG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_기타_([^_]+?)(?:_|$)").unwrap());

/// Known submission document types, most specific first so 항소장 never
/// falls through to the 소장 substring it contains.
const DOC_TYPES: [&str; 7] = [
    "항소장",
    "기일변경신청서",
    "변론조서",
    "준비서면",
    "답변서",
    "신청서",
    "소장",
];

/// Derive the canonical filename for a classified file.
///
/// Returns None when the category's required tokens (date, evidence marker)
/// cannot be located; the caller keeps the original name in that case.
/// Classification succeeding does not guarantee a rename occurs.
pub fn rename_semantic(filename: &str, category: DocumentCategory) -> Option<String> {
    use DocumentCategory::*;
    match category {
        Evidence => rename_evidence(filename),
        Submission | Procedural => rename_submission(filename),
        Judgment => rename_judgment(filename),
        JudgmentDeclaration => rename_judgment_declaration(filename),
        AppealReason => rename_appeal_reason(filename),
        WitnessRecord => rename_witness_record(filename),
        Transcript => rename_transcript(filename),
        WitnessQuestion => rename_witness_question(filename),
        FactInquiryResponse => rename_fact_inquiry_response(filename),
        Unclassified => None,
    }
}

/// Split a filename into (stem, extension-with-dot).
fn split_ext(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx..]),
        _ => (filename, ""),
    }
}

fn extract_date(name: &str) -> Option<String> {
    DATE_TOKEN
        .captures(name)
        .map(|c| format!("{}.{}.{}", &c[1], &c[2], &c[3]))
}

fn extract_party(name: &str) -> &'static str {
    if name.contains("원고") {
        "원고"
    } else if name.contains("피고") {
        "피고"
    } else {
        ""
    }
}

fn rename_evidence(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let caps = EVIDENCE_MARKER.captures(stem)?;
    let marker = match caps.get(3) {
        Some(sub) => format!("({}{}-{})", &caps[1], &caps[2], sub.as_str()),
        None => format!("({}{})", &caps[1], &caps[2]),
    };

    let mut descriptor = EVIDENCE_DESCRIPTOR
        .captures(stem)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    // Fall back to parenthetical content, skipping the marker itself and
    // recording-file notes.
    if descriptor.is_empty() {
        for cap in PARENTHETICAL.captures_iter(stem) {
            let inner = &cap[1];
            if !MARKER_ONLY.is_match(inner) && !inner.starts_with("녹음파일") {
                descriptor = inner.to_string();
                break;
            }
        }
    }

    // Last resort: the first underscore segment that is neither the marker
    // nor a party/attachment token.
    if descriptor.is_empty() {
        for part in stem.split('_') {
            if !MARKER_ONLY.is_match(part)
                && !["서증", "원고", "피고", "대리인"].contains(&part)
                && !part.is_empty()
            {
                descriptor = part.to_string();
                break;
            }
        }
    }

    if descriptor.is_empty() {
        return Some(format!("{}{}", marker, ext));
    }

    let cleaned = DESCRIPTOR_NOISE.replace_all(&descriptor, "");
    let descriptor = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let descriptor = collapse_repeated_phrases(&descriptor);
    if descriptor.is_empty() {
        Some(format!("{}{}", marker, ext))
    } else {
        Some(format!("{}_{}{}", marker, descriptor, ext))
    }
}

fn rename_submission(filename: &str) -> Option<String> {
    // Attachments and exhibit bundles ride with their parent document.
    if filename.contains("첨부") || filename.contains("서증") {
        return None;
    }
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;

    let mut doc_type = DOC_TYPES
        .iter()
        .find(|dt| stem.contains(*dt))
        .map(|dt| dt.to_string())
        .unwrap_or_default();

    let mut extra = String::new();
    if stem.contains("변론조서") {
        if let Some(c) = HEARING_ROUND.captures(stem) {
            extra = format!("({}회)", &c[1]);
        }
    }
    if stem.contains("신청서") {
        // Specific request subtypes win over the generic 신청서 capture.
        if stem.contains("청구취지변경") {
            doc_type = "청구취지변경 신청서".to_string();
        } else if stem.contains("청구원인변경") {
            doc_type = "청구원인변경 신청서".to_string();
        } else if let Some(c) = APPLICATION_TYPE.captures(stem) {
            doc_type = c[1].to_string();
            if let Some(qualifier) = c.get(2) {
                extra = format!("({})", qualifier.as_str());
            }
        }
    }

    let party = extract_party(stem);
    let mut new_name = format!("{}.자_{}{}", date, doc_type, extra);
    if !party.is_empty() {
        new_name.push('_');
        new_name.push_str(party);
    }
    new_name.push_str(ext);
    Some(new_name)
}

fn rename_judgment(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    let mut new_name = format!("{}.자_판결문", date);
    if stem.contains("판사") {
        match JUDGE_NAME.captures(stem) {
            Some(c) => new_name.push_str(&format!("_판사_{}", &c[1])),
            None => new_name.push_str("_판사"),
        }
    }
    new_name.push_str(ext);
    Some(new_name)
}

fn rename_judgment_declaration(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    Some(format!("{}.자_판결선고조서{}", date, ext))
}

fn rename_appeal_reason(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    let party = extract_party(stem);
    let mut new_name = format!("{}.자_항소이유서", date);
    if !party.is_empty() {
        new_name.push('_');
        new_name.push_str(party);
    }
    new_name.push_str(ext);
    Some(new_name)
}

fn rename_witness_record(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    if stem.contains("법정녹음") || ext.eq_ignore_ascii_case(".mp3") {
        Some(format!("{}.자_증인신문조서_법정녹음{}", date, ext))
    } else {
        Some(format!("{}.자_증인신문조서{}", date, ext))
    }
}

fn rename_transcript(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    let content = if let Some(c) = TRANSCRIPT_SUBJECT.captures(stem) {
        format!("(증인{})", &c[1])
    } else if let Some(c) = PARENTHETICAL.captures(stem) {
        format!("({})", &c[1])
    } else {
        String::new()
    };
    Some(format!("{}.자_녹취서요지{}{}", date, content, ext))
}

fn rename_witness_question(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    let witness = WITNESS_NAME
        .captures(stem)
        .map(|c| format!("({})", &c[1]))
        .unwrap_or_default();
    let party = extract_party(stem);
    let mut new_name = format!("{}.자_증인신문사항{}", date, witness);
    if !party.is_empty() {
        new_name.push('_');
        new_name.push_str(party);
    }
    new_name.push_str(ext);
    Some(new_name)
}

fn rename_fact_inquiry_response(filename: &str) -> Option<String> {
    let (stem, ext) = split_ext(filename);
    let date = extract_date(stem)?;
    let org = INQUIRY_ORG
        .captures(stem)
        .map(|c| c[1].to_string())
        .unwrap_or_default();
    let mut new_name = format!("{}.자_사실조회회신서_기타", date);
    if !org.is_empty() {
        new_name.push('_');
        new_name.push_str(&org);
    }
    new_name.push_str(ext);
    Some(new_name)
}

/// Collapse doubled descriptor phrases that e-filing downloads sometimes
/// carry, e.g. `등기사항전부증명서(법인)(등기사항전부증명서(법인))` to
/// `등기사항전부증명서(법인)`, plus repeated underscore-delimited words.
///
/// The collapsing rules are heuristic and deliberately kept in this one
/// function; legitimately repeated text can be over-collapsed.
pub fn collapse_repeated_phrases(filename: &str) -> String {
    let (stem, ext) = split_ext(filename);

    let mut name = stem.to_string();
    // Bounded fixpoint; one pass collapses one doubling.
    for _ in 0..4 {
        match collapse_doubled(&name) {
            Some(shorter) => name = shorter,
            None => break,
        }
    }

    let mut unique: Vec<&str> = Vec::new();
    for word in name.split('_') {
        if !unique.contains(&word) {
            unique.push(word);
        }
    }
    format!("{}{}", unique.join("_"), ext)
}

/// Find a `X(X)` or `X)(X` doubling and return the single phrase,
/// re-balancing a parenthesis the split may have cut off.
fn collapse_doubled(name: &str) -> Option<String> {
    for (idx, ch) in name.char_indices() {
        if ch != '(' {
            continue;
        }
        let left = &name[..idx];
        let rest = &name[idx + 1..];
        if left.is_empty() || rest.is_empty() {
            continue;
        }
        let left_core = left.trim_end_matches(')');
        let rest_core = rest.trim_end_matches(')');
        if !left_core.is_empty() && left_core == rest_core {
            let opens = left_core.matches('(').count();
            let closes = left_core.matches(')').count();
            let mut repaired = left_core.to_string();
            for _ in closes..opens {
                repaired.push(')');
            }
            return Some(repaired);
        }
    }
    None
}
