use casefiles::{normalize, TemplateKind, PAGE_BREAK};

#[test]
fn drops_page_number_lines() {
    let raw = "첫 번째 문단입니다.\n- 3 -\n두 번째 문단입니다.";
    let out = normalize(raw, TemplateKind::Submission);
    assert!(!out.contains("- 3 -"));
    assert!(out.contains("첫 번째 문단입니다."));
    assert!(out.contains("두 번째 문단입니다."));
}

#[test]
fn drops_symbol_and_digit_only_lines() {
    let raw = "청구의 취지입니다.\n===---===\n12 34 56\n이유는 다음과 같습니다.";
    let out = normalize(raw, TemplateKind::Judgment);
    assert!(!out.contains("==="));
    assert!(!out.contains("12 34 56"));
    assert!(out.contains("청구의 취지입니다."));
}

#[test]
fn keeps_outline_numbers_in_submissions() {
    let raw = "1. 청구의 취지\n피고는 원고에게 금원을 지급하라.";
    let out = normalize(raw, TemplateKind::Submission);
    assert!(out.contains("1. 청구의 취지"));
}

#[test]
fn unwraps_broken_sentences() {
    let raw = "원고는 피고에게 대여금을\n지급하였습니다.";
    let out = normalize(raw, TemplateKind::Submission);
    assert!(out.contains("원고는 피고에게 대여금을 지급하였습니다."));
}

#[test]
fn evidence_paragraphs_are_double_spaced() {
    let raw = "계약서 제1조.\n계약서 제2조.";
    let out = normalize(raw, TemplateKind::Evidence);
    assert_eq!(out, "계약서 제1조.\n\n계약서 제2조.");
}

#[test]
fn evidence_strips_leading_dashes_submissions_keep_them() {
    let raw = "- 임대인은 보증금을 반환한다.";
    let evidence = normalize(raw, TemplateKind::Evidence);
    assert!(evidence.starts_with("임대인은"));
    let submission = normalize(raw, TemplateKind::Submission);
    assert!(submission.starts_with("- 임대인은"));
}

#[test]
fn preserves_page_break_sentinel() {
    let raw = format!("첫 페이지입니다.{}둘째 페이지입니다.", PAGE_BREAK);
    let out = normalize(&raw, TemplateKind::Judgment);
    assert_eq!(out.matches(PAGE_BREAK).count(), 1);
}
