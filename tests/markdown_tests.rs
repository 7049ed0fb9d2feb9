use std::path::Path;

use casefiles::markdown::EXTRACTION_FAILED_BODY;
use casefiles::{assemble, output_path, substitute, Config, MetadataVars, TemplateKind};

fn vars() -> MetadataVars {
    MetadataVars::from_pdf(
        Path::new("/사건1/8_제출서면_2023.05.02.자_소장_원고.pdf"),
        3,
    )
}

#[test]
fn header_fields_come_from_the_renamed_stem() {
    let config = Config::default();
    let pages = vec!["본문입니다.".to_string()];
    let out = assemble(&pages, TemplateKind::Submission, &vars(), &config.templates);
    assert!(out.text.contains("# 8_제출서면_2023.05.02.자_소장_원고"));
    assert!(out.text.contains("서면종류: 소장"));
    assert!(out.text.contains("제출자: 원고"));
    assert!(out.text.contains("페이지수: 3"));
    assert!(out.unresolved.is_empty());
}

#[test]
fn multi_page_submission_uses_bold_markers() {
    let config = Config::default();
    let pages = vec!["첫 페이지.".to_string(), "둘째 페이지.".to_string()];
    let out = assemble(&pages, TemplateKind::Submission, &vars(), &config.templates);
    assert!(out.text.contains("[Page 1/2]"));
    assert!(out.text.contains("[Page 2/2]"));
    assert!(out.text.contains("#A6F1E0"));
}

#[test]
fn multi_page_evidence_uses_compact_badges() {
    let config = Config::default();
    let pages = vec!["첫 페이지.".to_string(), "둘째 페이지.".to_string()];
    let out = assemble(&pages, TemplateKind::Evidence, &vars(), &config.templates);
    assert!(out.text.contains("Page 1/2"));
    assert!(out.text.contains("#E6F7FF"));
    assert!(!out.text.contains("[Page 1/2]"));
}

#[test]
fn single_page_skips_markers() {
    let config = Config::default();
    let pages = vec!["본문.".to_string()];
    let out = assemble(&pages, TemplateKind::Submission, &vars(), &config.templates);
    assert!(!out.text.contains("Page 1/1"));
    assert!(out.text.contains("본문."));
}

#[test]
fn failed_page_marker_sits_in_its_slot() {
    let config = Config::default();
    let marker = "*페이지 2에서 텍스트 추출 중 오류가 발생했습니다: request failed: timeout*";
    let pages = vec![
        "첫 페이지 본문.".to_string(),
        marker.to_string(),
        "셋째 페이지 본문.".to_string(),
    ];
    let out = assemble(&pages, TemplateKind::Submission, &vars(), &config.templates);

    let p1 = out.text.find("첫 페이지 본문.").unwrap();
    let p2 = out.text.find(marker).unwrap();
    let p3 = out.text.find("셋째 페이지 본문.").unwrap();
    assert!(p1 < p2 && p2 < p3);
    assert!(out.text.contains("[Page 2/3]"));
}

#[test]
fn all_pages_empty_yields_failure_notice() {
    let config = Config::default();
    let pages = vec!["".to_string(), "  ".to_string()];
    let out = assemble(&pages, TemplateKind::Default, &vars(), &config.templates);
    assert!(out.text.contains(EXTRACTION_FAILED_BODY));
}

#[test]
fn metadata_parses_the_renamed_submission_stem() {
    let parsed = MetadataVars::from_pdf(
        Path::new("/사건1/8_제출서면_2023.10.13.자_답변서_피고.pdf"),
        3,
    );
    assert_eq!(parsed.date.as_deref(), Some("2023.10.13.자"));
    assert_eq!(parsed.document_type.as_deref(), Some("답변서"));
    assert_eq!(parsed.submitter.as_deref(), Some("피고"));
}

#[test]
fn substitute_leaves_unknown_placeholders_in_place() {
    let out = substitute("{filename} {unknown_key}", &vars());
    assert!(out.text.contains("{unknown_key}"));
    assert_eq!(out.unresolved, vec!["unknown_key".to_string()]);
}

#[test]
fn prefixed_file_writes_into_its_category_folder() {
    let out = output_path(
        Path::new("/사건1/7_제출증거_(갑1)_계약서.pdf"),
        Path::new("/사건1"),
    );
    assert_eq!(out, Path::new("/사건1/7_제출증거/7_제출증거_(갑1)_계약서.md"));
}

#[test]
fn unprefixed_file_writes_next_to_the_source() {
    let out = output_path(Path::new("/사건1/메모.pdf"), Path::new("/사건1"));
    assert_eq!(out, Path::new("/사건1/메모.md"));
}

#[test]
fn unresolved_placeholders_are_reported_not_dropped() {
    let config = Config::default();
    // Evidence template asks for an evidence marker this stem cannot supply.
    let plain = MetadataVars::from_pdf(Path::new("/사건1/메모.pdf"), 1);
    let pages = vec!["본문.".to_string()];
    let out = assemble(&pages, TemplateKind::Evidence, &plain, &config.templates);
    assert!(out.unresolved.contains(&"evidence_type".to_string()));
    assert!(out.text.contains("{evidence_type}"));
}
