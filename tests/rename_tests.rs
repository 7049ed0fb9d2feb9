use casefiles::{
    apply_prefix, classify, collapse_repeated_phrases, rename_semantic, Config, DocumentCategory,
};

fn taxonomy() -> casefiles::Taxonomy {
    Config::default().taxonomy().unwrap()
}

#[test]
fn evidence_with_doubled_descriptor_end_to_end() {
    let tx = taxonomy();
    let input = "갑10-1_등기사항전부증명서(법인)(등기사항전부증명서(법인)).pdf";

    let category = classify(input, &tx);
    assert_eq!(category, DocumentCategory::Evidence);

    let renamed = rename_semantic(input, category).unwrap();
    assert_eq!(renamed, "(갑10-1)_등기사항전부증명서(법인).pdf");

    let prefixed = collapse_repeated_phrases(&apply_prefix(&renamed, &tx));
    assert_eq!(prefixed, "7_제출증거_(갑10-1)_등기사항전부증명서(법인).pdf");
}

#[test]
fn complaint_end_to_end() {
    let tx = taxonomy();
    let input = "사건1_2023.05.02._소장_원고.pdf";

    let category = classify(input, &tx);
    assert_eq!(category, DocumentCategory::Submission);

    let renamed = rename_semantic(input, category).unwrap();
    assert_eq!(renamed, "2023.05.02.자_소장_원고.pdf");

    let prefixed = apply_prefix(&renamed, &tx);
    assert_eq!(prefixed, "8_제출서면_2023.05.02.자_소장_원고.pdf");
}

#[test]
fn appeal_document_beats_complaint_substring() {
    let renamed =
        rename_semantic("사건1_2024.01.05._항소장_피고.pdf", DocumentCategory::Submission).unwrap();
    assert_eq!(renamed, "2024.01.05.자_항소장_피고.pdf");
}

#[test]
fn hearing_record_keeps_round_number() {
    let renamed = rename_semantic(
        "사건1_2023.08.01._변론조서 (3회).pdf",
        DocumentCategory::Procedural,
    )
    .unwrap();
    assert_eq!(renamed, "2023.08.01.자_변론조서(3회).pdf");
}

#[test]
fn application_subtype_overrides_generic() {
    let renamed = rename_semantic(
        "사건1_2023.09.12._청구취지변경신청서_원고.pdf",
        DocumentCategory::Submission,
    )
    .unwrap();
    assert_eq!(renamed, "2023.09.12.자_청구취지변경 신청서_원고.pdf");
}

#[test]
fn judgment_carries_judge_name() {
    let renamed = rename_semantic(
        "사건1_2023.11.24._판결문_판사_홍길동.pdf",
        DocumentCategory::Judgment,
    )
    .unwrap();
    assert_eq!(renamed, "2023.11.24.자_판결문_판사_홍길동.pdf");
}

#[test]
fn witness_record_marks_courtroom_audio() {
    let renamed = rename_semantic(
        "사건1_2023.07.01._증인신문조서_법정녹음.mp3",
        DocumentCategory::WitnessRecord,
    )
    .unwrap();
    assert_eq!(renamed, "2023.07.01.자_증인신문조서_법정녹음.mp3");
}

#[test]
fn fact_inquiry_response_carries_organization() {
    let renamed = rename_semantic(
        "사건1_2023.09.01._사실조회 회신_기타_국민건강보험공단.pdf",
        DocumentCategory::FactInquiryResponse,
    )
    .unwrap();
    assert_eq!(renamed, "2023.09.01.자_사실조회회신서_기타_국민건강보험공단.pdf");
}

#[test]
fn rename_without_date_is_refused() {
    assert_eq!(
        rename_semantic("판결문.pdf", DocumentCategory::Judgment),
        None
    );
    assert_eq!(
        rename_semantic("소장_원고.pdf", DocumentCategory::Submission),
        None
    );
}

#[test]
fn collapse_handles_both_doubling_shapes() {
    assert_eq!(
        collapse_repeated_phrases("등기사항전부증명서(법인)(등기사항전부증명서(법인)).pdf"),
        "등기사항전부증명서(법인).pdf"
    );
    assert_eq!(collapse_repeated_phrases("계약서(계약서).pdf"), "계약서.pdf");
    assert_eq!(
        collapse_repeated_phrases("통장사본_통장사본_우리은행.pdf"),
        "통장사본_우리은행.pdf"
    );
    // A legitimate single phrase passes through untouched.
    assert_eq!(
        collapse_repeated_phrases("임대차계약서(2023년).pdf"),
        "임대차계약서(2023년).pdf"
    );
}
