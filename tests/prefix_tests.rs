use casefiles::{apply_prefix, Config};

fn taxonomy() -> casefiles::Taxonomy {
    Config::default().taxonomy().unwrap()
}

#[test]
fn applying_twice_changes_nothing() {
    let tx = taxonomy();
    for name in [
        "2023.05.02.자_소장_원고.pdf",
        "(갑10-1)_등기사항전부증명서(법인).pdf",
        "2023.11.24.자_판결문.pdf",
        "메모.pdf",
    ] {
        let once = apply_prefix(name, &tx);
        let twice = apply_prefix(&once, &tx);
        assert_eq!(once, twice, "prefix not idempotent for {}", name);
    }
}

#[test]
fn stale_prefix_is_replaced_not_stacked() {
    let tx = taxonomy();
    let out = apply_prefix("1_기본정보_2023.05.02.자_소장_원고.pdf", &tx);
    assert_eq!(out, "8_제출서면_2023.05.02.자_소장_원고.pdf");
}

#[test]
fn judgment_adjacent_literals_route_specially() {
    let tx = taxonomy();
    assert_eq!(
        apply_prefix("2023.11.24.자_판결선고조서.pdf", &tx),
        "8_제출서면_2023.11.24.자_판결선고조서.pdf"
    );
    assert_eq!(
        apply_prefix("2023.11.24.자_판결문_판사_홍길동.pdf", &tx),
        "9_판결_2023.11.24.자_판결문_판사_홍길동.pdf"
    );
    assert_eq!(
        apply_prefix("2024.01.10.자_항소이유서_피고.pdf", &tx),
        "8_제출서면_2024.01.10.자_항소이유서_피고.pdf"
    );
    assert_eq!(
        apply_prefix("2023.09.01.자_사실조회회신서_기타.pdf", &tx),
        "7_제출증거_2023.09.01.자_사실조회회신서_기타.pdf"
    );
}

#[test]
fn unmatched_names_get_the_basic_info_prefix() {
    let tx = taxonomy();
    assert_eq!(apply_prefix("메모.pdf", &tx), "1_기본정보_메모.pdf");
}

#[test]
fn dateless_classified_name_still_gains_a_prefix() {
    // The semantic rename refused this name (no date token), yet the
    // prefix pass must still file it under its category.
    let tx = taxonomy();
    assert_eq!(apply_prefix("판결문.pdf", &tx), "9_판결_판결문.pdf");
    assert_eq!(apply_prefix("소장_원고.pdf", &tx), "8_제출서면_소장_원고.pdf");
}
