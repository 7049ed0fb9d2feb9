use casefiles::{resolve_collision, RenameOp, RenamePhase};
use std::fs;

#[test]
fn free_target_passes_through() {
    let td = tempfile::tempdir().unwrap();
    let target = td.path().join("2023.05.02.자_소장_원고.pdf");
    let resolved = resolve_collision(&target).unwrap();
    assert_eq!(resolved, target);
}

#[test]
fn occupied_target_gets_timestamp_suffix() {
    let td = tempfile::tempdir().unwrap();
    let target = td.path().join("소장.pdf");
    fs::write(&target, b"x").unwrap();

    let resolved = resolve_collision(&target).unwrap();
    assert_ne!(resolved, target);
    assert!(!resolved.exists());

    let name = resolved.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("소장_"));
    assert!(name.ends_with(".pdf"));
}

#[test]
fn plan_resolves_collisions_before_execute() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.pdf"), b"a").unwrap();
    fs::write(td.path().join("b.pdf"), b"b").unwrap();

    let op = RenameOp::plan(td.path(), "a.pdf", "b.pdf", RenamePhase::Semantic).unwrap();
    assert_ne!(op.resolved, op.proposed);
    op.execute().unwrap();

    assert!(!td.path().join("a.pdf").exists());
    // The original b.pdf is untouched.
    assert_eq!(fs::read(td.path().join("b.pdf")).unwrap(), b"b");
    assert!(op.resolved.exists());
}

#[test]
fn unchanged_name_is_a_noop() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.pdf"), b"a").unwrap();

    let op = RenameOp::plan(td.path(), "a.pdf", "a.pdf", RenamePhase::Prefix).unwrap();
    assert!(op.is_noop());
    op.execute().unwrap();
    assert!(td.path().join("a.pdf").exists());
}
