use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::category::{classify, template_kind, DocumentCategory};
use crate::config::{Config, SUBMISSION_PREFIX};
use crate::fsops::{resolve_collision, RenameOp, RenamePhase};
use crate::markdown::{assemble, output_path, MetadataVars};
use crate::normalize::normalize;
use crate::ocr::{extract_pages, TextDetector};
use crate::prefix::{apply_prefix, has_prefix};
use crate::rasterize::rasterize;
use crate::rename::{collapse_repeated_phrases, rename_semantic};
use crate::log_event;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read folder {0}: {1}")]
    Folder(String, std::io::Error),
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RenameSummary {
    pub renamed: usize,
    pub prefixed: usize,
    pub moved: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ExtractSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl RenameSummary {
    /// True when the run actually changed the folder. Skipped files do not
    /// count; a folder of unclassifiable files accomplishes nothing.
    pub fn did_work(&self) -> bool {
        self.renamed + self.prefixed + self.moved > 0
    }
}

impl ExtractSummary {
    /// True when output was produced or confirmed already present. Skipped
    /// means the markdown exists, so it counts.
    pub fn did_work(&self) -> bool {
        self.processed + self.skipped > 0
    }
}

/// The folder whose files get renamed and extracted: the raw download dump
/// when present, the case folder itself otherwise.
fn source_dir(case_dir: &Path, config: &Config) -> PathBuf {
    let dump = case_dir.join(&config.naming.original_folder_name);
    if dump.is_dir() {
        dump
    } else {
        case_dir.to_path_buf()
    }
}

fn file_names(dir: &Path) -> Result<Vec<String>, PipelineError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::Folder(dir.display().to_string(), e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::Folder(dir.display().to_string(), e))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Run the two-phase rename over a case folder.
///
/// Phase 1 rewrites classified filenames to their canonical semantic form;
/// phase 2 prepends the category prefix to every classified name still
/// lacking one. With `move_unchanged`, files neither phase touched are
/// swept into the procedural-files folder. Each file is independent; an
/// error is recorded and the batch continues. Re-running on a processed
/// folder changes nothing.
pub fn rename_folder(
    case_dir: &Path,
    config: &Config,
    move_unchanged: bool,
) -> Result<RenameSummary, PipelineError> {
    let taxonomy = match config.taxonomy() {
        Ok(t) => t,
        Err(e) => {
            return Ok(RenameSummary {
                errors: vec![e.to_string()],
                ..RenameSummary::default()
            })
        }
    };
    let dir = source_dir(case_dir, config);
    let mut summary = RenameSummary::default();

    // Phase 1: semantic rename. Prefixed names were processed on an
    // earlier run and are left for phase 2's no-op check.
    let mut current: Vec<String> = Vec::new();
    for name in file_names(&dir)? {
        let proposal = if has_prefix(&name) {
            None
        } else {
            match classify(&name, &taxonomy) {
                DocumentCategory::Unclassified => None,
                category => rename_semantic(&name, category),
            }
        };
        match proposal {
            Some(new_name) if new_name != name => {
                match RenameOp::plan(&dir, &name, &new_name, RenamePhase::Semantic)
                    .map_err(|e| e.to_string())
                    .and_then(|op| {
                        op.execute().map_err(|e| e.to_string())?;
                        Ok(op)
                    }) {
                    Ok(op) => {
                        summary.renamed += 1;
                        let landed = op
                            .resolved
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or(&new_name)
                            .to_string();
                        log_event(serde_json::json!({
                            "tool": "rename_semantic",
                            "from": name,
                            "to": landed,
                        }));
                        current.push(landed);
                    }
                    Err(e) => {
                        summary.errors.push(format!("{}: {}", name, e));
                        current.push(name);
                    }
                }
            }
            _ => current.push(name),
        }
    }

    // Phase 2: category prefixing, with a doubled-phrase cleanup pass.
    let mut final_names: Vec<(String, bool)> = Vec::new();
    for name in current {
        let category = classify(&name, &taxonomy);
        if category == DocumentCategory::Unclassified {
            final_names.push((name, false));
            continue;
        }
        let prefixed = collapse_repeated_phrases(&apply_prefix(&name, &taxonomy));
        if prefixed == name {
            final_names.push((name, false));
            continue;
        }
        match RenameOp::plan(&dir, &name, &prefixed, RenamePhase::Prefix)
            .map_err(|e| e.to_string())
            .and_then(|op| {
                op.execute().map_err(|e| e.to_string())?;
                Ok(op)
            }) {
            Ok(op) => {
                summary.prefixed += 1;
                let landed = op
                    .resolved
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(&prefixed)
                    .to_string();
                log_event(serde_json::json!({
                    "tool": "apply_prefix",
                    "from": name,
                    "to": landed,
                }));
                final_names.push((landed, true));
            }
            Err(e) => {
                summary.errors.push(format!("{}: {}", name, e));
                final_names.push((name, false));
            }
        }
    }

    // Phase 3: sweep untouched files into the procedural folder.
    if move_unchanged {
        let procedural = case_dir.join(&config.naming.procedural_folder_name);
        for (name, touched) in &final_names {
            if *touched || has_prefix(name) {
                continue;
            }
            if let Err(e) = move_to_folder(&dir, name, &procedural) {
                summary.errors.push(format!("{}: {}", name, e));
                continue;
            }
            summary.moved += 1;
            log_event(serde_json::json!({
                "tool": "move_unchanged",
                "file": name,
                "into": config.naming.procedural_folder_name,
            }));
        }
    }

    summary.skipped = final_names
        .iter()
        .filter(|(_, touched)| !touched)
        .count()
        .saturating_sub(summary.moved);
    Ok(summary)
}

fn move_to_folder(dir: &Path, name: &str, dest_dir: &Path) -> Result<(), String> {
    if !dest_dir.is_dir() {
        std::fs::create_dir_all(dest_dir).map_err(|e| e.to_string())?;
    }
    let target = resolve_collision(&dest_dir.join(name)).map_err(|e| e.to_string())?;
    std::fs::rename(dir.join(name), target).map_err(|e| e.to_string())
}

enum FileOutcome {
    Processed(PathBuf),
    Skipped,
    Failed(String),
}

/// Convert every in-scope PDF of a case folder to markdown.
///
/// Files fan out over a bounded pool sized by `max_workers_files`; inside
/// each file the pages fan out again over the OCR pool. A file is one unit
/// of work: rasterize, recognize, normalize, assemble, write. Existing
/// markdown output skips the file, which is what makes re-runs cheap and
/// safe. When `include_evidence` is off only submission-prefixed files are
/// considered.
pub fn extract_folder(
    case_dir: &Path,
    config: &Config,
    detector: &(dyn TextDetector),
    include_evidence: bool,
) -> Result<ExtractSummary, PipelineError> {
    let dir = source_dir(case_dir, config);
    let walker = globwalk::GlobWalkerBuilder::from_patterns(&dir, &["*.pdf"])
        .max_depth(1)
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            PipelineError::Folder(
                dir.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            )
        })?;

    let mut pdfs: Vec<PathBuf> = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path().to_path_buf();
        if !include_evidence {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with(SUBMISSION_PREFIX) {
                continue;
            }
        }
        pdfs.push(path);
    }
    pdfs.sort();

    let taxonomy = match config.taxonomy() {
        Ok(t) => t,
        Err(e) => {
            return Ok(ExtractSummary {
                errors: vec![e.to_string()],
                ..ExtractSummary::default()
            })
        }
    };

    let file_workers = config.extraction.file_workers().min(pdfs.len()).max(1);
    let run = || {
        pdfs.par_iter()
            .map(|pdf| extract_one(pdf, case_dir, config, &taxonomy, detector))
            .collect::<Vec<FileOutcome>>()
    };
    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(file_workers)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(_) => run(),
    };

    let mut summary = ExtractSummary::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Processed(path) => {
                summary.processed += 1;
                log_event(serde_json::json!({
                    "tool": "extract_pdf",
                    "output": path.display().to_string(),
                }));
            }
            FileOutcome::Skipped => summary.skipped += 1,
            FileOutcome::Failed(msg) => {
                summary.failed += 1;
                summary.errors.push(msg);
            }
        }
    }
    Ok(summary)
}

fn extract_one(
    pdf: &Path,
    case_dir: &Path,
    config: &Config,
    taxonomy: &crate::config::Taxonomy,
    detector: &(dyn TextDetector),
) -> FileOutcome {
    let out = output_path(pdf, case_dir);
    if out.exists() {
        return FileOutcome::Skipped;
    }

    let name = pdf.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let kind = template_kind(classify(name, taxonomy));

    let poppler = config.extraction.poppler_path.as_deref().map(Path::new);
    let images = match rasterize(pdf, config.extraction.dpi, poppler) {
        Ok(images) => images,
        Err(e) => return FileOutcome::Failed(format!("{}: {}", pdf.display(), e)),
    };

    let page_texts = extract_pages(
        detector,
        &images,
        &config.extraction.language_hints,
        config.extraction.page_workers(),
    );
    let pages: Vec<String> = page_texts
        .iter()
        .map(|p| {
            if p.ok {
                normalize(&p.text, kind)
            } else {
                // Inline error markers pass through untouched.
                p.text.clone()
            }
        })
        .collect();

    let vars = MetadataVars::from_pdf(pdf, pages.len());
    let rendered = assemble(&pages, kind, &vars, &config.templates);
    if !rendered.unresolved.is_empty() {
        log_event(serde_json::json!({
            "tool": "extract_pdf",
            "warning": "unresolved template placeholders",
            "file": pdf.display().to_string(),
            "placeholders": rendered.unresolved,
        }));
    }

    if let Some(parent) = out.parent() {
        if !parent.is_dir() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return FileOutcome::Failed(format!("{}: {}", pdf.display(), e));
            }
        }
    }
    let target = match resolve_collision(&out) {
        Ok(t) => t,
        Err(e) => return FileOutcome::Failed(format!("{}: {}", pdf.display(), e)),
    };
    match std::fs::write(&target, rendered.text) {
        Ok(()) => FileOutcome::Processed(target),
        Err(e) => FileOutcome::Failed(format!("{}: {}", pdf.display(), e)),
    }
}
