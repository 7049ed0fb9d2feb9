use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::TemplateKind;
use crate::config::Templates;

static PREFIX_FOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+_[^_]+)_").unwrap());

/// Korean body emitted when every page of a file came back empty.
pub const EXTRACTION_FAILED_BODY: &str = "## 텍스트 추출 실패\n\n이 PDF 파일에서 텍스트를 추출하지 못했습니다. 파일이 스캔된 이미지일 수 있습니다.";

/// Metadata available to the per-kind templates. Fixed fields; the template
/// decides which it actually shows.
#[derive(Debug, Clone, Default)]
pub struct MetadataVars {
    pub filename: String,
    pub original_file_path: String,
    pub original_file_name: String,
    pub extraction_date: String,
    pub page_count: usize,
    pub date: Option<String>,
    pub document_type: Option<String>,
    pub submitter: Option<String>,
    pub evidence_type: Option<String>,
}

impl MetadataVars {
    /// Build from a (usually prefixed and semantically renamed) PDF path.
    ///
    /// The category-specific fields are recovered from the renamed stem,
    /// e.g. `8_제출서면_2023.10.13.자_답변서_피고.pdf`. Names that do not
    /// parse simply leave those fields unset.
    pub fn from_pdf(pdf: &Path, page_count: usize) -> MetadataVars {
        let file_name = pdf
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = pdf
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let mut vars = MetadataVars {
            filename: stem.clone(),
            original_file_path: pdf.display().to_string(),
            original_file_name: file_name,
            extraction_date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            page_count,
            ..MetadataVars::default()
        };

        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() >= 3 {
            let date = parts
                .iter()
                .find(|p| p.matches('.').count() >= 2)
                .map(|p| p.to_string());
            if parts[1].contains("제출서면") {
                vars.date = date;
                if parts.len() >= 4 {
                    vars.document_type = Some(parts[parts.len() - 2].to_string());
                    vars.submitter = Some(parts[parts.len() - 1].to_string());
                }
            } else if parts[1].contains("제출증거") {
                vars.date = date;
                if parts.len() >= 4 {
                    vars.evidence_type = Some(parts[parts.len() - 2].to_string());
                    vars.submitter = Some(parts[parts.len() - 1].to_string());
                }
            } else if parts[1].contains("판결") {
                vars.date = date;
            }
        }
        vars
    }

    fn as_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("filename", self.filename.clone());
        map.insert("pdf_name_without_ext", self.filename.clone());
        map.insert("pdf_path", self.original_file_path.clone());
        map.insert("original_file", self.original_file_path.clone());
        map.insert("original_file_path", self.original_file_path.clone());
        map.insert("original_file_name", self.original_file_name.clone());
        map.insert("extraction_date", self.extraction_date.clone());
        map.insert("datetime", self.extraction_date.clone());
        map.insert("page_count", self.page_count.to_string());
        map.insert("total_pages", self.page_count.to_string());
        if let Some(v) = &self.date {
            map.insert("date", v.clone());
            map.insert("evidence_date", v.clone());
        }
        if let Some(v) = &self.document_type {
            map.insert("document_type", v.clone());
        }
        if let Some(v) = &self.submitter {
            map.insert("submitter", v.clone());
        }
        if let Some(v) = &self.evidence_type {
            map.insert("evidence_type", v.clone());
        }
        map
    }
}

/// Substitution result. `unresolved` names placeholders the vars could not
/// fill; those stay verbatim in the text so the gap is visible in the output.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub unresolved: Vec<String>,
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Replace every `{key}` in the template for which a value exists.
pub fn substitute(template: &str, vars: &MetadataVars) -> Rendered {
    let map = vars.as_map();
    let mut unresolved = Vec::new();
    let text = PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            match map.get(key) {
                Some(value) => value.clone(),
                None => {
                    unresolved.push(key.to_string());
                    caps[0].to_string()
                }
            }
        })
        .to_string();
    Rendered { text, unresolved }
}

fn template_for<'a>(kind: TemplateKind, templates: &'a Templates) -> &'a str {
    let chosen = match kind {
        TemplateKind::Evidence => &templates.evidence.metadata_template,
        TemplateKind::Submission => &templates.submission.metadata_template,
        TemplateKind::Judgment => &templates.judgment.metadata_template,
        TemplateKind::Default => &templates.default.metadata_template,
    };
    if chosen.trim().is_empty() {
        &templates.default.metadata_template
    } else {
        chosen
    }
}

fn evidence_page_marker(page: usize, total: usize) -> String {
    format!(
        "---\n\n**<span style=\"color:blue; background-color:#E6F7FF;\">Page {}/{}</span>**",
        page, total
    )
}

fn standard_page_marker(page: usize, total: usize) -> String {
    format!(
        "---\n\n***<span style=\"color:blue; background-color:#A6F1E0;\"><big>[Page {}/{}]</big></span>***",
        page, total
    )
}

/// Assemble the final markdown document: metadata header from the kind's
/// template, then the cleaned pages in physical order.
///
/// Multi-page files get a per-page marker, compact badge for evidence and
/// the bold bracketed rule for everything else. A single page is emitted
/// bare. When every page is empty the body is replaced by the extraction
/// failure notice; pages whose OCR failed keep their inline error marker in
/// position, so a lone bad page never triggers the notice.
pub fn assemble(
    pages: &[String],
    kind: TemplateKind,
    vars: &MetadataVars,
    templates: &Templates,
) -> Rendered {
    let header = substitute(template_for(kind, templates), vars);

    let non_empty: Vec<(usize, &String)> = pages
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.trim().is_empty())
        .collect();

    let body = if non_empty.is_empty() {
        EXTRACTION_FAILED_BODY.to_string()
    } else if pages.len() == 1 {
        non_empty[0].1.trim().to_string()
    } else {
        let total = pages.len();
        let marker = match kind {
            TemplateKind::Evidence => evidence_page_marker,
            _ => standard_page_marker,
        };
        non_empty
            .iter()
            .map(|(i, text)| format!("{}\n\n{}", marker(i + 1, total), text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    Rendered {
        text: format!("{}\n\n{}\n", header.text, body),
        unresolved: header.unresolved,
    }
}

/// Where the markdown lands: inside the category-prefix sub-folder when the
/// filename carries one, otherwise next to the source PDF.
pub fn output_path(pdf: &Path, case_dir: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let file_name = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    match PREFIX_FOLDER.captures(file_name) {
        Some(caps) => case_dir.join(&caps[1]).join(format!("{}.md", stem)),
        None => pdf.with_extension("md"),
    }
}
