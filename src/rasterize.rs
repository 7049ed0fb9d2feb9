use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    pub ok: bool,
    pub missing: Vec<String>,
}

/// Check required/optional CLI dependencies.
/// - Required: pdftoppm (Poppler) for page rasterization
/// - Optional: pdfinfo, used to probe page counts up front
/// Returns a DepsResult. `ok` is true iff required deps are present.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();

    let has_pdftoppm = which::which("pdftoppm").is_ok();
    if !has_pdftoppm {
        missing.push("pdftoppm".to_string());
    }
    if which::which("pdfinfo").is_err() {
        missing.push("pdfinfo".to_string());
    }

    DepsResult { ok: has_pdftoppm, missing }
}

/// One rasterized page, held in memory until its OCR result lands.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based physical page number.
    pub index: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("EncryptedPDF: {0}")]
    EncryptedPdf(String),
    #[error("MissingTool: {0}")]
    MissingTool(String),
    #[error("ConvertFailed: {0}")]
    Convert(String),
}

fn tool_path(poppler_path: Option<&Path>, tool: &str) -> PathBuf {
    match poppler_path {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(tool),
        _ => PathBuf::from(tool),
    }
}

/// Probe the page count via pdfinfo. None when pdfinfo is unavailable or
/// unparsable; encrypted PDFs are surfaced as errors.
fn page_count(pdf: &Path, poppler_path: Option<&Path>) -> Result<Option<usize>, RasterizeError> {
    let pdfinfo = tool_path(poppler_path, "pdfinfo");
    if poppler_path.is_none() && which::which("pdfinfo").is_err() {
        return Ok(None);
    }
    let out = match Command::new(&pdfinfo).arg(pdf).output() {
        Ok(out) => out,
        Err(_) => return Ok(None),
    };
    if !out.status.success() {
        let err = String::from_utf8_lossy(&out.stderr).to_lowercase();
        if err.contains("encrypt") || err.contains("password") {
            return Err(RasterizeError::EncryptedPdf(pdf.display().to_string()));
        }
        return Ok(None);
    }
    let s = String::from_utf8_lossy(&out.stdout);
    for line in s.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            return Ok(rest.trim().parse::<usize>().ok());
        }
    }
    Ok(None)
}

/// Convert each page of a PDF to a JPEG image at the given DPI, ordered by
/// physical page. The converter's internal threading is its own business;
/// this adapter only fixes DPI and page order.
///
/// Total failure (missing file, missing converter, corrupt or encrypted PDF)
/// is an error, never a partial list.
pub fn rasterize(
    pdf: &Path,
    dpi: u32,
    poppler_path: Option<&Path>,
) -> Result<Vec<PageImage>, RasterizeError> {
    if !pdf.exists() {
        return Err(RasterizeError::FileNotFound(pdf.display().to_string()));
    }
    let pdftoppm = tool_path(poppler_path, "pdftoppm");
    if poppler_path.is_none() && which::which("pdftoppm").is_err() {
        return Err(RasterizeError::MissingTool("pdftoppm".to_string()));
    }

    let tmpdir = tempfile::tempdir().map_err(|e| RasterizeError::Convert(e.to_string()))?;

    let known_pages = page_count(pdf, poppler_path)?;
    let mut pages: Vec<PageImage> = Vec::new();
    let mut page_no = 1usize;
    loop {
        if let Some(n) = known_pages {
            if page_no > n {
                break;
            }
        }
        let render_prefix = tmpdir.path().join(format!("p{}", page_no));
        let render_img = render_prefix.with_extension("jpg");

        let out = Command::new(&pdftoppm)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_no.to_string())
            .arg("-l")
            .arg(page_no.to_string())
            .arg("-jpeg")
            .arg("-singlefile")
            .arg(pdf)
            .arg(&render_prefix)
            .output()
            .map_err(|e| RasterizeError::Convert(e.to_string()))?;

        if !out.status.success() {
            let err = String::from_utf8_lossy(&out.stderr).to_lowercase();
            if err.contains("encrypt") || err.contains("password") {
                return Err(RasterizeError::EncryptedPdf(pdf.display().to_string()));
            }
            if known_pages.is_none() && page_no > 1 {
                // Walked past the last page in fallback mode.
                break;
            }
            return Err(RasterizeError::Convert(format!(
                "pdftoppm failed on page {} of {}",
                page_no,
                pdf.display()
            )));
        }
        if !render_img.exists() {
            if known_pages.is_none() && page_no > 1 {
                break;
            }
            return Err(RasterizeError::Convert(format!(
                "no image produced for page {} of {}",
                page_no,
                pdf.display()
            )));
        }
        let bytes =
            std::fs::read(&render_img).map_err(|e| RasterizeError::Convert(e.to_string()))?;
        if bytes.is_empty() {
            return Err(RasterizeError::Convert(format!(
                "empty image for page {} of {}",
                page_no,
                pdf.display()
            )));
        }
        pages.push(PageImage { index: page_no, bytes });
        page_no += 1;
    }

    if pages.is_empty() {
        return Err(RasterizeError::Convert(format!(
            "no pages rendered from {}",
            pdf.display()
        )));
    }
    Ok(pages)
}
