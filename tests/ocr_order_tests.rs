use std::time::Duration;

use casefiles::rasterize::PageImage;
use casefiles::{extract_pages, OcrError, TextDetector};

/// Detector whose latency decreases with page number, so later pages finish
/// first and any ordering bug shows up immediately.
struct SkewedDetector {
    total: usize,
}

impl TextDetector for SkewedDetector {
    fn detect_text(&self, image: &[u8], _hints: &[String]) -> Result<String, OcrError> {
        let page = image.len();
        let delay = (self.total.saturating_sub(page) * 15) as u64;
        std::thread::sleep(Duration::from_millis(delay));
        Ok(format!("page-{}-text", page))
    }
}

struct FlakyDetector;

impl TextDetector for FlakyDetector {
    fn detect_text(&self, image: &[u8], _hints: &[String]) -> Result<String, OcrError> {
        match image.len() {
            2 => Err(OcrError::Http("timeout".to_string())),
            3 => Ok("   ".to_string()),
            4 => Ok(String::new()),
            n => Ok(format!("page-{}-text", n)),
        }
    }
}

fn pages(n: usize) -> Vec<PageImage> {
    (1..=n)
        .map(|i| PageImage { index: i, bytes: vec![0u8; i] })
        .collect()
}

#[test]
fn results_follow_page_order_not_completion_order() {
    let input = pages(6);
    let detector = SkewedDetector { total: 6 };
    let out = extract_pages(&detector, &input, &["ko".to_string()], 4);

    assert_eq!(out.len(), 6);
    for (i, page) in out.iter().enumerate() {
        assert_eq!(page.index, i + 1);
        assert_eq!(page.text, format!("page-{}-text", i + 1));
        assert!(page.ok);
    }
}

#[test]
fn per_page_failures_become_inline_markers() {
    let input = pages(5);
    let out = extract_pages(&FlakyDetector, &input, &["ko".to_string()], 2);

    assert!(out[0].ok);
    assert!(!out[1].ok);
    assert!(out[1].text.contains("페이지 2에서 텍스트 추출 중 오류가 발생했습니다"));
    // Empty recognition is not a failure: it gets the softer empty-page
    // marker, whether the detector returned whitespace or nothing at all.
    assert!(!out[2].ok);
    assert_eq!(out[2].text, "*페이지 3에서 텍스트를 추출하지 못했습니다.*");
    assert!(!out[3].ok);
    assert_eq!(out[3].text, "*페이지 4에서 텍스트를 추출하지 못했습니다.*");
    assert!(out[4].ok);
}

#[test]
fn single_worker_still_preserves_order() {
    let input = pages(3);
    let detector = SkewedDetector { total: 3 };
    let out = extract_pages(&detector, &input, &["ko".to_string()], 1);
    let indices: Vec<usize> = out.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}
