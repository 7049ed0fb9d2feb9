pub mod category;
pub mod config;
pub mod fsops;
pub mod markdown;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod prefix;
pub mod rasterize;
pub mod rename;

pub use category::{classify, template_kind, DocumentCategory, TemplateKind};
pub use config::{Config, ConfigError, Taxonomy};
pub use fsops::{resolve_collision, CollisionError, RenameOp, RenamePhase};
pub use markdown::{assemble, output_path, substitute, MetadataVars, Rendered};
pub use normalize::{normalize, PAGE_BREAK};
pub use ocr::{extract_pages, OcrError, PageText, TextDetector, VisionClient};
pub use pipeline::{extract_folder, rename_folder, ExtractSummary, RenameSummary};
pub use prefix::apply_prefix;
pub use rasterize::{check_deps, rasterize, DepsResult, PageImage, RasterizeError};
pub use rename::{collapse_repeated_phrases, rename_semantic};

/// Emit one structured JSON event line on stderr.
/// Batch runs report every step through this so logs stay greppable.
pub fn log_event(value: serde_json::Value) {
    eprintln!("{}", value);
}
