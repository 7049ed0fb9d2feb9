use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One category-prefix rule: the prefix literal plus the regex patterns
/// whose match sends a filename under that prefix. Order of rules matters,
/// so the config carries them as a list, not a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRules {
    pub prefix_rules: Vec<PrefixRule>,
    /// Folder (relative to the case folder) that holds the raw download dump.
    #[serde(default = "NamingRules::default_original_folder")]
    pub original_folder_name: String,
    /// Folder that receives files neither phase could classify.
    #[serde(default = "NamingRules::default_procedural_folder")]
    pub procedural_folder_name: String,
}

impl NamingRules {
    fn default_original_folder() -> String {
        "원본폴더".to_string()
    }
    fn default_procedural_folder() -> String {
        "절차관련".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "ExtractionSettings::default_dpi")]
    pub dpi: u32,
    #[serde(default = "ExtractionSettings::default_language_hints")]
    pub language_hints: Vec<String>,
    #[serde(default)]
    pub poppler_path: Option<String>,
    #[serde(default)]
    pub credentials_path: Option<String>,
    /// Cap on the per-file page OCR pool. None derives min(4, cores).
    #[serde(default)]
    pub max_workers_pages: Option<usize>,
    /// Cap on the file-level pool. None derives max(2, cores/2), capped at 8.
    #[serde(default)]
    pub max_workers_files: Option<usize>,
}

impl ExtractionSettings {
    fn default_dpi() -> u32 {
        300
    }
    fn default_language_hints() -> Vec<String> {
        vec!["ko".to_string()]
    }

    pub fn page_workers(&self) -> usize {
        self.max_workers_pages
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1)
    }

    pub fn file_workers(&self) -> usize {
        self.max_workers_files
            .unwrap_or_else(|| (num_cpus::get() / 2).max(2))
            .clamp(1, 8)
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            dpi: Self::default_dpi(),
            language_hints: Self::default_language_hints(),
            poppler_path: None,
            credentials_path: None,
            max_workers_pages: None,
            max_workers_files: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSet {
    #[serde(default)]
    pub metadata_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Templates {
    #[serde(default)]
    pub evidence: TemplateSet,
    #[serde(default)]
    pub submission: TemplateSet,
    #[serde(default)]
    pub judgment: TemplateSet,
    #[serde(default)]
    pub default: TemplateSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub naming: NamingRules,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default = "Templates::built_in")]
    pub templates: Templates,
}

impl Config {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        let cfg: Config = serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.naming.prefix_rules.is_empty() {
            return Err(ConfigError::Invalid("no prefix rules".into()));
        }
        for rule in &self.naming.prefix_rules {
            if rule.prefix.trim().is_empty() {
                return Err(ConfigError::Invalid("empty prefix literal".into()));
            }
            for pat in &rule.patterns {
                Regex::new(pat).map_err(|e| {
                    ConfigError::Invalid(format!("bad pattern '{}' under '{}': {}", pat, rule.prefix, e))
                })?;
            }
        }
        Ok(())
    }

    /// Compile the taxonomy once at startup; read-only afterwards.
    pub fn taxonomy(&self) -> Result<Taxonomy, ConfigError> {
        Taxonomy::compile(&self.naming.prefix_rules)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            naming: NamingRules {
                prefix_rules: default_prefix_rules(),
                original_folder_name: NamingRules::default_original_folder(),
                procedural_folder_name: NamingRules::default_procedural_folder(),
            },
            extraction: ExtractionSettings::default(),
            templates: Templates::built_in(),
        }
    }
}

fn default_prefix_rules() -> Vec<PrefixRule> {
    let rule = |prefix: &str, patterns: &[&str]| PrefixRule {
        prefix: prefix.to_string(),
        patterns: patterns.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        rule(
            "7_제출증거_",
            &[
                r"갑\d+",
                r"을\d+",
                "증인신문조서",
                "녹취서",
                "신문사항",
                "사실조회 회신",
                "사실조회회신",
            ],
        ),
        rule(
            "8_제출서면_",
            &[
                "항소장",
                "소장",
                "답변서",
                "준비서면",
                "신청서",
                "변론조서",
                "기일변경신청서",
                "항소이유서",
                "판결선고조서",
            ],
        ),
        rule("9_판결_", &["판결문"]),
        rule("1_기본정보_", &[]),
    ]
}

impl Templates {
    /// Built-in Korean metadata templates, used when the config omits them.
    pub fn built_in() -> Templates {
        Templates {
            evidence: TemplateSet {
                metadata_template: "\
# {filename}

- 원본문서: {original_file_name}
- 원본경로: {original_file_path}
- 증거번호: {evidence_type}
- 제출자: {submitter}
- 추출일시: {extraction_date}
- 페이지수: {page_count}"
                    .to_string(),
            },
            submission: TemplateSet {
                metadata_template: "\
# {filename}

- 원본문서: {original_file_name}
- 원본경로: {original_file_path}
- 제출일자: {date}
- 서면종류: {document_type}
- 제출자: {submitter}
- 추출일시: {extraction_date}
- 페이지수: {page_count}"
                    .to_string(),
            },
            judgment: TemplateSet {
                metadata_template: "\
# {filename}

- 원본문서: {original_file_name}
- 원본경로: {original_file_path}
- 선고일자: {date}
- 추출일시: {extraction_date}
- 페이지수: {page_count}"
                    .to_string(),
            },
            default: TemplateSet {
                metadata_template: "\
# {filename}

- 원본문서: {original_file_name}
- 원본경로: {original_file_path}
- 추출일시: {extraction_date}
- 페이지수: {page_count}"
                    .to_string(),
            },
        }
    }
}

/// Compiled prefix taxonomy. Pattern strings are kept next to their compiled
/// form because some recognizers test for literal mentions inside the rule
/// list rather than matching the filename.
#[derive(Debug)]
pub struct Taxonomy {
    rules: Vec<CompiledRule>,
}

#[derive(Debug)]
struct CompiledRule {
    prefix: String,
    sources: Vec<String>,
    patterns: Vec<Regex>,
}

impl Taxonomy {
    fn compile(rules: &[PrefixRule]) -> Result<Taxonomy, ConfigError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut patterns = Vec::with_capacity(rule.patterns.len());
            for pat in &rule.patterns {
                // ASCII tokens match case-insensitively; Hangul is unaffected.
                let re = Regex::new(&format!("(?i){}", pat)).map_err(|e| {
                    ConfigError::Invalid(format!("bad pattern '{}' under '{}': {}", pat, rule.prefix, e))
                })?;
                patterns.push(re);
            }
            compiled.push(CompiledRule {
                prefix: rule.prefix.clone(),
                sources: rule.patterns.clone(),
                patterns,
            });
        }
        Ok(Taxonomy { rules: compiled })
    }

    /// Iterate rules in configured order as (prefix, compiled patterns).
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Regex])> {
        self.rules.iter().map(|r| (r.prefix.as_str(), r.patterns.as_slice()))
    }

    /// Does any pattern under `prefix` match the given name?
    pub fn matches(&self, prefix: &str, name: &str) -> bool {
        self.rules
            .iter()
            .filter(|r| r.prefix == prefix)
            .any(|r| r.patterns.iter().any(|p| p.is_match(name)))
    }

    /// Does any pattern string under `prefix` mention the literal?
    pub fn mentions(&self, prefix: &str, literal: &str) -> bool {
        self.rules
            .iter()
            .filter(|r| r.prefix == prefix)
            .any(|r| r.sources.iter().any(|s| s.contains(literal)))
    }

    /// Raw pattern sources under a prefix, for recognizers that need them.
    pub fn sources<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.prefix == prefix)
            .flat_map(|r| r.sources.iter().map(|s| s.as_str()))
    }

    /// Compiled patterns under a prefix.
    pub fn patterns<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Regex> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.prefix == prefix)
            .flat_map(|r| r.patterns.iter())
    }
}

/// Prefix literals the rest of the crate keys on.
pub const EVIDENCE_PREFIX: &str = "7_제출증거_";
pub const SUBMISSION_PREFIX: &str = "8_제출서면_";
pub const JUDGMENT_PREFIX: &str = "9_판결_";
pub const DEFAULT_PREFIX: &str = "1_기본정보_";
