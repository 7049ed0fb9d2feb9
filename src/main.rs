use std::path::{Path, PathBuf};

use casefiles::pipeline::{extract_folder, rename_folder};
use casefiles::{check_deps, log_event, Config, DepsResult, VisionClient};

fn main() {
    // Simple CLI flags parsing
    let args: Vec<String> = std::env::args().collect();

    let case_dir = match args.iter().skip(1).find(|a| !a.starts_with("--")) {
        Some(dir) => PathBuf::from(dir),
        None => {
            eprintln!("usage: casefiles <case-folder> [--rename] [--extract] [--evidence=on|off] [--config <path>] [--dpi <n>] [--max-workers <n>] [--max-workers-files <n>] [--move-unchanged=on|off]");
            std::process::exit(1);
        }
    };

    let rename_requested = args.iter().any(|a| a == "--rename");
    let extract_requested = args.iter().any(|a| a == "--extract");
    // Default run covers both stages.
    let (do_rename, do_extract) = if rename_requested || extract_requested {
        (rename_requested, extract_requested)
    } else {
        (true, true)
    };

    // Evidence extraction supports: --evidence, --evidence=on, --evidence=off
    let mut include_evidence = true;
    if let Some(val) = args.iter().find(|a| a.starts_with("--evidence")) {
        if val == "--evidence=off" {
            include_evidence = false;
        }
    }
    let mut move_unchanged = true;
    if let Some(val) = args.iter().find(|a| a.starts_with("--move-unchanged")) {
        if val == "--move-unchanged=off" {
            move_unchanged = false;
        }
    }

    let mut config_path: Option<PathBuf> = None;
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        if let Some(val) = args.get(pos + 1) {
            if !val.starts_with("--") {
                config_path = Some(PathBuf::from(val));
            }
        }
    }

    // 1) Load config, falling back to the embedded defaults.
    let mut config = match &config_path {
        Some(path) => match Config::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log_event(serde_json::json!({
                    "tool": "load_config",
                    "file": path.display().to_string(),
                    "error": e.to_string(),
                    "error_code": 3
                }));
                std::process::exit(3);
            }
        },
        None => Config::default(),
    };

    if let Some(pos) = args.iter().position(|a| a == "--dpi") {
        if let Some(val) = args.get(pos + 1) {
            if let Ok(n) = val.parse::<u32>() {
                config.extraction.dpi = n.max(72);
            }
        }
    }
    if let Some(pos) = args.iter().position(|a| a == "--max-workers") {
        if let Some(val) = args.get(pos + 1) {
            if let Ok(n) = val.parse::<usize>() {
                config.extraction.max_workers_pages = Some(n.max(1));
            }
        }
    }
    if let Some(pos) = args.iter().position(|a| a == "--max-workers-files") {
        if let Some(val) = args.get(pos + 1) {
            if let Ok(n) = val.parse::<usize>() {
                config.extraction.max_workers_files = Some(n.max(1));
            }
        }
    }

    log_event(serde_json::json!({
        "tool": "load_config",
        "file": config_path.as_ref().map(|p| p.display().to_string()),
        "status": "ok",
        "dpi": config.extraction.dpi,
    }));

    if !case_dir.is_dir() {
        log_event(serde_json::json!({
            "tool": "casefiles",
            "case_dir": case_dir.display().to_string(),
            "error": "NotADirectory",
            "error_code": 1
        }));
        std::process::exit(1);
    }

    let mut touched_anything = false;

    // 2) Rename pipeline.
    if do_rename {
        match rename_folder(&case_dir, &config, move_unchanged) {
            Ok(summary) => {
                touched_anything |= summary.did_work();
                log_event(serde_json::json!({
                    "tool": "rename_folder",
                    "case_dir": case_dir.display().to_string(),
                    "renamed": summary.renamed,
                    "prefixed": summary.prefixed,
                    "moved": summary.moved,
                    "skipped": summary.skipped,
                    "errors": summary.errors,
                }));
            }
            Err(e) => {
                log_event(serde_json::json!({
                    "tool": "rename_folder",
                    "case_dir": case_dir.display().to_string(),
                    "error": e.to_string(),
                    "error_code": 1
                }));
                std::process::exit(1);
            }
        }
    }

    // 3) Extraction pipeline.
    if do_extract {
        let deps: DepsResult = check_deps();
        if !deps.ok {
            log_event(serde_json::json!({
                "tool": "check_deps",
                "missing": deps.missing,
                "error_code": 2
            }));
            std::process::exit(2);
        }
        log_event(serde_json::json!({
            "tool": "check_deps",
            "status": "ok",
            "missing": deps.missing
        }));

        let credentials = resolve_credentials_path(&config);
        let detector = match credentials {
            Some(path) => match VisionClient::from_credentials(&path) {
                Ok(client) => client,
                Err(e) => {
                    log_event(serde_json::json!({
                        "tool": "vision_credentials",
                        "file": path.display().to_string(),
                        "error": e.to_string(),
                        "error_code": 1
                    }));
                    std::process::exit(1);
                }
            },
            None => {
                log_event(serde_json::json!({
                    "tool": "vision_credentials",
                    "error": "MissingCredentials: no credentials file configured",
                    "error_code": 1
                }));
                std::process::exit(1);
            }
        };

        match extract_folder(&case_dir, &config, &detector, include_evidence) {
            Ok(summary) => {
                touched_anything |= summary.did_work();
                log_event(serde_json::json!({
                    "tool": "extract_folder",
                    "case_dir": case_dir.display().to_string(),
                    "processed": summary.processed,
                    "failed": summary.failed,
                    "skipped": summary.skipped,
                    "errors": summary.errors,
                }));
            }
            Err(e) => {
                log_event(serde_json::json!({
                    "tool": "extract_folder",
                    "case_dir": case_dir.display().to_string(),
                    "error": e.to_string(),
                    "error_code": 1
                }));
                std::process::exit(1);
            }
        }
    }

    if !touched_anything {
        log_event(serde_json::json!({
            "tool": "casefiles",
            "case_dir": case_dir.display().to_string(),
            "error": "NoFilesProcessed",
            "error_code": 1
        }));
        std::process::exit(1);
    }
}

/// Credentials file lookup: config value, then environment, then the
/// conventional per-user path.
fn resolve_credentials_path(config: &Config) -> Option<PathBuf> {
    if let Some(path) = &config.extraction.credentials_path {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var("GOOGLE_CLOUD_CREDENTIALS") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    std::env::var_os("HOME").map(|home| {
        Path::new(&home)
            .join(".config")
            .join("casefiles")
            .join("credentials.json")
    })
}
