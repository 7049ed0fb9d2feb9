use std::path::{Path, PathBuf};

use thiserror::Error;

const MAX_COLLISION_RETRIES: usize = 10;

#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("cannot allocate unique name for {0} after {MAX_COLLISION_RETRIES} attempts")]
    Exhausted(String),
}

/// Which pass of the rename pipeline produced an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenamePhase {
    Semantic,
    Prefix,
}

/// A single planned rename: created, executed, discarded. Never persisted.
#[derive(Debug, Clone)]
pub struct RenameOp {
    pub source: PathBuf,
    pub proposed: PathBuf,
    pub resolved: PathBuf,
    pub phase: RenamePhase,
}

/// Guarantee a free write target. If `target` exists, a microsecond
/// timestamp is appended before the extension and the path rechecked,
/// bounded to a small constant before giving up.
///
/// Both the rename pipeline and the markdown writer funnel every write
/// through here, immediately before the filesystem operation.
pub fn resolve_collision(target: &Path) -> Result<PathBuf, CollisionError> {
    if !target.exists() {
        return Ok(target.to_path_buf());
    }

    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = target.extension().and_then(|s| s.to_str());
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    for _ in 0..MAX_COLLISION_RETRIES {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%6f");
        let candidate_name = match ext {
            Some(ext) => format!("{}_{}.{}", stem, stamp, ext),
            None => format!("{}_{}", stem, stamp),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(CollisionError::Exhausted(target.display().to_string()))
}

impl RenameOp {
    /// Plan a rename inside one directory, collision-resolving the target.
    pub fn plan(
        dir: &Path,
        old_name: &str,
        new_name: &str,
        phase: RenamePhase,
    ) -> Result<RenameOp, CollisionError> {
        let source = dir.join(old_name);
        let proposed = dir.join(new_name);
        let resolved = if proposed == source {
            proposed.clone()
        } else {
            resolve_collision(&proposed)?
        };
        Ok(RenameOp {
            source,
            proposed,
            resolved,
            phase,
        })
    }

    /// True when executing would change nothing.
    pub fn is_noop(&self) -> bool {
        self.source == self.resolved
    }

    /// Apply the rename. No-ops succeed without touching the filesystem.
    pub fn execute(&self) -> std::io::Result<()> {
        if self.is_noop() {
            return Ok(());
        }
        std::fs::rename(&self.source, &self.resolved)
    }
}
