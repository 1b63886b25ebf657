//! Carrying out a rename plan.
//!
//! A dry run only reports. A commit renames ready entries one at a time,
//! ordering rename chains so that no entry moves onto a file that another
//! entry is about to move away, and staging cycles through a temporary
//! name. Failures stay with their entry; nothing is rolled back.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EntryError;
use crate::fields::FieldMap;
use crate::paths::{is_case_only_change, normalize_path, same_file};
use crate::plan::{EntryStatus, Plan};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    DryRun,
    Commit,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DryRun => "dry_run",
            Self::Commit => "commit",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub mode: Mode,
    /// Maximum number of renames, counted over ready entries in plan order.
    pub limit: Option<usize>,
    pub allow_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Would be renamed by a commit.
    Planned { overwrite: bool },
    Renamed,
    Unchanged,
    SkippedConflict(EntryError),
    SkippedLimit,
    Failed(EntryError),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned { .. } => "planned",
            Self::Renamed => "renamed",
            Self::Unchanged => "unchanged",
            Self::SkippedConflict(_) => "skipped_conflict",
            Self::SkippedLimit => "skipped_limit",
            Self::Failed(_) => "failed",
        }
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Self::SkippedConflict(e) | Self::Failed(e) => Some(e.to_string()),
            Self::SkippedLimit => Some("limit reached".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub index: usize,
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    pub fields: Option<FieldMap>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub planned: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub conflicts: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub mode: Mode,
    pub module: &'static str,
    pub format: String,
    /// One report per plan entry, in plan order.
    pub entries: Vec<EntryReport>,
}

impl Report {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.entries.len(),
            ..Summary::default()
        };
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Planned { .. } => summary.planned += 1,
                Outcome::Renamed => summary.renamed += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::SkippedConflict(_) => summary.conflicts += 1,
                Outcome::SkippedLimit => summary.skipped += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Whether any entry failed or was skipped for a conflict.
    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.outcome, Outcome::Failed(_) | Outcome::SkippedConflict(_)))
    }
}

pub fn execute(plan: &Plan, options: &ExecuteOptions) -> Report {
    let selected = select_within_limit(plan, options.limit);
    let moving: HashSet<PathBuf> = selected
        .iter()
        .map(|&position| normalize_path(&plan.entries[position].source))
        .collect();
    let mut moves = Vec::new();

    let mut entries: Vec<EntryReport> = plan
        .entries
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let outcome = match &entry.status {
                EntryStatus::Failed(e) if e.is_conflict() => Outcome::SkippedConflict(e.clone()),
                EntryStatus::Failed(e) => Outcome::Failed(e.clone()),
                EntryStatus::Unchanged { .. } => Outcome::Unchanged,
                EntryStatus::Ready { .. } if !selected.contains(&position) => Outcome::SkippedLimit,
                EntryStatus::Ready { target, overwrite } => {
                    let overwrite = *overwrite
                        || replaces_unmoved_file(plan, &selected, &moving, &entry.source, target);
                    if options.mode == Mode::Commit {
                        moves.push(Move {
                            position,
                            source: entry.source.clone(),
                            from: entry.source.clone(),
                            to: target.clone(),
                            overwrite,
                        });
                    }
                    Outcome::Planned { overwrite }
                },
            };

            EntryReport {
                index: entry.index,
                source: entry.source.clone(),
                target: entry.target().map(Path::to_path_buf),
                fields: entry.fields.clone(),
                outcome,
            }
        })
        .collect();

    if options.mode == Mode::Commit {
        for (position, result) in commit(moves, options.allow_overwrite) {
            entries[position].outcome = match result {
                Ok(()) => Outcome::Renamed,
                Err(e) => Outcome::Failed(e),
            };
        }
    }

    let report = Report {
        mode: options.mode,
        module: plan.module,
        format: plan.format.clone(),
        entries,
    };

    let summary = report.summary();
    tracing::info!(
        mode = options.mode.as_str(),
        planned = summary.planned,
        renamed = summary.renamed,
        failed = summary.failed,
        conflicts = summary.conflicts,
        skipped = summary.skipped,
        "executed rename plan"
    );

    report
}

/// Positions of the ready entries that fit in `limit`, in plan order.
fn select_within_limit(plan: &Plan, limit: Option<usize>) -> BTreeSet<usize> {
    plan.entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_ready())
        .map(|(position, _)| position)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Whether `target` holds a file that no selected move takes away. The
/// planner counts every ready entry as moving; entries cut by the limit
/// stay put, so a target that was safe in the plan may not be any more.
fn replaces_unmoved_file(
    plan: &Plan,
    selected: &BTreeSet<usize>,
    moving: &HashSet<PathBuf>,
    source: &Path,
    target: &Path,
) -> bool {
    if fs::symlink_metadata(target).is_err() || same_file(source, target) {
        return false;
    }
    if moving.contains(&normalize_path(target)) {
        return false;
    }
    // Same file under another spelling on a directory that folds case.
    !selected
        .iter()
        .any(|&position| same_file(&plan.entries[position].source, target))
}

#[derive(Debug)]
struct Move {
    /// Position in the plan and report.
    position: usize,
    /// Path the file had when planned.
    source: PathBuf,
    /// Where the file is now; differs from `source` once staged.
    from: PathBuf,
    to: PathBuf,
    /// Replacing an existing target was shown in the plan.
    overwrite: bool,
}

impl Move {
    fn is_staged(&self) -> bool {
        self.from != self.source
    }
}

/// Run `moves` sequentially. A move whose target is still the source of
/// another pending move waits for it; when every pending move is waiting
/// the first one is staged under a temporary name to break the cycle. A
/// move whose target is the source of a move that failed is blocked,
/// since that file is still in place.
fn commit(mut moves: Vec<Move>, allow_overwrite: bool) -> Vec<(usize, Result<(), EntryError>)> {
    let mut results = Vec::with_capacity(moves.len());
    let mut pending_sources: HashMap<PathBuf, usize> = moves
        .iter()
        .enumerate()
        .map(|(i, m)| (normalize_path(&m.source), i))
        .collect();
    let mut failed_sources: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut queue: Vec<usize> = (0..moves.len()).collect();

    while !queue.is_empty() {
        let queued = queue.len();
        let mut waiting = Vec::new();

        for i in queue {
            let target = normalize_path(&moves[i].to);
            let key = normalize_path(&moves[i].source);

            if let Some(stuck) = failed_sources.get(&target).cloned() {
                tracing::debug!(
                    from = %moves[i].from.display(),
                    blocker = %stuck.display(),
                    "rename blocked"
                );
                pending_sources.remove(&key);
                failed_sources.insert(key, moves[i].source.clone());
                results.push((moves[i].position, Err(EntryError::Blocked(stuck))));
                continue;
            }

            let blocker = pending_sources.get(&target).copied();
            if blocker.is_some_and(|b| b != i) {
                waiting.push(i);
                continue;
            }

            let result = rename_entry(&moves[i], allow_overwrite);
            pending_sources.remove(&key);
            if result.is_err() && !moves[i].is_staged() {
                failed_sources.insert(key, moves[i].source.clone());
            }
            results.push((moves[i].position, result));
        }

        if !waiting.is_empty() && waiting.len() == queued {
            let i = waiting[0];
            let staged = staging_path(&moves[i].from);
            tracing::debug!(
                from = %moves[i].from.display(),
                staged = %staged.display(),
                "staging rename cycle"
            );

            let key = normalize_path(&moves[i].source);
            pending_sources.remove(&key);
            if let Err(e) = fs::rename(&moves[i].from, &staged) {
                failed_sources.insert(key, moves[i].source.clone());
                results.push((moves[i].position, Err(EntryError::Rename(e.to_string()))));
                waiting.remove(0);
            } else {
                moves[i].from = staged;
            }
        }

        queue = waiting;
    }

    results
}

/// Check the target, then rename. Only a target the plan marked as
/// overwritten may be replaced, and only with `allow_overwrite`.
fn rename_entry(entry: &Move, allow_overwrite: bool) -> Result<(), EntryError> {
    let (from, to) = (&entry.from, &entry.to);

    if fs::symlink_metadata(to).is_ok() && !same_file(from, to) {
        if !entry.overwrite || !allow_overwrite {
            tracing::warn!(target = %to.display(), "refusing to overwrite existing file");
            return Err(EntryError::Overwrite(to.clone()));
        }
        tracing::warn!(target = %to.display(), "overwriting existing file");
    }

    perform_rename(from, to).map_err(|e| {
        tracing::debug!(from = %from.display(), to = %to.display(), error = %e, "rename failed");
        if entry.is_staged() {
            EntryError::Rename(format!("{e} (file left at {})", from.display()))
        } else {
            EntryError::Rename(e)
        }
    })
}

/// Rename one file. A case-only rename on a filesystem that folds case
/// goes through a temporary name, since renaming straight to the new
/// spelling is a no-op there.
fn perform_rename(from: &Path, to: &Path) -> Result<(), String> {
    tracing::debug!(from = %from.display(), to = %to.display(), "renaming");

    if is_case_only_change(from, to) && same_file(from, to) {
        let temp = staging_path(from);
        tracing::debug!(temp = %temp.display(), "case-only rename, using temp");

        fs::rename(from, &temp).map_err(|e| format!("failed to rename to temp: {e}"))?;
        fs::rename(&temp, to).map_err(|e| {
            format!(
                "failed to rename temp to {}: {e} (file left at {})",
                to.display(),
                temp.display()
            )
        })?;
    } else {
        fs::rename(from, to).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// An unused hidden name next to `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pid = std::process::id();

    (0u32..)
        .map(|n| path.with_file_name(format!(".{name}.{pid}.{n}.bulkrename.tmp")))
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
        .unwrap_or_else(|| path.with_file_name(format!(".{name}.{pid}.bulkrename.tmp")))
}
