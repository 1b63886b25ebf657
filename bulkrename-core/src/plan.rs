//! Turning an input file list into a rename plan.
//!
//! Planning never touches the filesystem beyond reading: every file is
//! resolved and rendered, then the whole batch is checked for duplicate
//! sources, no-op renames, colliding targets and existing targets.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, EntryError};
use crate::fields::{self, FieldMap};
use crate::modules::FieldModule;
use crate::paths::{is_case_insensitive_dir, normalize_path};
use crate::template::Template;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Cut every rendered file name to at most this many characters.
    pub truncate: Option<usize>,
    /// Size of a dedicated worker pool. `None` uses rayon's global pool.
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Ready { target: PathBuf, overwrite: bool },
    /// The target is the source itself.
    Unchanged { target: PathBuf },
    Failed(EntryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    /// Zero-based position in the input list.
    pub index: usize,
    pub source: PathBuf,
    /// Rendered target, kept even when the entry later failed (collisions).
    pub proposed: Option<PathBuf>,
    /// Resolved fields, present whenever resolution succeeded.
    pub fields: Option<FieldMap>,
    pub status: EntryStatus,
}

impl RenameEntry {
    fn failed(index: usize, source: &Path, error: EntryError) -> Self {
        Self {
            index,
            source: source.to_path_buf(),
            proposed: None,
            fields: None,
            status: EntryStatus::Failed(error),
        }
    }

    pub fn target(&self) -> Option<&Path> {
        match &self.status {
            EntryStatus::Ready { target, .. } | EntryStatus::Unchanged { target } => Some(target),
            EntryStatus::Failed(_) => self.proposed.as_deref(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, EntryStatus::Ready { .. })
    }

    pub fn error(&self) -> Option<&EntryError> {
        match &self.status {
            EntryStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Sources that rendered to the same target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub target: PathBuf,
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub module: &'static str,
    pub format: String,
    /// One entry per input file, in input order.
    pub entries: Vec<RenameEntry>,
    pub collisions: Vec<Collision>,
}

impl Plan {
    pub fn ready(&self) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter().filter(|e| e.is_ready())
    }

    pub fn ready_count(&self) -> usize {
        self.ready().count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error().is_some()).count()
    }
}

/// Reject template fields the module can never provide. Modules whose
/// fields depend on user input are checked per file instead.
pub fn validate_fields(template: &Template, module: &FieldModule) -> Result<(), ConfigError> {
    let descriptor = module.descriptor();
    if descriptor.dynamic_fields {
        return Ok(());
    }

    match template.fields().into_iter().find(|f| !descriptor.provides(f)) {
        Some(field) => Err(ConfigError::UnsupportedField {
            field: field.to_string(),
            module: descriptor.name.to_string(),
            available: descriptor.available_fields().join(", "),
        }),
        None => Ok(()),
    }
}

pub fn build_plan(
    files: &[PathBuf],
    template: &Template,
    module: &FieldModule,
    options: &PlanOptions,
) -> Result<Plan, ConfigError> {
    if files.is_empty() {
        return Err(ConfigError::NoFiles);
    }
    validate_fields(template, module)?;

    // Positions are fixed here, before any file is looked at, so numbering
    // doesn't depend on which files fail or in what order workers finish.
    let mut first_seen: HashMap<PathBuf, usize> = HashMap::new();
    let tickets: Vec<(usize, &Path, Option<usize>)> = files
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let first = *first_seen.entry(normalize_path(source)).or_insert(index);
            (index, source.as_path(), (first != index).then_some(first))
        })
        .collect();

    let work = || {
        tickets
            .par_iter()
            .map(|&(index, source, duplicate_of)| match duplicate_of {
                Some(first) => {
                    RenameEntry::failed(index, source, EntryError::DuplicateSource { first })
                },
                None => plan_entry(index, source, template, module, options.truncate),
            })
            .collect::<Vec<_>>()
    };

    let entries = match options.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?
            .install(work),
        None => work(),
    };

    let mut plan = Plan {
        module: module.name(),
        format: template.as_str().to_string(),
        entries,
        collisions: Vec::new(),
    };

    let mut keys = TargetKeys::default();
    detect_collisions(&mut plan, &mut keys);
    flag_overwrites(&mut plan, &mut keys);

    tracing::info!(
        files = plan.entries.len(),
        ready = plan.ready_count(),
        failed = plan.failed_count(),
        collisions = plan.collisions.len(),
        "built rename plan"
    );

    Ok(plan)
}

fn plan_entry(
    index: usize,
    source: &Path,
    template: &Template,
    module: &FieldModule,
    truncate: Option<usize>,
) -> RenameEntry {
    let fields = match check_source(source).and_then(|()| fields::resolve(source, index, module)) {
        Ok(fields) => fields,
        Err(e) => return RenameEntry::failed(index, source, e),
    };

    let rendered = template.render(&fields).map(|name| match truncate {
        Some(max) => name.chars().take(max).collect(),
        None => name,
    });

    let status = match rendered {
        Ok(name) if name.is_empty() => EntryStatus::Failed(EntryError::EmptyTarget),
        Ok(name) => {
            let target = join_target(source, &name);
            if normalize_path(source) == normalize_path(&target) {
                EntryStatus::Unchanged { target }
            } else {
                EntryStatus::Ready {
                    target,
                    overwrite: false,
                }
            }
        },
        Err(e) => EntryStatus::Failed(e),
    };

    let proposed = match &status {
        EntryStatus::Ready { target, .. } | EntryStatus::Unchanged { target } => {
            Some(target.clone())
        },
        EntryStatus::Failed(_) => None,
    };

    RenameEntry {
        index,
        source: source.to_path_buf(),
        proposed,
        fields: Some(fields),
        status,
    }
}

fn check_source(source: &Path) -> Result<(), EntryError> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(EntryError::NotAFile),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(EntryError::SourceMissing),
        Err(e) => Err(EntryError::Read(e.to_string())),
    }
}

/// Place a rendered name next to its source, unless it is absolute.
fn join_target(source: &Path, rendered: &str) -> PathBuf {
    let rendered = Path::new(rendered);
    if rendered.is_absolute() {
        return rendered.to_path_buf();
    }
    match source.parent() {
        Some(dir) => dir.join(rendered),
        None => rendered.to_path_buf(),
    }
}

/// Comparison keys for targets. On a directory that folds case, `A.txt`
/// and `a.txt` are the same file, so keys there are lowercased.
#[derive(Debug, Default)]
struct TargetKeys {
    folds_case: HashMap<PathBuf, bool>,
}

impl TargetKeys {
    /// `sibling` is an existing file used to test the directory when `path`
    /// itself does not exist yet.
    fn key(&mut self, path: &Path, sibling: &Path) -> PathBuf {
        let normalized = normalize_path(path);
        let dir = normalized
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let folds = *self.folds_case.entry(dir.clone()).or_insert_with(|| {
            if fs::symlink_metadata(path).is_ok() {
                is_case_insensitive_dir(path)
            } else if normalize_path(sibling).parent() == Some(dir.as_path()) {
                is_case_insensitive_dir(sibling)
            } else {
                false
            }
        });

        if folds {
            PathBuf::from(normalized.to_string_lossy().to_lowercase())
        } else {
            normalized
        }
    }
}

/// Any target claimed by more than one distinct source fails every entry
/// that claims it, including an unchanged one.
fn detect_collisions(plan: &mut Plan, keys: &mut TargetKeys) {
    let mut groups: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (position, entry) in plan.entries.iter().enumerate() {
        if let EntryStatus::Ready { target, .. } | EntryStatus::Unchanged { target } = &entry.status
        {
            let key = keys.key(target, &entry.source);
            groups.entry(key).or_default().push(position);
        }
    }

    for members in groups.into_values().filter(|m| m.len() > 1) {
        let sources: Vec<PathBuf> = members
            .iter()
            .map(|&i| plan.entries[i].source.clone())
            .collect();
        let target = plan.entries[members[0]]
            .target()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        tracing::debug!(
            target = %target.display(),
            sources = sources.len(),
            "target collision"
        );

        for &position in &members {
            let entry = &mut plan.entries[position];
            let others = sources
                .iter()
                .filter(|s| **s != entry.source)
                .cloned()
                .collect();
            entry.status = EntryStatus::Failed(EntryError::Collision { others });
        }

        plan.collisions.push(Collision { target, sources });
    }
}

/// Mark ready entries whose target already exists and won't be moved out
/// of the way by another entry of this plan. Execution re-checks the flag
/// once a limit drops some of those moves.
fn flag_overwrites(plan: &mut Plan, keys: &mut TargetKeys) {
    let moving: HashSet<PathBuf> = plan
        .entries
        .iter()
        .filter(|e| e.is_ready())
        .map(|e| keys.key(&e.source, &e.source))
        .collect();

    for entry in &mut plan.entries {
        let EntryStatus::Ready { target, overwrite } = &mut entry.status else {
            continue;
        };
        if fs::symlink_metadata(&*target).is_err() {
            continue;
        }
        if moving.contains(&keys.key(target.as_path(), &entry.source)) {
            continue;
        }

        *overwrite = true;
        tracing::warn!(
            source = %entry.source.display(),
            target = %target.display(),
            "target already exists"
        );
    }
}
