use std::fmt;
use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};
use serde::Serialize;

/// What happened to a path. Carried for reporting only; every kind triggers the same rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// A single filesystem change under the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Split a raw notify event into per-path change events.
///
/// Metadata-only modifications and access events produce nothing: the compiler
/// reading every template would otherwise bump access times and retrigger itself.
pub fn classify(event: notify::Event) -> Vec<ChangeEvent> {
    let notify::Event { kind, paths, .. } = event;

    match kind {
        EventKind::Create(_) => with_kind(paths, ChangeKind::Created),
        EventKind::Remove(_) => with_kind(paths, ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            with_kind(paths, ChangeKind::Deleted)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            with_kind(paths, ChangeKind::Created)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // notify orders the paths as [from, to]
            let mut out = Vec::with_capacity(paths.len());
            let mut iter = paths.into_iter();
            if let Some(from) = iter.next() {
                out.push(ChangeEvent::new(from, ChangeKind::Deleted));
            }
            out.extend(iter.map(|to| ChangeEvent::new(to, ChangeKind::Created)));
            out
        }
        EventKind::Modify(_) => with_kind(paths, ChangeKind::Modified),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn with_kind(paths: Vec<PathBuf>, kind: ChangeKind) -> Vec<ChangeEvent> {
    paths
        .into_iter()
        .map(|path| ChangeEvent { path, kind })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    fn raw(kind: EventKind, paths: &[&str]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |ev, p| ev.add_path(PathBuf::from(*p)))
    }

    #[test]
    fn test_create_modify_remove_map_to_kinds() {
        let created = classify(raw(EventKind::Create(CreateKind::File), &["t/a.handlebars"]));
        assert_eq!(
            created,
            vec![ChangeEvent::new("t/a.handlebars", ChangeKind::Created)]
        );

        let modified = classify(raw(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["t/a.handlebars"],
        ));
        assert_eq!(
            modified,
            vec![ChangeEvent::new("t/a.handlebars", ChangeKind::Modified)]
        );

        let deleted = classify(raw(EventKind::Remove(RemoveKind::File), &["t/a.handlebars"]));
        assert_eq!(
            deleted,
            vec![ChangeEvent::new("t/a.handlebars", ChangeKind::Deleted)]
        );
    }

    #[test]
    fn test_metadata_and_access_are_dropped() {
        assert!(classify(raw(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)),
            &["t/a.handlebars"],
        ))
        .is_empty());
        assert!(classify(raw(
            EventKind::Access(AccessKind::Read),
            &["t/a.handlebars"],
        ))
        .is_empty());
    }

    #[test]
    fn test_rename_both_yields_delete_then_create() {
        let events = classify(raw(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["t/old.handlebars", "t/new.handlebars"],
        ));
        assert_eq!(
            events,
            vec![
                ChangeEvent::new("t/old.handlebars", ChangeKind::Deleted),
                ChangeEvent::new("t/new.handlebars", ChangeKind::Created),
            ]
        );
    }

    #[test]
    fn test_one_event_per_path() {
        let events = classify(raw(
            EventKind::Create(CreateKind::Any),
            &["t/a.handlebars", "t/b.handlebars", "t/c.md"],
        ));
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.kind == ChangeKind::Created));
    }
}
