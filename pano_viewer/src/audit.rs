use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Result, ensure};
use pano_hotspot::SceneCatalog;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAsset {
    pub room: String,
    pub path: String,
}

#[derive(Debug, Default, Clone)]
pub struct AuditReport {
    /// Distinct paths the catalog can ask for.
    pub expected: usize,
    pub found: usize,
    pub missing: Vec<MissingAsset>,
    /// Images under the root with the catalog extension that no room uses.
    pub unused: Vec<String>,
}

impl AuditReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn print(&self) {
        println!(
            "[pano_viewer] audit: {} of {} assets present, {} missing, {} unused",
            self.found,
            self.expected,
            self.missing.len(),
            self.unused.len()
        );
        for asset in &self.missing {
            println!("[pano_viewer] missing {} (room {})", asset.path, asset.room);
        }
        for path in &self.unused {
            println!("[pano_viewer] unused {path}");
        }
    }
}

/// Checks every room and furniture combination for its visible and ID image.
pub fn audit_assets(root: &Path, catalog: &SceneCatalog) -> Result<AuditReport> {
    ensure!(
        root.is_dir(),
        "asset root {} is not a directory",
        root.display()
    );
    let present = collect_files(root);

    let mut expected = BTreeSet::new();
    let mut report = AuditReport::default();
    for room in catalog.rooms() {
        for selection in catalog.selections(room) {
            let (visible, reference) = catalog.asset_paths_for(room, &selection);
            for path in [visible, reference] {
                if !expected.insert(path.clone()) {
                    continue;
                }
                if present.contains(&path) {
                    report.found += 1;
                } else {
                    report.missing.push(MissingAsset {
                        room: room.id.clone(),
                        path,
                    });
                }
            }
        }
    }
    report.expected = expected.len();

    let extension = catalog.naming().extension.as_str();
    report.unused = present
        .iter()
        .filter(|path| {
            Path::new(path.as_str())
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .filter(|path| !expected.contains(*path))
        .cloned()
        .collect();
    Ok(report)
}

/// Files under `root` as `/`-separated paths relative to it.
fn collect_files(root: &Path) -> BTreeSet<String> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!(
                    "[pano_viewer] warning: failed to traverse {}: {err}",
                    root.display()
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(key);
    }
    files
}
