use std::path::{Path, PathBuf};

use chatvault_core::RemoteFile;
use time::OffsetDateTime;

/// Archive layout: `<root>/<year>/<month:02>/<day>/<id>-<name>`. Derivation
/// is a pure function of (id, name, created), so a re-run targets the same
/// path and overwrites in place.
pub fn archive_path_for(root: &Path, file: &RemoteFile) -> PathBuf {
    let created =
        OffsetDateTime::from_unix_timestamp(file.created).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    root.join(created.year().to_string())
        .join(format!("{:02}", created.month() as u8))
        .join(created.day().to_string())
        .join(format!("{}-{}", file.id, single_component(&file.name)))
}

// Remote names are untrusted; keep them to one path component.
fn single_component(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
