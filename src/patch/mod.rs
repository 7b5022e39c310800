//! Splicing generated text into a managed block of a host document.
//!
//! A managed block spans from a begin marker through an end marker. Patching
//! replaces the whole span with the markers, a blank line, the new content, a
//! blank line, and leaves every byte outside the span untouched. Patching twice
//! with the same inputs yields the same document as patching once.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Begin,
    End,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Begin => f.write_str("begin"),
            MarkerKind::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatchError {
    #[error("{kind} marker not found: {marker}")]
    MissingMarker { kind: MarkerKind, marker: String },

    #[error("{0} marker must not be empty")]
    EmptyMarker(MarkerKind),

    #[error("replacement text would form the {0} marker inside the block")]
    MarkerInReplacement(MarkerKind),

    #[error("failed to read document '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write document '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("managed block in '{0}' is out of date")]
    Drift(PathBuf),
}

/// The begin/end sentinel pair delimiting a managed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    begin: String,
    end: String,
}

impl Markers {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new("<!-- BEGIN CONFIG -->", "<!-- END CONFIG -->")
    }
}

/// Result of patching a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Updated,
    Unchanged,
}

/// Replaces the managed block in `document` and returns the new document.
///
/// The first `begin` marker is used, together with the first `end` marker
/// after it. The input is never modified; on error nothing is produced.
pub fn patch(document: &str, begin: &str, end: &str, replacement: &str) -> Result<String, PatchError> {
    if begin.is_empty() {
        return Err(PatchError::EmptyMarker(MarkerKind::Begin));
    }
    if end.is_empty() {
        return Err(PatchError::EmptyMarker(MarkerKind::End));
    }
    // The next pass must find the inserted end marker, not one formed
    // earlier inside the padded replacement.
    let body = format!("\n\n{replacement}\n\n");
    if format!("{body}{end}").find(end) != Some(body.len()) {
        return Err(PatchError::MarkerInReplacement(MarkerKind::End));
    }

    let start = document.find(begin).ok_or_else(|| PatchError::MissingMarker {
        kind: MarkerKind::Begin,
        marker: begin.to_string(),
    })?;
    let after_begin = start + begin.len();
    let stop = document[after_begin..]
        .find(end)
        .map(|offset| after_begin + offset + end.len())
        .ok_or_else(|| PatchError::MissingMarker {
            kind: MarkerKind::End,
            marker: end.to_string(),
        })?;

    let mut out = String::with_capacity(document.len() + body.len());
    out.push_str(&document[..start]);
    out.push_str(begin);
    out.push_str(&body);
    out.push_str(end);
    out.push_str(&document[stop..]);
    Ok(out)
}

/// Patches the document at `path` in place.
///
/// The new document is computed fully in memory first; the file is only
/// rewritten (atomically, via a temporary sibling) if its content changes.
pub fn patch_file(path: impl AsRef<Path>, markers: &Markers, replacement: &str) -> Result<PatchOutcome, PatchError> {
    let path = path.as_ref();
    let current = read_document(path)?;
    let patched = patch(&current, &markers.begin, &markers.end, replacement)?;

    if patched == current {
        debug!(path = %path.display(), "Managed block already up to date");
        return Ok(PatchOutcome::Unchanged);
    }

    write_atomic(path, &patched)?;
    debug!(path = %path.display(), bytes = patched.len(), "Managed block updated");
    Ok(PatchOutcome::Updated)
}

/// Verifies the managed block at `path` already holds `replacement`.
///
/// Fails with [`PatchError::Drift`] if patching would change the file.
pub fn check_file(path: impl AsRef<Path>, markers: &Markers, replacement: &str) -> Result<(), PatchError> {
    let path = path.as_ref();
    let current = read_document(path)?;
    let patched = patch(&current, &markers.begin, &markers.end, replacement)?;

    if patched != current {
        debug!(path = %path.display(), "Managed block drift detected");
        return Err(PatchError::Drift(path.to_path_buf()));
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<String, PatchError> {
    std::fs::read_to_string(path).map_err(|e| PatchError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), PatchError> {
    let write_error = |source: std::io::Error| PatchError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(contents.as_bytes()).map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BEGIN: &str = "<!-- BEGIN CONFIG -->";
    const END: &str = "<!-- END CONFIG -->";

    fn doc(block: &str) -> String {
        format!("# Title\n\nIntro text.\n\n{BEGIN}{block}{END}\n\nFooter\n")
    }

    #[test]
    fn test_patch_replaces_only_the_span() {
        let input = doc("\nstale\n");
        let output = patch(&input, BEGIN, END, "fresh = 1").unwrap();

        assert_eq!(
            output,
            format!("# Title\n\nIntro text.\n\n{BEGIN}\n\nfresh = 1\n\n{END}\n\nFooter\n")
        );
        let prefix = &input[..input.find(BEGIN).unwrap()];
        let suffix = &input[input.find(END).unwrap() + END.len()..];
        assert!(output.starts_with(prefix));
        assert!(output.ends_with(suffix));
    }

    #[test]
    fn test_patch_is_idempotent() {
        let once = patch(&doc("old"), BEGIN, END, "theme = \"light\"").unwrap();
        let twice = patch(&once, BEGIN, END, "theme = \"light\"").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_end_marker() {
        let input = format!("intro\n{BEGIN}\nbody\n");
        let err = patch(&input, BEGIN, END, "x").unwrap_err();
        assert!(matches!(
            err,
            PatchError::MissingMarker { kind: MarkerKind::End, ref marker } if marker == END
        ));
    }

    #[test]
    fn test_missing_begin_marker() {
        let err = patch("no markers here", BEGIN, END, "x").unwrap_err();
        assert!(matches!(err, PatchError::MissingMarker { kind: MarkerKind::Begin, .. }));
    }

    #[test]
    fn test_end_marker_before_begin_is_ignored() {
        let input = format!("{END}\n{BEGIN}\nbody\n");
        let err = patch(&input, BEGIN, END, "x").unwrap_err();
        assert!(matches!(err, PatchError::MissingMarker { kind: MarkerKind::End, .. }));
    }

    #[test]
    fn test_first_pair_used() {
        let input = format!("{BEGIN}a{END} {BEGIN}b{END}");
        let output = patch(&input, BEGIN, END, "x").unwrap();
        assert_eq!(output, format!("{BEGIN}\n\nx\n\n{END} {BEGIN}b{END}"));
    }

    #[test]
    fn test_begin_marker_in_replacement_is_allowed() {
        let input = "pre\n<!-- B -->old<!-- E -->\npost\n";
        let replacement = "mentions <!-- B --> literally";

        let once = patch(input, "<!-- B -->", "<!-- E -->", replacement).unwrap();
        assert_eq!(
            once,
            "pre\n<!-- B -->\n\nmentions <!-- B --> literally\n\n<!-- E -->\npost\n"
        );
        let twice = patch(&once, "<!-- B -->", "<!-- E -->", replacement).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_end_marker_formed_across_padding_rejected() {
        // "x" followed by the blank-line padding would spell the end marker.
        let result = patch("[a]old[b]", "[a]", "x\n\n", "x");
        assert!(matches!(
            result,
            Err(PatchError::MarkerInReplacement(MarkerKind::End))
        ));
    }

    #[test]
    fn test_rejects_empty_markers_and_marker_in_replacement() {
        assert!(matches!(
            patch("x", "", END, "y"),
            Err(PatchError::EmptyMarker(MarkerKind::Begin))
        ));
        assert!(matches!(
            patch(&doc(""), BEGIN, END, &format!("a {END} b")),
            Err(PatchError::MarkerInReplacement(MarkerKind::End))
        ));
    }

    #[test]
    fn test_patch_file_writes_then_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, doc("")).unwrap();
        let markers = Markers::new(BEGIN, END);

        assert_eq!(patch_file(&path, &markers, "a = 1").unwrap(), PatchOutcome::Updated);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(&format!("{BEGIN}\n\na = 1\n\n{END}")));

        assert_eq!(patch_file(&path, &markers, "a = 1").unwrap(), PatchOutcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn test_patch_file_leaves_document_on_missing_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        let original = format!("intro\n{BEGIN}\nbody without end\n");
        std::fs::write(&path, &original).unwrap();

        let result = patch_file(&path, &Markers::new(BEGIN, END), "a = 1");
        assert!(matches!(result, Err(PatchError::MissingMarker { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_check_file_detects_drift() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, doc("\n\nold\n\n")).unwrap();
        let markers = Markers::default();

        assert!(matches!(
            check_file(&path, &markers, "new"),
            Err(PatchError::Drift(_))
        ));
        assert!(check_file(&path, &markers, "old").is_ok());
    }

    #[test]
    fn test_read_error_for_missing_document() {
        let dir = TempDir::new().unwrap();
        let result = patch_file(dir.path().join("missing.md"), &Markers::default(), "x");
        assert!(matches!(result, Err(PatchError::ReadError { .. })));
    }
}
