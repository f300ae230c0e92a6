use std::path::{Path, PathBuf};

/// Identifier for source files used when formatting diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

impl FileId {
    pub const UNKNOWN: Self = FileId(usize::MAX);
}

impl Default for FileId {
    fn default() -> Self {
        FileId::UNKNOWN
    }
}

/// Captured line/column information (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// A single source file plus its precomputed line-start table.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    #[must_use]
    pub fn new(id: FileId, path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            id,
            path,
            source,
            line_starts,
        }
    }

    #[must_use]
    pub fn line_col(&self, offset: usize) -> Option<LineCol> {
        if offset > self.source.len() {
            return None;
        }
        let index = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = *self.line_starts.get(index)?;
        Some(LineCol {
            line: index + 1,
            column: offset.saturating_sub(line_start) + 1,
        })
    }

    #[must_use]
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line.saturating_sub(1))?;
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.source.len());
        self.source.get(start..end)
    }

    /// Exact source slice for a span, or `None` when out of bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.source.get(start..end)
    }
}

/// Collection of source files used by diagnostics.
#[derive(Clone, Debug, Default)]
pub struct FileCache {
    files: Vec<SourceFile>,
}

impl FileCache {
    pub fn add_file(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        let file = SourceFile::new(id, path.into(), source.into());
        self.files.push(file);
        id
    }

    #[must_use]
    pub fn get(&self, file_id: FileId) -> Option<&SourceFile> {
        self.files.get(file_id.0)
    }

    #[must_use]
    pub fn line_col(&self, file_id: FileId, offset: usize) -> Option<LineCol> {
        self.get(file_id)?.line_col(offset)
    }

    #[must_use]
    pub fn path(&self, file_id: FileId) -> Option<&Path> {
        self.get(file_id).map(|file| file.path.as_path())
    }
}

fn compute_line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (offset, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(offset + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let file = SourceFile::new(FileId(0), PathBuf::from("a.cm"), "ab\ncd\n".to_string());
        assert_eq!(file.line_col(0), Some(LineCol { line: 1, column: 1 }));
        assert_eq!(file.line_col(3), Some(LineCol { line: 2, column: 1 }));
        assert_eq!(file.line_col(4), Some(LineCol { line: 2, column: 2 }));
        assert_eq!(file.line_col(99), None);
    }

    #[test]
    fn line_lookup_returns_terminator_inclusive_slice() {
        let file = SourceFile::new(FileId(0), PathBuf::from("a.cm"), "ab\ncd".to_string());
        assert_eq!(file.line(1), Some("ab\n"));
        assert_eq!(file.line(2), Some("cd"));
        assert_eq!(file.line(3), None);
    }

    #[test]
    fn cache_resolves_paths_and_positions() {
        let mut cache = FileCache::default();
        let id = cache.add_file("src/x.cm", "line\n");
        assert_eq!(cache.path(id), Some(Path::new("src/x.cm")));
        assert_eq!(cache.line_col(id, 2), Some(LineCol { line: 1, column: 3 }));
        assert!(cache.get(FileId::UNKNOWN).is_none());
    }
}
