//! Source locations.
//!
//! A [`Span`] is a byte range inside one file of the [`SourceMap`]. Spans are
//! what every diagnostic points at; the map turns them into `path:line:col`.

use std::fmt;

use crate::FileId;

/// Byte range in a source file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for synthesized nodes with no source text.
    pub const DUMMY: Span = Span {
        file: FileId::INVALID,
        start: 0,
        end: 0,
    };

    /// Create a new span.
    #[inline]
    pub const fn new(file: FileId, start: u32, end: u32) -> Self {
        Span { file, start, end }
    }

    /// Check whether this span was synthesized.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        !self.file.is_valid()
    }

    /// Length in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Merge two spans of the same file.
    ///
    /// Spans from different files keep `self` unchanged.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        if self.file != other.file {
            return self;
        }
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "Span::DUMMY")
        } else {
            write!(f, "{}:{}..{}", self.file.raw(), self.start, self.end)
        }
    }
}

/// One source file with a precomputed line table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Create a file and index its line starts.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(offset + 1).unwrap_or(u32::MAX));
            }
        }
        SourceFile {
            path: path.into(),
            text,
            line_starts,
        }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_idx).copied().unwrap_or(0);
        let line = u32::try_from(line_idx + 1).unwrap_or(u32::MAX);
        (line, offset.saturating_sub(line_start) + 1)
    }
}

/// Resolved `path:line:col` position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub path: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// All source files of the program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its handle.
    pub fn add_file(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId::from_usize(self.files.len());
        self.files.push(SourceFile::new(path, text));
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId::from_usize(i), f))
    }

    /// Resolve the start of a span to a printable position.
    pub fn position(&self, span: Span) -> Option<SourcePosition> {
        let file = self.file(span.file)?;
        let (line, column) = file.line_col(span.start);
        Some(SourcePosition {
            path: file.path.clone(),
            line,
            column,
        })
    }
}

#[cfg(test)]
mod tests;
