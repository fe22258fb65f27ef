//! Source location information attached to IR nodes.

use smol_str::SmolStr;

/// Source position of a node in the original input: file, line, column.
///
/// Lines and columns are 1-based; `0` means "unknown", which is how
/// positions lost during manipulation are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeInfo {
    pub file: SmolStr,
    pub line: u32,
    pub column: u32,
}

impl CodeInfo {
    pub fn new(file: impl Into<SmolStr>, line: u32, column: u32) -> Self {
        Self { file: file.into(), line, column }
    }
}

impl std::fmt::Display for CodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
