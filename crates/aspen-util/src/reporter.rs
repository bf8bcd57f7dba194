//! Located diagnostics and the sink that accumulates them.

use thiserror::Error;

use crate::source;

/// A single located diagnostic record.
///
/// This is also the payload of the parser's and the type checker's
/// non-local error transfers: both bail out of the construct they are
/// working on with `Err(ErrorData)` and the enclosing statement loop
/// records it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct ErrorData {
    pub line: u32,
    pub col: u32,
    pub message: String,
}

impl ErrorData {
    pub fn new(line: u32, col: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            message: message.into(),
        }
    }
}

/// Accumulates diagnostics against one source buffer.
///
/// Every pipeline stage records into the same reporter; the driver renders
/// whatever accumulated once a stage finishes and halts the pipeline.
pub struct Reporter<'src> {
    source: &'src [char],
    data: Vec<ErrorData>,
}

impl<'src> Reporter<'src> {
    pub fn new(source: &'src [char]) -> Self {
        Self {
            source,
            data: Vec::new(),
        }
    }

    /// Appends a located diagnostic.
    pub fn push(&mut self, line: u32, col: u32, message: impl Into<String>) {
        self.data.push(ErrorData::new(line, col, message));
    }

    /// Appends an already-built record.
    pub fn report(&mut self, data: ErrorData) {
        self.data.push(data);
    }

    pub fn had_error(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn errors(&self) -> &[ErrorData] {
        &self.data
    }

    /// Renders every record in the caret-excerpt format, separated by a
    /// blank line.
    pub fn render(&self) -> String {
        let rendered: Vec<String> = self
            .data
            .iter()
            .map(|datum| source::render(self.source, &datum.message, datum.line, datum.col))
            .collect();
        rendered.join("\n")
    }
}
