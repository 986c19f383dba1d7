use std::ops::Range;

pub type Span = Range<usize>;

// Byte span into the source text plus the 1-based line the span starts on.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    pub span: Span,
    pub line: usize,
}

impl Location {
    pub fn new(span: Span, line: usize) -> Location {
        Location { span, line }
    }
}
