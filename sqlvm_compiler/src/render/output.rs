//! Pass-1 output and region reports

use crate::dialect::Thunk;
use crate::utils::Span;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Placeholder resolved in pass 2; `span` is the producing call
    Thunk { thunk: Thunk, span: Span },
}

/// Rendered text interleaved with unresolved thunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    segments: Vec<Segment>,
}

impl Rendered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(text),
            _ => self.segments.push(Segment::Text(text.to_string())),
        }
    }

    pub fn push_thunk(&mut self, thunk: Thunk, span: Span) {
        self.segments.push(Segment::Thunk { thunk, span });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn thunk_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Thunk { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Pass-1 text with each thunk shown as its marker
    pub fn intermediate_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Thunk { thunk, .. } => thunk.to_string(),
            })
            .collect()
    }
}

/// Summary of one compiled region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionReport {
    /// Opening tag of the region
    pub span: Span,
    /// Program counter after the last statement
    pub final_counter: i64,
    pub labels: BTreeMap<String, i64>,
    pub thunks_resolved: usize,
    /// Jump targets that were not defined and rendered as their name
    pub fallbacks: Vec<String>,
}

impl RegionReport {
    /// Number of `WHEN` branches the region rendered. A region whose last
    /// line ends with a newline has an empty trailing branch, which the
    /// epilogue fills with `0`; it is counted too.
    pub fn instruction_count(&self) -> usize {
        usize::try_from(self.final_counter + 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_text_is_merged() {
        let mut rendered = Rendered::new();
        rendered.push_text("a");
        rendered.push_text("");
        rendered.push_text("b");
        rendered.push_thunk(Thunk::Exit, Span::dummy());
        rendered.push_text("c");

        assert_eq!(rendered.segments().len(), 3);
        assert_eq!(rendered.thunk_count(), 1);
        assert_eq!(rendered.intermediate_text(), "ab{{ _exit_thunk() }}c");
    }

    #[test]
    fn test_instruction_count() {
        let report = RegionReport {
            span: Span::dummy(),
            final_counter: 2,
            labels: BTreeMap::new(),
            thunks_resolved: 0,
            fallbacks: vec![],
        };
        assert_eq!(report.instruction_count(), 3);
        assert_eq!(
            RegionReport { final_counter: -1, ..report }.instruction_count(),
            0
        );
    }
}
