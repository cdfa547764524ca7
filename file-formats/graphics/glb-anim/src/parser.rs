//! Parse options and the bytes-to-animations entry point

use log::debug;

use crate::animation::AnimationSet;
use crate::builder::{Diagnostics, build_animations, build_rest_pose};
use crate::container::Container;
use crate::document::Document;
use crate::error::{ParseWarning, Result};

/// Turns a GLB buffer into an [`AnimationSet`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationParser {
    strict: bool,
}

impl AnimationParser {
    /// Create a lenient parser: warnings are logged and collected
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that fails on the first warning
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Parse a GLB buffer
    pub fn parse(&self, bytes: &[u8]) -> Result<AnimationSet> {
        Ok(self.parse_with_warnings(bytes)?.0)
    }

    /// Parse a GLB buffer and return the warnings raised along the way
    pub fn parse_with_warnings(&self, bytes: &[u8]) -> Result<(AnimationSet, Vec<ParseWarning>)> {
        let container = Container::parse(bytes)?;
        let document = Document::from_json(container.document_text())?;

        let mut diagnostics = Diagnostics::new(self.strict);
        let nodes = build_rest_pose(&document);
        let animations = build_animations(&document, container.blob(), &mut diagnostics)?;
        let set = AnimationSet::new(animations, nodes)?;

        debug!(
            "Parsed {} animations over {} nodes ({} warnings)",
            set.animations().len(),
            set.nodes().len(),
            diagnostics.warnings().len()
        );

        Ok((set, diagnostics.into_warnings()))
    }
}
