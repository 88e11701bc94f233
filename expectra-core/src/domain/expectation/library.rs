// expectra-core/src/domain/expectation/library.rs

use serde::Serialize;

/// Gallery metadata published alongside an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryMetadata {
    pub tags: Vec<String>,
    pub contributors: Vec<String>,
}

impl LibraryMetadata {
    pub fn new(tags: &[&str], contributors: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            contributors: contributors.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.tags.is_empty() && !self.contributors.is_empty()
    }
}
