use std::path::Path;

/// Extension used when nothing else is configured.
pub const DEFAULT_EXTENSION: &str = "handlebars";

/// Accepts paths whose final extension equals the template extension.
///
/// The comparison is exact and case-sensitive: `a.handlebars` passes,
/// `a.Handlebars`, `a.handlebars.bak` and `handlebars` (no extension) do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFilter {
    extension: String,
}

impl TemplateFilter {
    /// Build a filter for `extension`; a leading dot is accepted and stripped.
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }
}

impl Default for TemplateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}
