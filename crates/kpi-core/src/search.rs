use crate::catalog::KpiCatalog;
use crate::kpi::KpiDefinition;

impl KpiCatalog {
    /// Case-insensitive substring search over name, plain name, description,
    /// and tags.
    ///
    /// Results keep catalog order; there is no relevance ranking. A blank
    /// query returns the whole catalog.
    pub fn search(&self, query: &str) -> Vec<&KpiDefinition> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.get_all().iter().collect();
        }
        self.get_all()
            .iter()
            .filter(|k| k.matches_text(&needle))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
