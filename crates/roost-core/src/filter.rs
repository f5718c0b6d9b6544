use serde::{Deserialize, Serialize};

/// A single operator/operand pair of a view query, e.g. `stream:design`
/// or `search:deploy failure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTerm {
    pub operator: String,
    pub operand: String,
}

/// Opaque description of which messages belong to a view.
///
/// The query language itself lives in the owning controller; the list data
/// engine only needs to know whether the view is a search (search views are
/// rendered and anchored differently) and carries the terms around for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    terms: Vec<FilterTerm>,
}

impl Filter {
    pub fn new(terms: Vec<FilterTerm>) -> Self {
        Self { terms }
    }

    /// Filter of the unnarrowed "home" view.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    pub fn is_search(&self) -> bool {
        self.terms.iter().any(|t| t.operator == "search")
    }

    /// All operands for the given operator, in query order.
    pub fn operands(&self, operator: &str) -> Vec<&str> {
        self.terms
            .iter()
            .filter(|t| t.operator == operator)
            .map(|t| t.operand.as_str())
            .collect()
    }
}
