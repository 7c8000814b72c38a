use crate::model::Labels;

///
/// Page
///
/// Pagination window applied after ordering.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

///
/// ListOptions
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListOptions {
    /// Project `COUNT(*)` instead of the columns.
    pub count: bool,
    /// Every label must match (AND).
    pub labels: Labels,
    pub page: Option<Page>,
    /// 1-based field positions, in priority order.
    pub sort: Vec<usize>,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.page = Some(Page { limit, offset });
        self
    }

    #[must_use]
    pub fn sort(mut self, position: usize) -> Self {
        self.sort.push(position);
        self
    }
}
