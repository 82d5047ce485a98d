use std::{fmt, str::FromStr};

use query_cache::QueryKey;

use crate::transactions::TRANSACTIONS;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Type filter of the transaction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransactionFilterType {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Wire value; `None` means the parameter is omitted.
    pub fn wire(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Income => Some("INCOME"),
            Self::Expense => Some("EXPENSE"),
        }
    }
}

impl fmt::Display for TransactionFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFilterTypeError(String);

impl fmt::Display for ParseFilterTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown transaction type {:?} (expected all, income or expense)",
            self.0
        )
    }
}

impl std::error::Error for ParseFilterTypeError {}

impl FromStr for TransactionFilterType {
    type Err = ParseFilterTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(ParseFilterTypeError(s.to_string())),
        }
    }
}

/// Parameters of one transaction list page.
///
/// Equal filters always produce equal cache keys. Changing anything but the
/// page sends the page back to 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionFilter {
    page: u32,
    page_size: u32,
    kind: TransactionFilterType,
    search: Option<String>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            kind: TransactionFilterType::All,
            search: None,
        }
    }
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn kind(&self) -> TransactionFilterType {
        self.kind
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Pages below 1 are clamped to 1.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
        }
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: TransactionFilterType) -> Self {
        if kind != self.kind {
            self.kind = kind;
            self.page = 1;
        }
        self
    }

    /// Trims `search`; blank text clears the search.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        let search = Some(search.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
        self
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(TRANSACTIONS)
            .with(self.page)
            .with(self.page_size)
            .with_field("type", self.kind.wire().map(|_| self.kind.as_str()))
            .with_field("search", self.search.as_deref())
    }

    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(kind) = self.kind.wire() {
            params.push(("type".to_string(), kind.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        params
    }
}
