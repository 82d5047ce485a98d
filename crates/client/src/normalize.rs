use std::fmt;

use api_types::{
    NamedRef,
    transaction::{PageMeta, RawTransaction, RawTransactionPage},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Sem categoria";
pub const NO_ACCOUNT: &str = "Sem conta";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// `"income"` in any case is income; everything else, absent included,
    /// is expense.
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(kind) if kind.trim().eq_ignore_ascii_case("income") => Self::Income,
            _ => Self::Expense,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-ready transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub description: String,
    /// Always non-negative; the sign lives in `kind`.
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub date: String,
    pub account: String,
}

impl TransactionRecord {
    /// Maps the record back into the wire shape it was read from.
    pub fn to_raw(&self) -> RawTransaction {
        RawTransaction {
            id: self.id.clone(),
            description: self.description.clone(),
            amount: self.amount,
            kind: Some(self.kind.as_str().to_string()),
            category: Some(NamedRef::new(self.category.clone())),
            account: Some(NamedRef::new(self.account.clone())),
            date: self.date.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsPage {
    pub items: Vec<TransactionRecord>,
    pub meta: PageMeta,
}

fn display_name(named: Option<NamedRef>, fallback: &str) -> String {
    named
        .and_then(|named| named.name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn normalize(raw: RawTransaction) -> TransactionRecord {
    TransactionRecord {
        kind: TransactionKind::classify(raw.kind.as_deref()),
        category: display_name(raw.category, UNCATEGORIZED),
        account: display_name(raw.account, NO_ACCOUNT),
        amount: raw.amount.abs(),
        id: raw.id,
        description: raw.description,
        date: raw.date,
    }
}

/// Normalises every item; `meta` falls back to a single page holding exactly
/// the returned items.
pub fn normalize_page(raw: RawTransactionPage, page: u32, page_size: u32) -> TransactionsPage {
    let items: Vec<_> = raw.data.into_iter().map(normalize).collect();
    let meta = raw.meta.unwrap_or_else(|| PageMeta {
        page,
        page_size,
        total: items.len() as u64,
        total_pages: 1,
    });
    TransactionsPage { items, meta }
}
