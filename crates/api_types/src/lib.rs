use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Entity reference embedded in raw records (`{ "name": ... }`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: String,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub user: User,
        pub token: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Account {
        pub id: String,
        pub name: String,
        /// Free-form account type (e.g. `checking`, `savings`, `credit`).
        #[serde(rename = "type", default)]
        pub kind: String,
        #[serde(default)]
        pub balance: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountInput {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
    }
}

pub mod category {
    use super::*;

    /// Category type as sent on the wire (`INCOME` / `EXPENSE`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CategoryType {
        #[serde(alias = "income")]
        Income,
        #[serde(alias = "expense")]
        Expense,
    }

    impl CategoryType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "INCOME",
                Self::Expense => "EXPENSE",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        pub id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryInput {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryType,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Dashboard {
        pub total_balance: Decimal,
        pub monthly_income: Decimal,
        pub monthly_expense: Decimal,
        pub monthly_savings: Decimal,
        #[serde(default)]
        pub monthly_summary: Vec<MonthlySummary>,
        #[serde(default)]
        pub expenses_by_category: Vec<CategoryExpense>,
    }

    /// One bar of the income/expense chart.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlySummary {
        pub name: String,
        pub income: Decimal,
        pub expense: Decimal,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryExpense {
        pub name: String,
        pub value: Decimal,
        #[serde(default)]
        pub color: Option<String>,
    }
}

pub mod metadata {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum PaymentMethod {
        Pix,
        Credito,
        Debito,
        Boleto,
        Dinheiro,
        #[serde(other)]
        Outro,
    }

    impl PaymentMethod {
        pub const ALL: [PaymentMethod; 6] = [
            Self::Pix,
            Self::Credito,
            Self::Debito,
            Self::Boleto,
            Self::Dinheiro,
            Self::Outro,
        ];

        /// Wire name, as the backend expects it.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pix => "PIX",
                Self::Credito => "CREDITO",
                Self::Debito => "DEBITO",
                Self::Boleto => "BOLETO",
                Self::Dinheiro => "DINHEIRO",
                Self::Outro => "OUTRO",
            }
        }

        /// Human-readable label.
        pub fn label(self) -> &'static str {
            match self {
                Self::Pix => "Pix",
                Self::Credito => "Crédito",
                Self::Debito => "Débito",
                Self::Boleto => "Boleto",
                Self::Dinheiro => "Dinheiro",
                Self::Outro => "Outro",
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Metadata {
        #[serde(default)]
        pub payment_methods: Vec<PaymentMethod>,
    }
}

pub mod transaction {
    use super::*;
    use chrono::NaiveDate;

    /// Transaction as the backend returns it.
    ///
    /// Nested references may be missing or `null`; the client normalizes them
    /// into display names.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RawTransaction {
        pub id: String,
        #[serde(default)]
        pub description: String,
        pub amount: Decimal,
        #[serde(rename = "type", default)]
        pub kind: Option<String>,
        #[serde(default)]
        pub category: Option<NamedRef>,
        #[serde(default)]
        pub account: Option<NamedRef>,
        #[serde(default)]
        pub date: String,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageMeta {
        pub page: u32,
        pub page_size: u32,
        pub total: u64,
        pub total_pages: u32,
    }

    /// Response of `GET /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RawTransactionPage {
        #[serde(default)]
        pub data: Vec<RawTransaction>,
        #[serde(default)]
        pub meta: Option<PageMeta>,
    }

    /// Response of `GET /transactions/recents`.
    ///
    /// Older backends return a bare array, newer ones wrap it in `data`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum RecentTransactions {
        List(Vec<RawTransaction>),
        Page { data: Vec<RawTransaction> },
    }

    impl RecentTransactions {
        pub fn into_vec(self) -> Vec<RawTransaction> {
            match self {
                Self::List(items) | Self::Page { data: items } => items,
            }
        }
    }

    /// Wire type of a transaction (`INCOME` / `EXPENSE`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    /// Request body for `POST /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub description: String,
        /// Must be > 0. The type defines the direction.
        #[serde(with = "rust_decimal::serde::float")]
        pub amount: Decimal,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub payment_method: super::metadata::PaymentMethod,
        pub account_id: String,
        pub category_id: String,
        pub date: NaiveDate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_transaction_accepts_null_references() {
        let raw: transaction::RawTransaction = serde_json::from_str(
            r#"{"id":"7","description":"Café","amount":4.5,"type":"EXPENSE","category":null,"date":"2023-04-01"}"#,
        )
        .unwrap();
        assert_eq!(raw.category, None);
        assert_eq!(raw.account, None);
        assert_eq!(raw.amount, Decimal::new(45, 1));
    }

    #[test]
    fn recent_transactions_accepts_both_shapes() {
        let bare: transaction::RecentTransactions =
            serde_json::from_str(r#"[{"id":"1","amount":1}]"#).unwrap();
        let wrapped: transaction::RecentTransactions =
            serde_json::from_str(r#"{"data":[{"id":"1","amount":1}]}"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);
        assert_eq!(wrapped.into_vec().len(), 1);
    }

    #[test]
    fn amounts_accept_strings_and_are_sent_as_numbers() {
        let raw: transaction::RawTransaction =
            serde_json::from_str(r#"{"id":"1","amount":"12.30"}"#).unwrap();
        assert_eq!(raw.amount, Decimal::new(1230, 2));

        let new = transaction::TransactionNew {
            description: "Mercado".to_string(),
            amount: Decimal::new(1230, 2),
            kind: transaction::TransactionType::Expense,
            payment_method: metadata::PaymentMethod::Pix,
            account_id: "a1".to_string(),
            category_id: "c1".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        };
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["amount"], 12.3);
        assert_eq!(json["paymentMethod"], "PIX");
        assert_eq!(json["date"], "2025-01-05");
    }

    #[test]
    fn unknown_payment_method_maps_to_outro() {
        let meta: metadata::Metadata =
            serde_json::from_str(r#"{"paymentMethods":["PIX","CHEQUE"]}"#).unwrap();
        assert_eq!(
            meta.payment_methods,
            vec![metadata::PaymentMethod::Pix, metadata::PaymentMethod::Outro]
        );
    }

    #[test]
    fn category_type_is_uppercase_on_the_wire() {
        let input = category::CategoryInput {
            name: "Salário".to_string(),
            kind: category::CategoryType::Income,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "INCOME");
    }
}
