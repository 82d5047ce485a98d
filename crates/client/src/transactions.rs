use std::sync::Arc;

use api_types::transaction::{
    RawTransaction, RawTransactionPage, RecentTransactions, TransactionNew,
};
use query_cache::QueryKey;
use reqwest::Method;
use rust_decimal::Decimal;

use crate::{
    Client,
    accounts::ACCOUNTS,
    dashboard::DASHBOARD,
    error::{ClientError, Message, Result, decode, ensure_success},
    filter::TransactionFilter,
    normalize::{TransactionRecord, TransactionsPage, normalize, normalize_page},
    transport::RequestOptions,
};

pub const TRANSACTIONS: &str = "transactions";
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

const LIST_FAILED: &str = "fetch error";
const RECENT_FAILED: &str = "Erro ao buscar transações";
const CREATE_FAILED: &str = "Erro ao criar transação";
const DELETE_FAILED: &str = "Erro ao excluir transação";
const MIN_DESCRIPTION_LEN: usize = 3;

pub fn recent_key(limit: u32) -> QueryKey {
    QueryKey::new(TRANSACTIONS).with("recent").with(limit)
}

/// Prefixes marked stale after a transaction is created or deleted.
pub fn affected_by_mutation() -> [QueryKey; 3] {
    [
        QueryKey::new(TRANSACTIONS),
        QueryKey::new(DASHBOARD),
        QueryKey::new(ACCOUNTS),
    ]
}

pub struct Transactions<'a> {
    client: &'a Client,
}

impl<'a> Transactions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// One page of transactions, normalised.
    pub async fn list(&self, filter: &TransactionFilter) -> Result<Arc<TransactionsPage>> {
        let params = filter.query_params();
        let (page, page_size) = (filter.page(), filter.page_size());
        self.client
            .query(filter.query_key(), move |transport| {
                let params = params.clone();
                async move {
                    let res = transport
                        .request(
                            Method::GET,
                            &["transactions"],
                            RequestOptions::new().queries(params),
                        )
                        .await?;
                    let res = ensure_success(res, LIST_FAILED, Message::Fixed).await?;
                    let raw: RawTransactionPage = decode(res).await?;
                    Ok(normalize_page(raw, page, page_size))
                }
            })
            .await
    }

    /// The `limit` most recent transactions.
    pub async fn recent(&self, limit: u32) -> Result<Arc<Vec<TransactionRecord>>> {
        let limit = limit.max(1);
        self.client
            .query(recent_key(limit), move |transport| async move {
                let res = transport
                    .request(
                        Method::GET,
                        &["transactions", "recents"],
                        RequestOptions::new().query("limit", limit),
                    )
                    .await?;
                let res = ensure_success(res, RECENT_FAILED, Message::Fixed).await?;
                let raw: RecentTransactions = decode(res).await?;
                Ok(raw.into_vec().into_iter().map(normalize).collect())
            })
            .await
    }

    /// Creates a transaction. The input is checked before anything is sent.
    ///
    /// A [`ClientError::Decode`] means the server accepted the transaction but
    /// its reply could not be read; retrying would create a duplicate.
    pub async fn create(&self, input: &TransactionNew) -> Result<TransactionRecord> {
        validate(input)?;

        let res = self
            .client
            .transport()
            .request(
                Method::POST,
                &["transactions"],
                RequestOptions::new().json(input)?,
            )
            .await?;
        let res = ensure_success(res, CREATE_FAILED, Message::FromBody).await?;
        self.client.invalidate(&affected_by_mutation());

        let raw: RawTransaction = decode(res).await?;
        Ok(normalize(raw))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let res = self
            .client
            .transport()
            .request(
                Method::DELETE,
                &["transactions", id],
                RequestOptions::new(),
            )
            .await?;
        ensure_success(res, DELETE_FAILED, Message::FromBody).await?;
        self.client.invalidate(&affected_by_mutation());
        Ok(())
    }
}

/// Account, category and payment method are always required; the amount
/// must be positive.
pub fn validate(input: &TransactionNew) -> Result<()> {
    if input.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(ClientError::Invalid(
            "A descrição deve ter pelo menos 3 caracteres".to_string(),
        ));
    }
    if input.amount <= Decimal::ZERO {
        return Err(ClientError::Invalid(
            "O valor deve ser maior que zero".to_string(),
        ));
    }
    if input.account_id.trim().is_empty() {
        return Err(ClientError::Invalid("Selecione uma conta".to_string()));
    }
    if input.category_id.trim().is_empty() {
        return Err(ClientError::Invalid("Selecione uma categoria".to_string()));
    }
    Ok(())
}
