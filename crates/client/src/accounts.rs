use api_types::account::{Account, AccountInput};
use query_cache::QueryKey;
use reqwest::Method;
use std::sync::Arc;

use crate::{
    Client,
    error::{Message, Result, decode, ensure_success},
    transport::RequestOptions,
};

pub const ACCOUNTS: &str = "accounts";

pub fn accounts_key() -> QueryKey {
    QueryKey::new(ACCOUNTS)
}

pub struct Accounts<'a> {
    client: &'a Client,
}

impl<'a> Accounts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Arc<Vec<Account>>> {
        self.client
            .query(accounts_key(), |transport| async move {
                let res = transport
                    .request(Method::GET, &["accounts"], RequestOptions::new())
                    .await?;
                let res = ensure_success(res, "Erro ao buscar contas", Message::Fixed).await?;
                decode(res).await
            })
            .await
    }

    /// A [`ClientError::Decode`](crate::ClientError::Decode) here means the account exists but the reply was unreadable.
    pub async fn create(&self, input: &AccountInput) -> Result<Account> {
        let res = self
            .client
            .transport()
            .request(Method::POST, &["accounts"], RequestOptions::new().json(input)?)
            .await?;
        let res = ensure_success(res, "Erro ao criar conta", Message::FromBody).await?;
        self.client.invalidate(&[accounts_key()]);
        decode(res).await
    }

    pub async fn update(&self, id: &str, input: &AccountInput) -> Result<Account> {
        let res = self
            .client
            .transport()
            .request(
                Method::PUT,
                &["accounts", id],
                RequestOptions::new().json(input)?,
            )
            .await?;
        let res = ensure_success(res, "Erro ao atualizar conta", Message::FromBody).await?;
        self.client.invalidate(&[accounts_key()]);
        decode(res).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let res = self
            .client
            .transport()
            .request(
                Method::DELETE,
                &["accounts", id],
                RequestOptions::new(),
            )
            .await?;
        ensure_success(res, "Erro ao excluir conta", Message::FromBody).await?;
        self.client.invalidate(&[accounts_key()]);
        Ok(())
    }
}
