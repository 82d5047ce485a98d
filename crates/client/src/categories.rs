use std::sync::Arc;

use api_types::category::{Category, CategoryInput, CategoryType};
use query_cache::QueryKey;
use reqwest::Method;

use crate::{
    Client,
    error::{Message, Result, decode, ensure_success},
    transport::RequestOptions,
};

pub const CATEGORIES: &str = "categories";

/// `("categories", "INCOME" | "EXPENSE" | "all")`.
pub fn categories_key(kind: Option<CategoryType>) -> QueryKey {
    QueryKey::new(CATEGORIES).with(kind.map_or("all", CategoryType::as_str))
}

pub struct Categories<'a> {
    client: &'a Client,
}

impl<'a> Categories<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, kind: Option<CategoryType>) -> Result<Arc<Vec<Category>>> {
        self.client
            .query(categories_key(kind), move |transport| async move {
                let mut options = RequestOptions::new();
                if let Some(kind) = kind {
                    options = options.query("type", kind.as_str());
                }
                let res = transport
                    .request(Method::GET, &["categories"], options)
                    .await?;
                let res =
                    ensure_success(res, "Erro ao buscar categorias", Message::Fixed).await?;
                decode(res).await
            })
            .await
    }

    /// A [`ClientError::Decode`](crate::ClientError::Decode) here means the category exists but the reply was unreadable.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category> {
        let res = self
            .client
            .transport()
            .request(
                Method::POST,
                &["categories"],
                RequestOptions::new().json(input)?,
            )
            .await?;
        let res = ensure_success(res, "Erro ao criar categoria", Message::FromBody).await?;
        self.client.invalidate(&[QueryKey::new(CATEGORIES)]);
        decode(res).await
    }

    pub async fn update(&self, id: &str, input: &CategoryInput) -> Result<Category> {
        let res = self
            .client
            .transport()
            .request(
                Method::PUT,
                &["categories", id],
                RequestOptions::new().json(input)?,
            )
            .await?;
        let res = ensure_success(res, "Erro ao atualizar categoria", Message::FromBody).await?;
        self.client.invalidate(&[QueryKey::new(CATEGORIES)]);
        decode(res).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let res = self
            .client
            .transport()
            .request(
                Method::DELETE,
                &["categories", id],
                RequestOptions::new(),
            )
            .await?;
        ensure_success(res, "Erro ao excluir categoria", Message::FromBody).await?;
        self.client.invalidate(&[QueryKey::new(CATEGORIES)]);
        Ok(())
    }
}
