use std::sync::Arc;

use api_types::metadata::Metadata;
use query_cache::QueryKey;
use reqwest::Method;

use crate::{
    Client,
    error::{Message, Result, decode, ensure_success},
    transport::RequestOptions,
};

pub const METADATA: &str = "metadata";

pub fn metadata_key() -> QueryKey {
    QueryKey::new(METADATA)
}

pub struct MetadataQuery<'a> {
    client: &'a Client,
}

impl<'a> MetadataQuery<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Arc<Metadata>> {
        self.client
            .query(metadata_key(), |transport| async move {
                let res = transport
                    .request(Method::GET, &["metadata"], RequestOptions::new())
                    .await?;
                let res = ensure_success(res, "Erro ao buscar metadados", Message::Fixed).await?;
                decode(res).await
            })
            .await
    }
}
