use std::sync::Arc;

use api_types::dashboard::Dashboard;
use query_cache::QueryKey;
use reqwest::Method;

use crate::{
    Client,
    error::{ClientError, Message, Result, decode, ensure_success},
    transport::RequestOptions,
};

pub const DASHBOARD: &str = "dashboard";

pub fn dashboard_key(month: u32, year: i32) -> QueryKey {
    QueryKey::new(DASHBOARD).with(month).with(year)
}

/// Monthly summary. Read-only; refreshed when transactions change.
pub struct DashboardQuery<'a> {
    client: &'a Client,
}

impl<'a> DashboardQuery<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn summary(&self, month: u32, year: i32) -> Result<Arc<Dashboard>> {
        if !(1..=12).contains(&month) {
            return Err(ClientError::Invalid(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }

        self.client
            .query(dashboard_key(month, year), move |transport| async move {
                let options = RequestOptions::new()
                    .query("month", month)
                    .query("year", year);
                let res = transport
                    .request(Method::GET, &["dashboard"], options)
                    .await?;
                let res =
                    ensure_success(res, "Erro ao carregar o dashboard", Message::Fixed).await?;
                decode(res).await
            })
            .await
    }
}
