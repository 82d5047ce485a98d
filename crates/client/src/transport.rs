use reqwest::{
    Method, Response, Url,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;

use crate::{
    error::{ClientError, Result},
    session::SessionStore,
};

/// Per-request options for [`Transport::request`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn queries(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP transport that signs requests with the current session token.
///
/// Non-2xx responses are handed back unchanged; each resource decides how to
/// report them.
#[derive(Clone, Debug)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl Transport {
    pub fn new(http: reqwest::Client, base_url: Url, session: SessionStore) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    /// Appends `path` to the base URL, one percent-encoded segment each.
    ///
    /// A segment never spans more than one level, so ids holding `/`, `?`
    /// or `#` stay inside their own segment.
    fn url(&self, path: &[&str]) -> Result<Url> {
        if let Some(segment) = path
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(ClientError::Invalid(format!(
                "invalid path segment {segment:?}"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("invalid base_url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        options: RequestOptions,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let mut headers = options.headers;
        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        match self.session.token() {
            Some(token) => {
                let mut auth = HeaderValue::try_from(format!("Bearer {token}"))
                    .map_err(|err| ClientError::Config(format!("invalid token: {err}")))?;
                auth.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, auth);
            }
            None => tracing::debug!(path = url.path(), "no session, sending request without token"),
        }

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers);
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        if let Some(body) = options.body {
            req = req.body(body);
        }

        tracing::debug!(%method, path = url.path(), "sending request");
        req.send().await.map_err(ClientError::Network)
    }
}
