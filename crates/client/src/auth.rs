use api_types::auth::{LoginRequest, LoginResponse, RegisterRequest};
use reqwest::Method;

use crate::{
    Client,
    error::{ClientError, Message, Result, decode, ensure_success},
    session::Session,
    transport::RequestOptions,
};

const LOGIN_FAILED: &str = "Erro ao fazer login";
const REGISTER_FAILED: &str = "Erro ao registrar";
const MIN_PASSWORD_LEN: usize = 6;

/// Login, registration and logout.
pub struct Auth<'a> {
    client: &'a Client,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Opens a session. Cached data of any previous session is dropped.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let options = RequestOptions::new().json(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let res = self
            .client
            .transport()
            .request(Method::POST, &["auth", "login"], options)
            .await?;
        let res = ensure_success(res, LOGIN_FAILED, Message::FromBody).await?;
        let session = Session::from(decode::<LoginResponse>(res).await?);

        self.client.cache().clear();
        self.client.session().set(session.clone());
        tracing::info!(user_id = %session.user_id, "logged in");
        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        validate_registration(&request)?;

        let res = self
            .client
            .transport()
            .request(
                Method::POST,
                &["auth", "register"],
                RequestOptions::new().json(&request)?,
            )
            .await?;
        ensure_success(res, REGISTER_FAILED, Message::FromBody).await?;
        tracing::info!(email = %request.email, "registered");
        Ok(())
    }

    /// Forgets the session and every cached query. Purely local.
    pub fn logout(&self) -> Option<Session> {
        self.client.cache().clear();
        let session = self.client.session().clear();
        if let Some(session) = &session {
            tracing::info!(user_id = %session.user_id, "logged out");
        }
        session
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<()> {
    if request.name.is_empty() {
        return Err(ClientError::Invalid("Nome obrigatório".to_string()));
    }
    let valid_email = request
        .email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(ClientError::Invalid("Email inválido".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Invalid("Mínimo 6 caracteres".to_string()));
    }
    Ok(())
}
