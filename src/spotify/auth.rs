use reqwest::{Client, header::AUTHORIZATION};
use tokio::time::Instant;

use crate::{
    config::Settings,
    error::{Error, Result},
    spotify::request::{
        Endpoints, RequestContext, RequestPolicy, build_http_client, decode, excerpt, execute,
    },
    types::{AccessToken, TokenResponse},
    utils,
};

/// Identifier and secret of the registered Spotify application.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Exchanges the application credentials for a bearer token using the
/// client-credentials grant.
///
/// The credentials travel in the `Authorization: Basic` header, the form body
/// only carries `grant_type`. Transient failures of the accounts service are
/// retried like every other request; a rejected exchange or a response without
/// `access_token` is an [`Error::Authentication`] and is never retried.
pub async fn request_access_token(
    http: &Client,
    endpoints: &Endpoints,
    credentials: &Credentials,
    policy: &RequestPolicy,
    deadline: Option<Instant>,
) -> Result<AccessToken> {
    let url = endpoints.token_url.as_str();
    let basic = utils::basic_auth_header(&credentials.client_id, &credentials.client_secret);

    let response = execute(policy, deadline, url, || {
        http.post(url)
            .header(AUTHORIZATION, basic.as_str())
            .form(&[("grant_type", "client_credentials")])
    })
    .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Authentication(format!(
            "token endpoint answered {}: {}",
            status,
            excerpt(&body)
        )));
    }

    let token: TokenResponse = decode(response, url)
        .await
        .map_err(|e| Error::Authentication(e.to_string()))?;

    match token.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(AccessToken::new(
            access_token,
            token.token_type,
            token.expires_in,
        )),
        _ => Err(Error::Authentication(
            "token response did not contain an access_token".to_string(),
        )),
    }
}

/// Builds the HTTP client, authenticates and returns a ready request context.
///
/// When the settings carry a run deadline it starts counting here and covers
/// the token exchange as well as every catalog call made with the context.
pub async fn connect(settings: &Settings, credentials: &Credentials) -> Result<RequestContext> {
    let policy = settings.request_policy();
    let endpoints = settings.endpoints();
    let deadline = settings.deadline.map(|d| Instant::now() + d);

    let http = build_http_client(&policy)?;
    let token = request_access_token(&http, &endpoints, credentials, &policy, deadline).await?;

    Ok(RequestContext::new(http, endpoints, token, policy).with_deadline(deadline))
}
