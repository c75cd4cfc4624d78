use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use hackhub_types::api::ErrorBody;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

/// What a 401 means for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnUnauthorized {
    ClearSession,
    KeepSession,
}

/// Typed REST client. Every request carries the stored bearer token, if any.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ClientError::Validation(format!("Invalid server URL '{}': {}", base_url, e)))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self
            .execute(self.request(Method::GET, path)?, OnUnauthorized::ClearSession)
            .await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.execute(request, OnUnauthorized::ClearSession).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        let response = self.execute(request, OnUnauthorized::ClearSession).await?;
        Ok(response.json().await?)
    }

    /// For endpoints that answer with an empty body.
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> ClientResult<()> {
        self.execute(self.request(method, path)?, OnUnauthorized::ClearSession)
            .await?;
        Ok(())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Validation(format!("Invalid request path '{}': {}", path, e)))?;
        Ok(self.http.request(method, url))
    }

    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        on_unauthorized: OnUnauthorized,
    ) -> ClientResult<Response> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.inspect_err(|e| {
            warn!("Request failed: {}", e);
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let message = error_message(response, status).await;
        warn!("{} answered {}: {}", url, status.as_u16(), message);

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                if on_unauthorized == OnUnauthorized::ClearSession {
                    self.session.clear_session()?;
                }
                ClientError::Unauthorized(message)
            }
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// The server's `message`, or the status reason when the body is not an
/// error document.
async fn error_message(response: Response, status: StatusCode) -> String {
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}
