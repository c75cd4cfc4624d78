use reqwest::Method;
use tracing::info;

use hackhub_types::api::{AuthResponse, LoginRequest, RegisterRequest};
use hackhub_types::models::User;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

impl ApiClient {
    /// The signed-in user restored from disk. No request is made; a stale
    /// token is discovered by the first call that answers 401.
    pub fn current_user(&self) -> Option<User> {
        self.session().user()
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let response: AuthResponse = self
            .send_json(
                Method::POST,
                "/auth/login",
                &LoginRequest {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        self.start_session(response)
    }

    pub async fn register(&self, req: &RegisterRequest) -> ClientResult<User> {
        if !req.email.contains('@') {
            return Err(ClientError::Validation(
                "A valid email address is required".into(),
            ));
        }
        if req.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".into()));
        }
        if req.password.len() < 8 {
            return Err(ClientError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }
        let response: AuthResponse = self.send_json(Method::POST, "/auth/register", req).await?;
        self.start_session(response)
    }

    /// Fetch the current user and refresh the cached copy.
    pub async fn me(&self) -> ClientResult<User> {
        let user: User = self.get("/auth/me").await?;
        self.session().update_user(user.clone())?;
        Ok(user)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session().clear_session()
    }

    fn start_session(&self, response: AuthResponse) -> ClientResult<User> {
        let user = response.user.clone();
        self.session().set_session(Session {
            token: response.token,
            user: response.user,
        })?;
        info!("Signed in as {}", user.email);
        Ok(user)
    }
}
