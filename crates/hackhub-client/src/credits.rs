use reqwest::Method;

use hackhub_types::api::{CreditSummary, DepositRequest};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    pub async fn credits(&self) -> ClientResult<CreditSummary> {
        self.get("/credits/me").await
    }

    pub async fn deposit_credits(&self, amount: i64) -> ClientResult<CreditSummary> {
        if amount <= 0 {
            return Err(ClientError::Validation(
                "Deposit amount must be positive".into(),
            ));
        }
        self.send_json(Method::POST, "/credits/deposit", &DepositRequest { amount })
            .await
    }
}
