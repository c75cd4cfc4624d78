use hackhub_types::api::UserAnalytics;

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// Dashboard counters for the signed-in user.
    pub async fn my_analytics(&self) -> ClientResult<UserAnalytics> {
        self.get("/users/analytics/me").await
    }
}
