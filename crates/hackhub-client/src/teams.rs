use reqwest::Method;
use uuid::Uuid;

use hackhub_types::api::{AddMemberRequest, CreateTeamRequest, JoinTeamRequest, TeamSummary};
use hackhub_types::models::Team;
use hackhub_types::validate::{self, normalize_team_code};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    pub async fn my_teams(&self) -> ClientResult<Vec<Team>> {
        self.get("/team/my-teams").await
    }

    pub async fn get_team(&self, id: Uuid) -> ClientResult<Team> {
        self.get(&format!("/team/{id}")).await
    }

    pub async fn create_team(&self, name: &str, hackathon_id: Option<Uuid>) -> ClientResult<Team> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Team name is required".into()));
        }
        validate::single_line("Team name", name).map_err(ClientError::Validation)?;
        self.send_json(
            Method::POST,
            "/team/create",
            &CreateTeamRequest {
                name: name.to_string(),
                hackathon_id,
            },
        )
        .await
    }

    pub async fn delete_team(&self, id: Uuid) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("/team/{id}")).await
    }

    pub async fn add_team_member(&self, team_id: Uuid, email: &str) -> ClientResult<Team> {
        self.send_json(
            Method::POST,
            &format!("/team/{team_id}/members"),
            &AddMemberRequest {
                email: email.trim().to_string(),
            },
        )
        .await
    }

    pub async fn team_by_code(&self, code: &str) -> ClientResult<TeamSummary> {
        let code = normalize_team_code(code);
        if code.is_empty() {
            return Err(ClientError::Validation("Enter a team code".into()));
        }
        self.get(&format!("/team/code/{code}")).await
    }

    /// Look the code up, then join. An unknown code stops at the lookup.
    pub async fn join_team(&self, code: &str) -> ClientResult<Team> {
        let summary = self.team_by_code(code).await.map_err(|e| match e {
            ClientError::NotFound(_) => ClientError::NotFound("Team not found".into()),
            other => other,
        })?;
        self.send_json(
            Method::POST,
            "/team/join",
            &JoinTeamRequest { code: summary.code },
        )
        .await
    }
}
