use reqwest::Method;
use uuid::Uuid;

use hackhub_types::api::{
    CreateSubmissionRequest, MAX_SCORE, ScoreRequest, UpdateSubmissionRequest,
};
use hackhub_types::models::ProjectSubmission;
use hackhub_types::validate;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    pub async fn list_submissions(&self, hackathon_id: Uuid) -> ClientResult<Vec<ProjectSubmission>> {
        self.get(&format!("/submissions/hackathons/{hackathon_id}"))
            .await
    }

    pub async fn get_submission(&self, id: Uuid) -> ClientResult<ProjectSubmission> {
        self.get(&format!("/submissions/{id}")).await
    }

    pub async fn submit_project(
        &self,
        hackathon_id: Uuid,
        req: &CreateSubmissionRequest,
    ) -> ClientResult<ProjectSubmission> {
        validate_submission(req)?;
        self.send_json(
            Method::POST,
            &format!("/submissions/hackathons/{hackathon_id}"),
            req,
        )
        .await
    }

    pub async fn update_submission(
        &self,
        id: Uuid,
        req: &UpdateSubmissionRequest,
    ) -> ClientResult<ProjectSubmission> {
        if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ClientError::Validation("Project title is required".into()));
        }
        if let Some(url) = &req.github_url {
            validate::project_url("github_url", url).map_err(ClientError::Validation)?;
        }
        if let Some(url) = req.demo_url.as_deref().filter(|u| !u.trim().is_empty()) {
            validate::project_url("demo_url", url).map_err(ClientError::Validation)?;
        }
        self.send_json(Method::PUT, &format!("/submissions/{id}"), req)
            .await
    }

    pub async fn score_submission(&self, id: Uuid, score: u32) -> ClientResult<ProjectSubmission> {
        if score > MAX_SCORE {
            return Err(ClientError::Validation(format!(
                "Score must be between 0 and {MAX_SCORE}"
            )));
        }
        self.send_json(
            Method::PUT,
            &format!("/submissions/{id}/score"),
            &ScoreRequest { score },
        )
        .await
    }

    /// Close submissions for a hackathon.
    pub async fn finalize_submissions(&self, hackathon_id: Uuid) -> ClientResult<()> {
        self.send_empty(
            Method::POST,
            &format!("/submissions/hackathons/{hackathon_id}/finalize"),
        )
        .await
    }
}

pub fn validate_submission(req: &CreateSubmissionRequest) -> ClientResult<()> {
    if req.title.trim().is_empty() {
        return Err(ClientError::Validation("Project title is required".into()));
    }
    validate::project_url("github_url", &req.github_url).map_err(ClientError::Validation)?;
    if let Some(demo_url) = req.demo_url.as_deref().filter(|u| !u.trim().is_empty()) {
        validate::project_url("demo_url", demo_url).map_err(ClientError::Validation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, github: &str, demo: Option<&str>) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            team_id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            github_url: github.into(),
            demo_url: demo.map(String::from),
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&request("Oxidizer", "https://github.com/x/y", None)).is_ok());
        assert!(
            validate_submission(&request("Oxidizer", "https://github.com/x/y", Some(""))).is_ok()
        );
    }

    #[test]
    fn rejects_blank_title_and_bad_urls() {
        let err = validate_submission(&request("  ", "https://github.com/x/y", None)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(m) if m == "Project title is required"));

        let err = validate_submission(&request("Oxidizer", "not-a-url", None)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(m) if m.starts_with("github_url")));

        let err = validate_submission(&request("Oxidizer", "https://github.com/x/y", Some("demo")))
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(m) if m.starts_with("demo_url")));
    }
}
