use reqwest::Method;
use uuid::Uuid;

use hackhub_types::api::{
    CreateRegistrationRequest, RegistrationCheck, UpdateRegistrationStatusRequest,
};
use hackhub_types::models::{
    Hackathon, HackathonRegistration, HackathonStatus, RegistrationStatus, TeamMember,
};
use hackhub_types::validate;

use crate::client::{ApiClient, OnUnauthorized};
use crate::error::{ClientError, ClientResult};

impl ApiClient {
    /// Register for `hackathon`. The team is checked against the hackathon's
    /// size bounds before anything is sent.
    pub async fn register_for_hackathon(
        &self,
        hackathon: &Hackathon,
        team_name: Option<&str>,
        team_members: Vec<TeamMember>,
    ) -> ClientResult<HackathonRegistration> {
        validate::team_size(&hackathon.team_size, team_members.len())
            .map_err(ClientError::Validation)?;
        validate::team_members(&team_members).map_err(ClientError::Validation)?;
        if let Some(team_name) = team_name {
            validate::single_line("Team name", team_name).map_err(ClientError::Validation)?;
        }

        let req = CreateRegistrationRequest {
            hackathon_id: hackathon.id,
            team_name: team_name.map(str::to_string),
            team_members,
        };
        self.send_json(Method::POST, "/register/", &req).await
    }

    pub async fn my_registrations(&self) -> ClientResult<Vec<HackathonRegistration>> {
        self.get("/register/me").await
    }

    pub async fn hackathon_registrations(
        &self,
        hackathon_id: Uuid,
    ) -> ClientResult<Vec<HackathonRegistration>> {
        self.get(&format!("/register/hackathon/{hackathon_id}")).await
    }

    pub async fn update_registration_status(
        &self,
        registration_id: Uuid,
        status: RegistrationStatus,
    ) -> ClientResult<HackathonRegistration> {
        self.send_json(
            Method::PUT,
            &format!("/register/{registration_id}/status"),
            &UpdateRegistrationStatusRequest { status },
        )
        .await
    }

    /// Whether the caller is registered. A 401 here reads as "not
    /// registered" and leaves the session alone.
    pub async fn check_registration(&self, hackathon_id: Uuid) -> ClientResult<RegistrationCheck> {
        let request = self.request(Method::GET, &format!("/register/check/{hackathon_id}"))?;
        match self.execute(request, OnUnauthorized::KeepSession).await {
            Ok(response) => Ok(response.json().await?),
            Err(ClientError::Unauthorized(_)) => Ok(RegistrationCheck::NOT_REGISTERED),
            Err(e) => Err(e),
        }
    }
}

/// The primary button on a hackathon's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    Register,
    Pending,
    Rejected,
    Registered,
    ViewWinners,
}

impl RegistrationAction {
    /// Completed hackathons point at their results; otherwise the caller's
    /// registration state decides.
    pub fn resolve(
        check: &RegistrationCheck,
        hackathon: &Hackathon,
        winners_published: bool,
    ) -> Self {
        if winners_published || hackathon.status == HackathonStatus::Completed {
            return Self::ViewWinners;
        }
        match (check.registered, check.status) {
            (false, _) => Self::Register,
            (true, Some(RegistrationStatus::Approved)) => Self::Registered,
            (true, Some(RegistrationStatus::Rejected)) => Self::Rejected,
            (true, Some(RegistrationStatus::Pending) | None) => Self::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Register => "Register Now",
            Self::Pending => "Pending Approval",
            Self::Rejected => "Registration Rejected",
            Self::Registered => "Registered",
            Self::ViewWinners => "View Winners",
        }
    }

    /// Whether pressing the button does something.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Register | Self::ViewWinners)
    }
}

const CSV_HEADER: [&str; 6] = [
    "Registration ID",
    "Team Name",
    "Members",
    "Member Emails",
    "Status",
    "Registered At",
];

/// Registrations as CSV: a header line, then one line per registration.
/// Every field is quoted and embedded quotes are doubled. Control
/// characters become spaces so each registration stays on its own line.
pub fn registrations_csv(registrations: &[HackathonRegistration]) -> String {
    let mut lines = Vec::with_capacity(registrations.len() + 1);
    lines.push(csv_line(CSV_HEADER.iter().map(|h| h.to_string())));
    for r in registrations {
        let names = r
            .team_members
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let emails = r
            .team_members
            .iter()
            .map(|m| m.email.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        lines.push(csv_line([
            r.id.to_string(),
            r.team_name.clone().unwrap_or_default(),
            names,
            emails,
            r.status.to_string(),
            r.created_at.to_rfc3339(),
        ]));
    }
    lines.join("\n")
}

fn csv_line(fields: impl IntoIterator<Item = String>) -> String {
    fields
        .into_iter()
        .map(|f| {
            let f: String = f
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            format!("\"{}\"", f.replace('"', "\"\""))
        })
        .collect::<Vec<_>>()
        .join(",")
}
