use std::cmp::Ordering;

use reqwest::Method;
use uuid::Uuid;

use hackhub_types::api::{
    CreateHackathonRequest, HackathonQuery, InterestResponse, UpdateHackathonRequest,
};
use hackhub_types::models::{Hackathon, HackathonStatus};

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// Server-side filtered list, latest start first.
    pub async fn list_hackathons(&self, query: &HackathonQuery) -> ClientResult<Vec<Hackathon>> {
        self.get_with_query("/hackathon/all", query).await
    }

    pub async fn get_hackathon(&self, id: Uuid) -> ClientResult<Hackathon> {
        self.get(&format!("/hackathon/view/{id}")).await
    }

    pub async fn create_hackathon(&self, req: &CreateHackathonRequest) -> ClientResult<Hackathon> {
        self.send_json(Method::POST, "/hackathon/create", req).await
    }

    pub async fn update_hackathon(
        &self,
        id: Uuid,
        req: &UpdateHackathonRequest,
    ) -> ClientResult<Hackathon> {
        self.send_json(Method::PUT, &format!("/hackathon/{id}"), req).await
    }

    pub async fn delete_hackathon(&self, id: Uuid) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &format!("/hackathon/{id}")).await
    }

    pub async fn toggle_interest(&self, id: Uuid) -> ClientResult<InterestResponse> {
        self.send_json(Method::POST, &format!("/hackathon/interest/{id}"), &())
            .await
    }

    /// Flip `toggle` immediately, then settle it on the server's answer.
    /// On failure the local flip is undone.
    pub async fn toggle_interest_optimistic(
        &self,
        id: Uuid,
        toggle: &mut InterestToggle,
    ) -> ClientResult<InterestResponse> {
        toggle.toggle();
        match self.toggle_interest(id).await {
            Ok(response) => {
                toggle.sync(response);
                Ok(response)
            }
            Err(e) => {
                toggle.toggle();
                Err(e)
            }
        }
    }
}

/// Filter bar state for the hackathon list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HackathonFilter {
    pub search: String,
    pub status: Option<HackathonStatus>,
    pub tag: Option<String>,
}

impl HackathonFilter {
    pub fn to_query(&self) -> HackathonQuery {
        HackathonQuery {
            status: self.status,
            tag: self.tag.clone().filter(|t| !t.trim().is_empty()),
            search: Some(self.search.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, hackathon: &Hackathon) -> bool {
        self.to_query().matches(hackathon)
    }

    pub fn apply<'a>(&self, hackathons: &'a [Hackathon]) -> Vec<&'a Hackathon> {
        let query = self.to_query();
        hackathons.iter().filter(|h| query.matches(h)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    StartDate,
    Deadline,
    Title,
}

/// Stable sort: soonest first for dates, case-insensitive for titles.
pub fn sort_hackathons(hackathons: &mut [Hackathon], key: SortKey) {
    hackathons.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &Hackathon, b: &Hackathon, key: SortKey) -> Ordering {
    match key {
        SortKey::StartDate => a.start_date.cmp(&b.start_date),
        SortKey::Deadline => a.registration_deadline.cmp(&b.registration_deadline),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// The "mark interested" button: what the user sees, ahead of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestToggle {
    pub interested: bool,
    pub count: u32,
}

impl InterestToggle {
    pub fn new(interested: bool, count: u32) -> Self {
        Self { interested, count }
    }

    pub fn toggle(&mut self) -> Self {
        if self.interested {
            self.count = self.count.saturating_sub(1);
        } else {
            self.count += 1;
        }
        self.interested = !self.interested;
        *self
    }

    /// Adopt the server's view of the count.
    pub fn sync(&mut self, response: InterestResponse) {
        self.interested = response.interested;
        self.count = response.interest_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use hackhub_types::models::TeamSize;

    fn hackathon(title: &str, start_in_days: i64, deadline_in_days: i64, tags: &[&str]) -> Hackathon {
        let now = Utc::now();
        Hackathon {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: title.into(),
            description: format!("{title} weekend"),
            location: "Online".into(),
            start_date: now + Duration::days(start_in_days),
            end_date: now + Duration::days(start_in_days + 2),
            registration_deadline: now + Duration::days(deadline_in_days),
            team_size: TeamSize { min: 1, max: 4 },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            entry_fee: 0,
            prize_pool: String::new(),
            interest_count: 0,
            status: HackathonStatus::Upcoming,
            created_at: now,
        }
    }

    #[test]
    fn toggling_twice_restores_visible_state() {
        let mut toggle = InterestToggle::new(false, 7);
        assert_eq!(toggle.toggle(), InterestToggle::new(true, 8));
        assert_eq!(toggle.toggle(), InterestToggle::new(false, 7));

        let mut zero = InterestToggle::new(true, 0);
        zero.toggle();
        assert_eq!(zero, InterestToggle::new(false, 0));
    }

    #[test]
    fn sync_adopts_server_count() {
        let mut toggle = InterestToggle::new(false, 7);
        toggle.toggle();
        toggle.sync(InterestResponse {
            interested: true,
            interest_count: 12,
        });
        assert_eq!(toggle, InterestToggle::new(true, 12));
    }

    #[test]
    fn filter_searches_titles_descriptions_and_tags() {
        let list = vec![
            hackathon("Rust Rumble", 5, 4, &["rust"]),
            hackathon("Data Dash", 3, 1, &["python", "data"]),
        ];

        let filter = HackathonFilter {
            search: "PYTHON".into(),
            ..Default::default()
        };
        let found: Vec<&str> = filter.apply(&list).iter().map(|h| h.title.as_str()).collect();
        assert_eq!(found, vec!["Data Dash"]);

        let blank = HackathonFilter {
            search: "   ".into(),
            tag: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.apply(&list).len(), 2);
        assert_eq!(blank.to_query().search, None);
    }

    #[test]
    fn sorts_by_each_key() {
        let mut list = vec![
            hackathon("bravo", 5, 1, &[]),
            hackathon("Alpha", 9, 8, &[]),
            hackathon("charlie", 2, 2, &[]),
        ];

        sort_hackathons(&mut list, SortKey::StartDate);
        assert_eq!(titles(&list), vec!["charlie", "bravo", "Alpha"]);
        sort_hackathons(&mut list, SortKey::Deadline);
        assert_eq!(titles(&list), vec!["bravo", "charlie", "Alpha"]);
        sort_hackathons(&mut list, SortKey::Title);
        assert_eq!(titles(&list), vec!["Alpha", "bravo", "charlie"]);
    }

    fn titles(list: &[Hackathon]) -> Vec<&str> {
        list.iter().map(|h| h.title.as_str()).collect()
    }
}
