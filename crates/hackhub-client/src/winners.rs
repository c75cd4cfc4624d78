use reqwest::Method;
use uuid::Uuid;

use hackhub_types::models::Winner;

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// Winners by position; empty until the organizer finalizes.
    pub async fn winners(&self, hackathon_id: Uuid) -> ClientResult<Vec<Winner>> {
        self.get(&format!("/winners/hackathons/{hackathon_id}")).await
    }

    pub async fn finalize_winners(&self, hackathon_id: Uuid) -> ClientResult<Vec<Winner>> {
        self.send_json(
            Method::POST,
            &format!("/winners/hackathons/{hackathon_id}/finalize"),
            &(),
        )
        .await
    }
}

pub fn medal(position: u8) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

pub fn place_label(position: u8) -> String {
    let suffix = match position {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{position}{suffix} place")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn podium_medals() {
        assert_eq!(medal(1), Some("\u{1F947}"));
        assert_eq!(medal(2), Some("\u{1F948}"));
        assert_eq!(medal(3), Some("\u{1F949}"));
        assert_eq!(medal(0), None);
        assert_eq!(medal(4), None);
        assert_eq!(place_label(2), "2nd place");
    }
}
