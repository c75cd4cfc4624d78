//! Score "live sync": poll a hackathon's submissions and report score changes.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use hackhub_types::models::ProjectSubmission;

use crate::client::ApiClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1200);

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub submission_id: Uuid,
    pub team_id: Uuid,
    pub title: String,
    pub previous: Option<u32>,
    pub score: Option<u32>,
}

/// Background poller owned by a review page. Dropping it stops the task.
pub struct ScoreFeed {
    updates: mpsc::Receiver<ScoreUpdate>,
    cancel: CancellationToken,
}

impl ScoreFeed {
    pub fn start(client: ApiClient, hackathon_id: Uuid) -> Self {
        Self::with_interval(client, hackathon_id, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(client: ApiClient, hackathon_id: Uuid, every: Duration) -> Self {
        let (tx, updates) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        tokio::spawn(poll_scores(client, hackathon_id, every, tx, cancel.clone()));
        Self { updates, cancel }
    }

    /// Next score change. `None` once the feed has stopped.
    pub async fn recv(&mut self) -> Option<ScoreUpdate> {
        self.updates.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ScoreFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_scores(
    client: ApiClient,
    hackathon_id: Uuid,
    every: Duration,
    tx: mpsc::Sender<ScoreUpdate>,
    cancel: CancellationToken,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first successful poll is the baseline and reports nothing
    let mut known: Option<HashMap<Uuid, Option<u32>>> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = client.list_submissions(hackathon_id) => result,
        };
        let submissions = match result {
            Ok(submissions) => submissions,
            Err(e) => {
                warn!("Score poll for hackathon {} failed: {}", hackathon_id, e);
                continue;
            }
        };

        let changes = match &known {
            Some(previous) => score_changes(previous, &submissions),
            None => Vec::new(),
        };
        known = Some(submissions.iter().map(|s| (s.id, s.score)).collect());

        for change in changes {
            if tx.send(change).await.is_err() {
                debug!("Score feed receiver dropped");
                return;
            }
        }
    }
    debug!("Score feed for hackathon {} stopped", hackathon_id);
}

/// Submissions whose score differs from `previous`. New submissions count
/// as changed only once they carry a score.
fn score_changes(
    previous: &HashMap<Uuid, Option<u32>>,
    current: &[ProjectSubmission],
) -> Vec<ScoreUpdate> {
    current
        .iter()
        .filter_map(|s| {
            let before = previous.get(&s.id).copied().flatten();
            (before != s.score).then(|| ScoreUpdate {
                submission_id: s.id,
                team_id: s.team_id,
                title: s.title.clone(),
                previous: before,
                score: s.score,
            })
        })
        .collect()
}
