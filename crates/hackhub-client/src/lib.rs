//! Client side of HackHub: a typed REST client, the persisted session and
//! the page logic that does not depend on rendering.

pub mod analytics;
pub mod auth;
pub mod client;
pub mod credits;
pub mod error;
pub mod hackathons;
pub mod live;
pub mod registrations;
pub mod session;
pub mod submissions;
pub mod teams;
pub mod winners;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use hackathons::{HackathonFilter, InterestToggle, SortKey, sort_hackathons};
pub use live::{DEFAULT_POLL_INTERVAL, ScoreFeed, ScoreUpdate};
pub use registrations::{RegistrationAction, registrations_csv};
pub use session::{Session, SessionStore, Theme};
pub use submissions::validate_submission;
pub use winners::{medal, place_label};
