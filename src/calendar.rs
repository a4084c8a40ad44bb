//! # Calendar Events
//!
//! Turns surf sessions into Google Calendar v3 event bodies and publishes
//! them, either to stdout (dry runs) or to the Calendar API.
//!
//! Session timestamps are naive spot-local times, so events are written with
//! a bare `dateTime` and an explicit IANA `timeZone` rather than a UTC offset.
//!
//! Obtaining or refreshing OAuth credentials is out of scope: the sink reads an
//! already-issued access token from the stored token file.

use crate::config::CalendarConfig;
use crate::SurfSession;
use serde::{Deserialize, Serialize};
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, info};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token file missing or unreadable
    #[error("token file: {0}")]
    TokenIo(#[from] io::Error),

    /// Token file is not the expected JSON
    #[error("token file: {0}")]
    TokenDecode(#[from] serde_json::Error),

    /// Calendar API answered with a non-success status
    #[error("calendar API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Event body accepted by `events.insert`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub reminders: Reminders,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
}

impl CalendarEvent {
    pub fn from_session(session: &SurfSession, config: &CalendarConfig) -> Self {
        let time = |ts: crate::Timestamp| EventTime {
            date_time: ts.format(DATE_TIME_FORMAT).to_string(),
            time_zone: config.time_zone.clone(),
        };

        CalendarEvent {
            summary: config.summary.clone(),
            description: format!(
                "Surf {:.0}-{:.0} ft, wind {:.0} {}",
                session.surf_min, session.surf_max, session.wind_speed, session.wind_direction
            ),
            start: time(session.start),
            end: time(session.end),
            reminders: Reminders { use_default: false },
        }
    }
}

/// Stored OAuth credentials; only the access token is used
#[derive(Deserialize)]
struct StoredToken {
    #[serde(alias = "access_token")]
    token: String,
}

/// Where events go.
pub enum EventSink {
    /// Print each event body as JSON
    Stdout,
    /// Insert into a Google calendar
    GoogleCalendar {
        http: reqwest::Client,
        api_base: String,
        calendar_id: String,
        token: String,
    },
}

impl EventSink {
    /// Google Calendar sink using the token stored at `config.token_path`
    pub fn google(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let raw = fs::read_to_string(&config.token_path)?;
        let stored: StoredToken = serde_json::from_str(&raw)?;
        Ok(EventSink::GoogleCalendar {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            token: stored.token,
        })
    }

    pub async fn publish(&self, event: &CalendarEvent) -> Result<(), CalendarError> {
        match self {
            EventSink::Stdout => {
                println!("{}", serde_json::to_string_pretty(event)?);
                Ok(())
            }
            EventSink::GoogleCalendar {
                http,
                api_base,
                calendar_id,
                token,
            } => {
                let url = format!("{}/calendars/{}/events", api_base, calendar_id);
                debug!(%url, start = %event.start.date_time, "inserting calendar event");

                let response = http.post(&url).bearer_auth(token).json(event).send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CalendarError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }

                let created: serde_json::Value = response.json().await?;
                info!(
                    link = created.get("htmlLink").and_then(|v| v.as_str()).unwrap_or("-"),
                    "event created"
                );
                Ok(())
            }
        }
    }
}
