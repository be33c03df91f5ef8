use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoachError;

/// How many upcoming events are requested.
pub const MAX_EVENTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "at")]
pub enum EventStart {
    Timed(DateTime<Utc>),
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: EventStart,
}

impl CalendarEvent {
    /// Parse one provider item (`summary`, `start.dateTime` or `start.date`).
    /// Items without a usable start are skipped.
    pub fn from_item(item: &Value) -> Option<Self> {
        let title = item
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Untitled event")
            .to_string();
        let start = item.get("start")?;

        let start = if let Some(ts) = start.get("dateTime").and_then(Value::as_str) {
            EventStart::Timed(DateTime::parse_from_rfc3339(ts).ok()?.with_timezone(&Utc))
        } else {
            let day = start.get("date").and_then(Value::as_str)?;
            EventStart::AllDay(NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?)
        };

        Some(Self { title, start })
    }

    /// Parse a provider listing of the form `{"items": [...]}`.
    pub fn from_listing(listing: &Value) -> Vec<Self> {
        listing
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_item).collect())
            .unwrap_or_default()
    }

    /// `HH:MM` in the machine's local time for timed events, `ALL DAY`
    /// otherwise.
    pub fn time_label(&self) -> String {
        self.time_label_in(&Local)
    }

    /// Like [`time_label`](Self::time_label) but in the given zone.
    pub fn time_label_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match &self.start {
            EventStart::Timed(at) => at.with_timezone(tz).format("%H:%M").to_string(),
            EventStart::AllDay(_) => "ALL DAY".to_string(),
        }
    }
}

/// Read-only source of upcoming calendar events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn upcoming_events(
        &self,
        credential: &str,
        max_results: usize,
    ) -> Result<Vec<CalendarEvent>, CoachError>;
}

/// Events for display plus loading state. Failures leave an empty list and a
/// recorded error; they are never returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarFeed {
    events: Vec<CalendarEvent>,
    loading: bool,
    last_error: Option<String>,
}

impl CalendarFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch upcoming events. Without a credential nothing is requested.
    pub async fn refresh<S: CalendarSource + ?Sized>(
        &mut self,
        source: &S,
        credential: Option<&str>,
    ) -> &[CalendarEvent] {
        let Some(credential) = credential else {
            return &self.events;
        };
        self.loading = true;
        let result = source.upcoming_events(credential, MAX_EVENTS).await;
        self.finish(result)
    }

    /// Apply a fetch result obtained elsewhere.
    pub fn finish(&mut self, result: Result<Vec<CalendarEvent>, CoachError>) -> &[CalendarEvent] {
        self.loading = false;
        match result {
            Ok(mut events) => {
                events.truncate(MAX_EVENTS);
                self.events = events;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!("Calendar fetch failed: {e}");
                self.events.clear();
                self.last_error = Some(e.to_string());
            }
        }
        &self.events
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
