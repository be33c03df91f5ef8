//! Boundaries to the services LifeQuest talks to but does not control: the
//! coaching chat service and the calendar. Failures here never reach the
//! progression state; they degrade to a fallback reply or an empty list.

pub mod calendar;
pub mod coaching;
pub mod error;
pub mod motivation;

pub use calendar::{CalendarEvent, CalendarFeed, CalendarSource, EventStart, MAX_EVENTS};
pub use coaching::{
    ChatRole, ChatTurn, CoachingRequest, CoachingService, Conversation, FALLBACK_REPLY,
};
pub use error::CoachError;
pub use motivation::{choose_quote, quote_for, random_quote, QUOTES};
