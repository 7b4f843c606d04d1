pub mod approval;
pub mod auth;
pub mod event_sync;
pub mod google_calendar;
pub mod notifier;
