pub mod auth;
pub mod events;
pub mod lodges;
pub mod requests;
pub mod setup;
