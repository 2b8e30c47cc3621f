//! Operations the admin screens call. Each takes the shared `AppState`,
//! checks the session, talks to the backend and records activity.

pub mod activity_cmd;
pub mod auth_cmd;
pub mod bulk_mail_cmd;
pub mod export_cmd;
pub mod guarantor_cmd;
pub mod member_cmd;
pub mod notice_cmd;
