pub mod activity;
pub mod auth;
pub mod bulk_mail;
pub mod guarantor;
pub mod member;
pub mod notice;
