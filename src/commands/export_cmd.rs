use chrono::Local;
use std::path::PathBuf;

use super::guarantor_cmd::GuarantorIndex;
use super::member_cmd::{fetch_all_members, get_member, search_members};
use crate::audit::{self, AuditAction};
use crate::auth::guard::require_admin;
use crate::errors::AppResult;
use crate::export::{html_report, spreadsheet, write_export};
use crate::{log_info, AppState};

fn generated_at() -> String {
    Local::now().format("%d/%m/%Y %H:%M").to_string()
}

async fn record_export(state: &AppState, admin: &str, kind: &str, path: &PathBuf, rows: usize) {
    let metadata = serde_json::json!({
        "kind": kind,
        "file": path.to_string_lossy(),
        "rows": rows
    });
    audit::log_activity(&state.db, Some(admin), AuditAction::Export, &format!("Exported {}", kind), Some(&metadata))
        .await;
    log_info!("EXPORT", "Document written", metadata);
}

/// Printable member list, filtered by `search`.
pub async fn export_member_list_html(state: &AppState, search: &str) -> AppResult<PathBuf> {
    let (_, admin) = require_admin(state)?;
    let members = search_members(&fetch_all_members(state).await?, search);

    let html = html_report::member_list_html(&members, &generated_at());
    let path = write_export(&state.export_dir, "members", "html", html.as_bytes())?;
    record_export(state, &admin, "member list", &path, members.len()).await;
    Ok(path)
}

/// Member list as CSV for Excel, filtered by `search`.
pub async fn export_member_list_csv(state: &AppState, search: &str) -> AppResult<PathBuf> {
    let (_, admin) = require_admin(state)?;
    let members = search_members(&fetch_all_members(state).await?, search);

    let bytes = spreadsheet::member_list_csv(&members)?;
    let path = write_export(&state.export_dir, "members", "csv", &bytes)?;
    record_export(state, &admin, "member spreadsheet", &path, members.len()).await;
    Ok(path)
}

pub async fn export_member_dossier(state: &AppState, id: &str) -> AppResult<PathBuf> {
    let (_, admin) = require_admin(state)?;
    let member = get_member(state, id).await?;

    let html = html_report::member_dossier_html(&member, &generated_at());
    let stem = match member.membership_number() {
        mno if mno.is_empty() => format!("member_{}", member.id),
        mno => format!("member_{}", mno),
    };
    let path = write_export(&state.export_dir, &stem, "html", html.as_bytes())?;
    record_export(state, &admin, "member dossier", &path, 1).await;
    Ok(path)
}

pub async fn export_guarantor_report(state: &AppState) -> AppResult<PathBuf> {
    let (_, admin) = require_admin(state)?;
    let index = GuarantorIndex::build(&fetch_all_members(state).await?);

    let html = html_report::guarantor_report_html(index.entries(), &generated_at());
    let path = write_export(&state.export_dir, "guarantors", "html", html.as_bytes())?;
    record_export(state, &admin, "guarantor report", &path, index.entries().len()).await;
    Ok(path)
}
