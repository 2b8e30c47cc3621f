use serde::Serialize;

use super::auth_cmd::expire_on_unauthorized;
use crate::audit::{self, AuditAction};
use crate::auth::guard::{require_admin, require_token};
use crate::config::get_config;
use crate::errors::{AppError, AppResult};
use crate::forms::{DossierForm, FormMode};
use crate::models::member::{DossierField, Member, MemberQuery};
use crate::{log_info, AppState};

/// One page of a client-side list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: u32,
}

/// Slice `items` to 1-based `page`. Out-of-range pages clamp to the last.
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Paginated<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = (total as u32).div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * per_page) as usize;
    let end = (start + per_page as usize).min(total);
    Paginated {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        per_page,
        total,
        total_pages,
    }
}

/// Case-insensitive match on name, membership number, mobile or PAN. A
/// blank term keeps everyone.
pub fn search_members(members: &[Member], term: &str) -> Vec<Member> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return members.to_vec();
    }

    const SEARCHED: [DossierField; 4] = [
        DossierField::NameOfMember,
        DossierField::MembershipNumber,
        DossierField::PhoneNo1,
        DossierField::PanNo,
    ];

    members
        .iter()
        .filter(|m| {
            SEARCHED
                .iter()
                .filter_map(|f| m.text(*f))
                .any(|v| v.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Every member, following the backend's pages.
pub async fn fetch_all_members(state: &AppState) -> AppResult<Vec<Member>> {
    let token = require_token(state)?;
    let limit = get_config().api.page_size;

    let mut members = Vec::new();
    let mut page = 1;
    loop {
        let query = MemberQuery { search: None, page: Some(page), limit: Some(limit) };
        let result = match state.api.list_members(&token, &query).await {
            Ok(result) => result,
            Err(e) => return Err(expire_on_unauthorized(state, e).await),
        };

        let fetched = result.members.len();
        members.extend(result.members);
        if fetched == 0 || page >= result.total_pages {
            break;
        }
        page += 1;
    }
    Ok(members)
}

pub async fn list_members(state: &AppState, search: &str, page: u32) -> AppResult<Paginated<Member>> {
    let members = fetch_all_members(state).await?;
    let matched = search_members(&members, search);
    Ok(paginate(&matched, page, get_config().api.page_size))
}

pub async fn get_member(state: &AppState, id: &str) -> AppResult<Member> {
    let token = require_token(state)?;
    match state.api.get_member(&token, id).await {
        Ok(member) => Ok(member),
        Err(AppError::Api { status: 404, .. }) => Err(AppError::NotFound(format!("Member {}", id))),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    }
}

/// Submit the dossier: create in create mode, update in edit mode. The form
/// tracks the request and resets itself on success.
pub async fn submit_member(state: &AppState, form: &mut DossierForm) -> AppResult<Member> {
    let (token, admin) = require_admin(state)?;
    form.begin_submit()?;

    let result = send_dossier(state, &token, form).await;
    let result = match result {
        Ok(member) => Ok(member),
        Err(e) => Err(expire_on_unauthorized(state, e).await),
    };

    if let Ok(member) = &result {
        let (action, verb) = match form.mode() {
            FormMode::Create => (AuditAction::MemberCreate, "created"),
            FormMode::Edit { .. } => (AuditAction::MemberUpdate, "updated"),
        };
        audit::log_activity(
            &state.db,
            Some(&admin),
            action,
            &format!("Member {} {}", member.name(), verb),
            Some(&serde_json::json!({ "memberId": member.id })),
        )
        .await;
        log_info!("MEMBER", &format!("Member {}", verb), serde_json::json!({ "memberId": member.id }));
    }

    form.finish_submit(&result);
    result
}

async fn send_dossier(state: &AppState, token: &str, form: &mut DossierForm) -> AppResult<Member> {
    let payload = form.prepare_submission(get_config().forms.submit_on_error)?;
    match form.mode().clone() {
        FormMode::Create => state.api.create_member(token, payload).await,
        FormMode::Edit { member_id } => state.api.update_member(token, &member_id, payload).await,
    }
}

pub async fn delete_member(state: &AppState, id: &str) -> AppResult<()> {
    let (token, admin) = require_admin(state)?;
    if let Err(e) = state.api.delete_member(&token, id).await {
        return Err(expire_on_unauthorized(state, e).await);
    }

    audit::log_activity(
        &state.db,
        Some(&admin),
        AuditAction::MemberDelete,
        &format!("Member {} deleted", id),
        Some(&serde_json::json!({ "memberId": id })),
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{signed_in_state, today};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn members() -> Vec<Member> {
        serde_json::from_value(json!([
            { "_id": "m1", "personalDetails": { "nameOfMember": "Asha Patil", "membershipNumber": "101" },
              "contactDetails": { "phoneNo1": "9876543210" }, "documents": { "panNo": "ABCDE1234F" } },
            { "_id": "m2", "personalDetails": { "nameOfMember": "Ravi Kulkarni", "membershipNumber": 102 } },
            { "_id": "m3", "personalDetails": { "nameOfMember": "Meera Joshi" } }
        ]))
        .unwrap()
    }

    #[test]
    fn test_search_fields_case_insensitive() {
        let all = members();
        assert_eq!(search_members(&all, "PATIL")[0].id, "m1");
        assert_eq!(search_members(&all, "102")[0].id, "m2");
        assert_eq!(search_members(&all, "98765")[0].id, "m1");
        assert_eq!(search_members(&all, "abcde1234f")[0].id, "m1");
        assert_eq!(search_members(&all, "  ").len(), 3);
        assert!(search_members(&all, "zzz").is_empty());
    }

    #[test]
    fn test_paginate_bounds() {
        let items: Vec<u32> = (1..=25).collect();
        let p = paginate(&items, 3, 10);
        assert_eq!(p.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(p.total_pages, 3);

        assert_eq!(paginate(&items, 0, 10).page, 1);
        assert_eq!(paginate(&items, 9, 10).page, 3);

        let empty: Paginated<u32> = paginate(&[], 1, 10);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_follows_pages() {
        let server = MockServer::start().await;
        for (page, id) in [("1", "m1"), ("2", "m2")] {
            Mock::given(method("GET"))
                .and(path("/members"))
                .and(query_param("page", page))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": [{ "_id": id }], "total": 2, "page": page.parse::<u32>().unwrap(), "totalPages": 2
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let state = signed_in_state(&server.uri()).await;
        let all = fetch_all_members(&state).await.unwrap();
        assert_eq!(all.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members/m1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
            .mount(&server)
            .await;

        let state = signed_in_state(&server.uri()).await;
        let err = get_member(&state, "m1").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!crate::auth::guard::current_session(&state).unwrap().is_authenticated());
        assert!(matches!(require_token(&state), Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_submit_create_and_edit_modes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/members"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": { "_id": "m9", "personalDetails": { "nameOfMember": "Asha Patil" } }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/members/m9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "m9", "personalDetails": { "nameOfMember": "Asha P. Patil" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = signed_in_state(&server.uri()).await;

        let mut form = DossierForm::new().with_reference_date(today());
        form.handle_change("personalDetails.nameOfMember", "Asha Patil").unwrap();
        form.handle_change("personalDetails.dateOfBirth", "1990-04-07").unwrap();
        form.handle_change("contactDetails.phoneNo1", "9876543210").unwrap();
        let created = submit_member(&state, &mut form).await.unwrap();
        assert_eq!(created.id, "m9");
        assert!(!form.is_dirty());

        let mut edit = DossierForm::for_edit(&created).with_reference_date(today());
        edit.handle_change("personalDetails.nameOfMember", "Asha P. Patil").unwrap();
        edit.handle_change("personalDetails.dateOfBirth", "1990-04-07").unwrap();
        edit.handle_change("contactDetails.phoneNo1", "9876543210").unwrap();
        let updated = submit_member(&state, &mut edit).await.unwrap();
        assert_eq!(updated.name(), "Asha P. Patil");

        let actions: Vec<String> = audit::recent_activity(&state.db, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.action)
            .collect();
        assert_eq!(actions, vec!["MEMBER_UPDATE", "MEMBER_CREATE"]);
    }

    #[tokio::test]
    async fn test_invalid_dossier_never_reaches_backend() {
        let server = MockServer::start().await;
        let state = signed_in_state(&server.uri()).await;

        let mut form = DossierForm::new().with_reference_date(today());
        let err = submit_member(&state, &mut form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(form.submission().error().is_some());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
