use std::collections::HashMap;

use serde_json::Value;

use super::member_cmd::fetch_all_members;
use crate::errors::AppResult;
use crate::models::guarantor::{GuarantorEntry, GuarantorLink};
use crate::models::member::{Member, RowSection};
use crate::record::get_value_by_path;
use crate::AppState;

/// Guarantee relationships derived from fetched members.
///
/// A member's `referenceDetails[].guarantorMno` names who guarantees them;
/// `guaranteeDetails.ourSociety[]` names whom they guarantee. Both sources
/// feed both directions, and a pair reported twice is listed once.
#[derive(Debug, Default)]
pub struct GuarantorIndex {
    entries: Vec<GuarantorEntry>,
}

impl GuarantorIndex {
    pub fn build(members: &[Member]) -> Self {
        let mut entries: Vec<GuarantorEntry> = members
            .iter()
            .map(|m| GuarantorEntry {
                member_id: m.id.clone(),
                name: m.name(),
                membership_no: m.membership_number(),
                ..Default::default()
            })
            .collect();

        let by_mno: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.membership_no.is_empty())
            .map(|(i, e)| (normalize_mno(&e.membership_no), i))
            .collect();

        let link_to = |mno: &str, fallback_name: &str| -> GuarantorLink {
            match by_mno.get(&normalize_mno(mno)) {
                Some(&i) => GuarantorLink {
                    membership_no: entries[i].membership_no.clone(),
                    member_id: entries[i].member_id.clone(),
                    name: entries[i].name.clone(),
                },
                None => GuarantorLink {
                    membership_no: mno.trim().to_string(),
                    member_id: String::new(),
                    name: fallback_name.trim().to_string(),
                },
            }
        };

        // (guarantor, guaranteed) pairs as links.
        let mut pairs: Vec<(GuarantorLink, GuarantorLink)> = Vec::new();
        for (i, member) in members.iter().enumerate() {
            let this = GuarantorLink {
                membership_no: entries[i].membership_no.clone(),
                member_id: entries[i].member_id.clone(),
                name: entries[i].name.clone(),
            };

            for reference in section_rows(member, RowSection::ReferenceDetails) {
                let mno = row_text(reference, &["guarantorMno", "gurantorMno"]);
                if !mno.trim().is_empty() {
                    let name = row_text(reference, &["guarantorName"]);
                    pairs.push((link_to(&mno, &name), this.clone()));
                }
            }

            for given in section_rows(member, RowSection::OurSocietyGuarantees) {
                let mno = row_text(given, &["membershipNo"]);
                if !mno.trim().is_empty() {
                    let name = row_text(given, &["nameOfMember"]);
                    pairs.push((this.clone(), link_to(&mno, &name)));
                }
            }
        }

        for (guarantor, guaranteed) in pairs {
            if let Some(&i) = by_mno.get(&normalize_mno(&guarantor.membership_no)) {
                push_unique(&mut entries[i].guarantees_for, guaranteed.clone());
            }
            if let Some(&i) = by_mno.get(&normalize_mno(&guaranteed.membership_no)) {
                push_unique(&mut entries[i].guaranteed_by, guarantor);
            }
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[GuarantorEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<GuarantorEntry> {
        self.entries
    }

    pub fn for_member(&self, membership_no: &str) -> Option<&GuarantorEntry> {
        let key = normalize_mno(membership_no);
        self.entries.iter().find(|e| normalize_mno(&e.membership_no) == key)
    }
}

fn normalize_mno(mno: &str) -> String {
    mno.trim().to_uppercase()
}

fn push_unique(links: &mut Vec<GuarantorLink>, link: GuarantorLink) {
    let key = normalize_mno(&link.membership_no);
    if !links.iter().any(|l| normalize_mno(&l.membership_no) == key) {
        links.push(link);
    }
}

fn section_rows(member: &Member, section: RowSection) -> &[Value] {
    let found = match section.path().split_once('.') {
        Some((head, rest)) => member.record.get(head).and_then(|v| get_value_by_path(v, rest)),
        None => member.record.get(section.path()),
    };
    found.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// First present key of a row as text; numbers are stringified.
fn row_text(row: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| match get_value_by_path(row, key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Relationships for every member, fetched fresh.
pub async fn get_guarantor_report(state: &AppState) -> AppResult<Vec<GuarantorEntry>> {
    let members = fetch_all_members(state).await?;
    Ok(GuarantorIndex::build(&members).into_entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn members() -> Vec<Member> {
        serde_json::from_value(json!([
            {
                "_id": "m1",
                "personalDetails": { "nameOfMember": "Asha", "membershipNumber": "101" },
                "referenceDetails": [{ "guarantorName": "Ravi", "guarantorMno": "102" }]
            },
            {
                "_id": "m2",
                "personalDetails": { "nameOfMember": "Ravi", "membershipNumber": "102" },
                "guaranteeDetails": {
                    "givenInOurSociety": true,
                    "ourSociety": [
                        { "nameOfMember": "Asha", "membershipNo": "101" },
                        { "nameOfMember": "Outsider", "membershipNo": "999" }
                    ]
                }
            },
            {
                "_id": "m3",
                "personalDetails": { "nameOfMember": "Meera", "membershipNumber": "103" },
                "referenceDetails": [{ "gurantorMno": " 101 " }]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_both_sources_both_directions_deduplicated() {
        let index = GuarantorIndex::build(&members());

        let ravi = index.for_member("102").unwrap();
        let ravi_for: Vec<_> = ravi.guarantees_for.iter().map(|l| l.membership_no.as_str()).collect();
        assert_eq!(ravi_for, vec!["101", "999"]);
        assert_eq!(ravi.guarantees_for[1].name, "Outsider");
        assert!(ravi.guarantees_for[1].member_id.is_empty());

        let asha = index.for_member("101").unwrap();
        assert_eq!(asha.guaranteed_by.len(), 1);
        assert_eq!(asha.guaranteed_by[0].member_id, "m2");
        assert_eq!(asha.guarantees_for[0].name, "Meera");

        let meera = index.for_member("103").unwrap();
        assert_eq!(meera.guaranteed_by[0].name, "Asha");
        assert!(meera.guarantees_for.is_empty());
    }

    #[test]
    fn test_numeric_numbers_and_amounts_keep_links() {
        let members: Vec<Member> = serde_json::from_value(json!([
            {
                "_id": "m1",
                "personalDetails": { "nameOfMember": "Asha", "membershipNumber": 101 },
                "referenceDetails": [{ "guarantorName": "Ravi", "guarantorMno": 102 }]
            },
            {
                "_id": "m2",
                "personalDetails": { "nameOfMember": "Ravi", "membershipNumber": "102" }
            },
            {
                "_id": "m3",
                "personalDetails": { "nameOfMember": "Meera", "membershipNumber": "103" }
            },
            {
                "_id": "m4",
                "personalDetails": { "nameOfMember": "Kiran", "membershipNumber": "104" },
                "guaranteeDetails": {
                    "ourSociety": [
                        { "nameOfMember": "Meera", "membershipNo": "103", "amountOfLoan": 50000 }
                    ]
                }
            }
        ]))
        .unwrap();

        let index = GuarantorIndex::build(&members);

        let asha = index.for_member("101").unwrap();
        assert_eq!(asha.guaranteed_by.len(), 1);
        assert_eq!(asha.guaranteed_by[0].member_id, "m2");
        assert_eq!(index.for_member("102").unwrap().guarantees_for[0].member_id, "m1");

        let meera = index.for_member("103").unwrap();
        assert_eq!(meera.guaranteed_by.len(), 1);
        assert_eq!(meera.guaranteed_by[0].name, "Kiran");
    }

    #[test]
    fn test_member_without_links() {
        let lone: Vec<Member> = serde_json::from_value(json!([{ "_id": "m1" }])).unwrap();
        let index = GuarantorIndex::build(&lone);
        assert_eq!(index.entries().len(), 1);
        assert!(!index.entries()[0].has_links());
    }
}
