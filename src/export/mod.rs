//! One-way documents generated from already-fetched members: printable
//! HTML reports (opened in a browser and saved as PDF) and a CSV member list.

pub mod html_report;
pub mod spreadsheet;

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::models::member::Member;
use crate::record::{format_value, get_value_by_path, Rendered};

/// Fixed member-list columns: header and dotted path.
pub const MEMBER_COLUMNS: &[(&str, &str)] = &[
    ("Membership No", "personalDetails.membershipNumber"),
    ("Name", "personalDetails.nameOfMember"),
    ("Mobile", "contactDetails.phoneNo1"),
    ("Email", "contactDetails.emailId1"),
    ("PAN", "documents.panNo"),
    ("City", "addressDetails.permanentAddress.city"),
    ("Date of Birth", "personalDetails.dateOfBirth"),
    ("Membership Date", "personalDetails.membershipDate"),
];

/// Display value of a member field.
pub fn member_cell(member: &Member, path: &str) -> Rendered {
    let value = match path.split_once('.') {
        Some((head, rest)) => member.record.get(head).and_then(|v| get_value_by_path(v, rest)),
        None => member.record.get(path),
    };
    format_value(value)
}

/// Write `content` as `<stem>_<timestamp>.<ext>` under `dir`, creating it.
pub fn write_export(dir: &Path, stem: &str, ext: &str, content: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.{}", stem, timestamp, ext));
    std::fs::write(&path, content)?;
    Ok(path)
}
