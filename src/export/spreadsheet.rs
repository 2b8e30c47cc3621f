use crate::errors::{AppError, AppResult};
use crate::models::member::Member;

use super::{member_cell, MEMBER_COLUMNS};

/// The member list as CSV with a `Sr No` column first. Missing values are
/// written as `Missing`. A UTF-8 BOM lets Excel pick the right encoding.
pub fn member_list_csv(members: &[Member]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Sr No"];
    header.extend(MEMBER_COLUMNS.iter().map(|(h, _)| *h));
    writer.write_record(&header)?;

    for (i, member) in members.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        row.extend(
            MEMBER_COLUMNS
                .iter()
                .map(|(_, path)| guard_formula(member_cell(member, path).to_string())),
        );
        writer.write_record(&row)?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    let mut out = b"\xEF\xBB\xBF".to_vec();
    out.extend(body);
    Ok(out)
}

/// Excel evaluates cells starting with these as formulas.
fn guard_formula(cell: String) -> String {
    if cell.starts_with(&['=', '+', '-', '@'][..]) {
        format!("'{}", cell)
    } else {
        cell
    }
}
