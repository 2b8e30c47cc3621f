use serde_json::Value;

use crate::models::guarantor::{GuarantorEntry, GuarantorLink};
use crate::models::member::{Member, RowSection};
use crate::record::{format_value, get_value_by_path, Rendered};

use super::{member_cell, MEMBER_COLUMNS};

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn cell(value: &Rendered) -> String {
    match value {
        Rendered::Missing => r#"<span class="missing">Missing</span>"#.to_string(),
        other => escape_html(&other.to_string()),
    }
}

/// Images are embedded in the dossier, plain text everywhere else.
fn dossier_cell(value: &Rendered) -> String {
    match value {
        Rendered::Image { url } => format!(r#"<img class="doc-image" src="{}" alt="document">"#, escape_html(url)),
        other => cell(other),
    }
}

fn page(title: &str, subtitle: &str, body: &str) -> String {
    let title = escape_html(title);
    let subtitle = escape_html(subtitle);
    format!(r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        @page {{ size: A4; margin: 12mm; }}
        body {{ font-family: Arial, Helvetica, sans-serif; font-size: 11px; color: #222; background: #fff; padding: 16px; }}
        .header {{ text-align: center; border-bottom: 2px solid #1f3b73; padding-bottom: 8px; margin-bottom: 12px; }}
        .header h1 {{ font-size: 18px; color: #1f3b73; }}
        .header .subtitle {{ font-size: 10px; color: #666; margin-top: 4px; }}
        h2 {{ font-size: 13px; color: #1f3b73; margin: 14px 0 6px; border-bottom: 1px solid #ccd; padding-bottom: 2px; }}
        table {{ width: 100%; border-collapse: collapse; margin-bottom: 8px; }}
        th {{ background: #1f3b73; color: #fff; text-align: left; padding: 5px; font-size: 10px; }}
        td {{ border: 1px solid #ccd; padding: 4px 5px; vertical-align: top; }}
        tr:nth-child(even) td {{ background: #f5f7fb; }}
        table.fields td.label {{ width: 35%; font-weight: bold; background: #f0f2f8; }}
        .missing {{ color: #b00020; font-style: italic; }}
        .doc-image {{ max-width: 140px; max-height: 140px; border: 1px solid #ccd; }}
        .print-instructions {{ position: fixed; top: 10px; right: 10px; background: #f0f0f0; padding: 12px; border-radius: 5px; font-size: 12px; box-shadow: 0 2px 10px rgba(0,0,0,0.2); }}
        .btn {{ background: #1f3b73; color: #fff; border: none; padding: 6px 12px; border-radius: 4px; cursor: pointer; margin-top: 6px; }}
        @media print {{ .print-instructions {{ display: none; }} body {{ padding: 0; }} }}
    </style>
</head>
<body>
    <div class="print-instructions">
        <div>Choose "Save as PDF" in the print dialog.</div>
        <button class="btn" onclick="window.print()">Print / Save as PDF</button>
    </div>
    <div class="header">
        <h1>{title}</h1>
        <div class="subtitle">{subtitle}</div>
    </div>
{body}
</body>
</html>
"#)
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("    <table>\n        <tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(h)));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("        <tr>");
        for value in row {
            html.push_str(&format!("<td>{}</td>", value));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("    </table>\n");
    html
}

/// Printable member list with the fixed column set.
pub fn member_list_html(members: &[Member], generated_at: &str) -> String {
    let mut headers = vec!["Sr No"];
    headers.extend(MEMBER_COLUMNS.iter().map(|(h, _)| *h));

    let rows: Vec<Vec<String>> = members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let mut row = vec![(i + 1).to_string()];
            row.extend(MEMBER_COLUMNS.iter().map(|(_, path)| cell(&member_cell(member, path))));
            row
        })
        .collect();

    let subtitle = format!("{} members, generated {}", members.len(), generated_at);
    page("Member List", &subtitle, &table(&headers, &rows))
}

const PERSONAL: &[(&str, &str)] = &[
    ("Title", "personalDetails.title"),
    ("Name", "personalDetails.nameOfMember"),
    ("Membership No", "personalDetails.membershipNumber"),
    ("Membership Date", "personalDetails.membershipDate"),
    ("Gender", "personalDetails.gender"),
    ("Date of Birth", "personalDetails.dateOfBirth"),
    ("Age", "personalDetails.ageInYears"),
    ("Minor", "personalDetails.minor"),
    ("Guardian", "personalDetails.guardianName"),
    ("Guardian Relation", "personalDetails.guardianRelation"),
    ("Religion", "personalDetails.religion"),
    ("Marital Status", "personalDetails.maritalStatus"),
    ("Father's Name", "personalDetails.nameOfFather"),
    ("Mother's Name", "personalDetails.nameOfMother"),
    ("Spouse's Name", "personalDetails.nameOfSpouse"),
];

const CONTACT: &[(&str, &str)] = &[
    ("Mobile", "contactDetails.phoneNo1"),
    ("Alternate Mobile", "contactDetails.phoneNo2"),
    ("Landline", "contactDetails.landlineNo"),
    ("Email", "contactDetails.emailId1"),
    ("Alternate Email", "contactDetails.emailId2"),
    ("Permanent Address", "addressDetails.permanentAddress"),
    ("Current Address", "addressDetails.currentResidentialAddress"),
];

const PROFESSIONAL: &[(&str, &str)] = &[
    ("Qualification", "professionalDetails.qualification"),
    ("Occupation", "professionalDetails.occupation"),
    ("Employment Type", "professionalDetails.employmentType"),
    ("Company", "professionalDetails.serviceDetails.fullNameOfCompany"),
    ("Designation", "professionalDetails.serviceDetails.designation"),
    ("Monthly Income", "professionalDetails.serviceDetails.monthlyIncome"),
    ("Date of Joining", "professionalDetails.serviceDetails.dateOfJoining"),
    ("Business Name", "professionalDetails.businessDetails.businessName"),
    ("GST No", "professionalDetails.businessDetails.gstNo"),
    ("Annual Turnover", "professionalDetails.businessDetails.annualTurnover"),
];

const DOCUMENTS: &[(&str, &str)] = &[
    ("PAN", "documents.panNo"),
    ("Aadhaar", "documents.aadhaarCardNo"),
    ("Voter ID", "documents.voterId"),
    ("Passport No", "documents.passportNo"),
    ("Driving License", "documents.drivingLicense"),
    ("Ration Card", "documents.rationCard"),
    ("CIBIL Score", "creditDetails.cibilScore"),
    ("Photo", "documents.passportSize"),
    ("Signature", "documents.signature"),
    ("PAN Card", "documents.panCardImage"),
    ("Aadhaar Card", "documents.aadhaarCardImage"),
];

/// Row sections: title, section, and (header, row key) columns.
const ROW_TABLES: &[(&str, RowSection, &[(&str, &str)])] = &[
    (
        "Bank Details",
        RowSection::BankDetails,
        &[("Bank", "bankName"), ("Branch", "branch"), ("Account No", "accountNumber"), ("IFSC", "ifscCode")],
    ),
    (
        "Family Members",
        RowSection::FamilyMembers,
        &[("Name", "name"), ("Membership No", "membershipNo"), ("Relation", "relationWithApplicant")],
    ),
    (
        "References",
        RowSection::ReferenceDetails,
        &[
            ("Reference", "referenceName"),
            ("Reference M.No", "referenceMno"),
            ("Guarantor", "guarantorName"),
            ("Guarantor M.No", "guarantorMno"),
        ],
    ),
    (
        "Nominees",
        RowSection::NomineeDetails,
        &[("Name", "nomineeName"), ("Relation", "relationWithApplicant"), ("Date of Birth", "nomineeDob"), ("Mobile", "mobileNo")],
    ),
    (
        "Guarantees Given in Our Society",
        RowSection::OurSocietyGuarantees,
        &[("Member", "nameOfMember"), ("Membership No", "membershipNo"), ("Loan Type", "typeOfLoan"), ("Amount", "amountOfLoan")],
    ),
    (
        "Guarantees Given in Other Societies",
        RowSection::OtherSocietyGuarantees,
        &[("Society", "nameOfSociety"), ("Member", "nameOfMember"), ("Loan Type", "typeOfLoan"), ("Amount", "amountOfLoan")],
    ),
];

fn field_table(member: &Member, fields: &[(&str, &str)]) -> String {
    let mut html = String::from("    <table class=\"fields\">\n");
    for (label, path) in fields {
        html.push_str(&format!(
            "        <tr><td class=\"label\">{}</td><td>{}</td></tr>\n",
            escape_html(label),
            dossier_cell(&member_cell(member, path))
        ));
    }
    html.push_str("    </table>\n");
    html
}

fn row_table(record: &Value, section: RowSection, columns: &[(&str, &str)]) -> String {
    let rows: Vec<Vec<String>> = match get_value_by_path(record, section.path()) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|(_, key)| cell(&format_value(item.get(*key))))
                    .collect()
            })
            .collect(),
        _ => Vec::new(),
    };

    if rows.is_empty() {
        return "    <p><span class=\"missing\">Missing</span></p>\n".to_string();
    }
    let headers: Vec<&str> = columns.iter().map(|(h, _)| *h).collect();
    table(&headers, &rows)
}

/// Full single-member dossier.
pub fn member_dossier_html(member: &Member, generated_at: &str) -> String {
    let record = member.record_value();
    let mut body = String::new();

    for (title, fields) in [
        ("Personal Details", PERSONAL),
        ("Contact & Address", CONTACT),
        ("Professional Details", PROFESSIONAL),
    ] {
        body.push_str(&format!("    <h2>{}</h2>\n", title));
        body.push_str(&field_table(member, fields));
    }

    for (title, section, columns) in ROW_TABLES {
        body.push_str(&format!("    <h2>{}</h2>\n", title));
        body.push_str(&row_table(&record, *section, columns));
    }

    body.push_str("    <h2>Documents</h2>\n");
    body.push_str(&field_table(member, DOCUMENTS));

    body.push_str("    <h2>Remarks</h2>\n");
    body.push_str(&format!(
        "    <p>{}</p>\n",
        cell(&format_value(get_value_by_path(&record, "remarks")))
    ));

    let name = member_cell(member, "personalDetails.nameOfMember").to_string();
    let subtitle = format!(
        "Membership No {}, generated {}",
        member_cell(member, "personalDetails.membershipNumber"),
        generated_at
    );
    page(&format!("Member Dossier: {}", name), &subtitle, &body)
}

fn links_cell(links: &[GuarantorLink]) -> String {
    if links.is_empty() {
        return "-".to_string();
    }
    links
        .iter()
        .map(|l| {
            let name = if l.name.trim().is_empty() { "Unknown member" } else { l.name.as_str() };
            escape_html(&format!("{} ({})", name, l.membership_no))
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Who guarantees whom, one row per member with at least one link.
pub fn guarantor_report_html(entries: &[GuarantorEntry], generated_at: &str) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .filter(|e| e.has_links())
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                cell(&format_value(Some(&Value::String(e.membership_no.clone())))),
                cell(&format_value(Some(&Value::String(e.name.clone())))),
                links_cell(&e.guarantees_for),
                links_cell(&e.guaranteed_by),
            ]
        })
        .collect();

    let subtitle = format!("{} members with guarantees, generated {}", rows.len(), generated_at);
    let headers = ["Sr No", "Membership No", "Member", "Guarantor For", "Guaranteed By"];
    page("Guarantor Report", &subtitle, &table(&headers, &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(value: Value) -> Member {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_list_escapes_and_marks_missing() {
        let members = vec![member(json!({
            "_id": "m1",
            "personalDetails": { "nameOfMember": "<script>alert(1)</script>", "membershipNumber": "101" }
        }))];
        let html = member_list_html(&members, "16/10/2026");

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains(r#"<span class="missing">Missing</span>"#));
        assert!(html.contains("1 members, generated 16/10/2026"));
    }

    #[test]
    fn test_dossier_sections_rows_and_images() {
        let m = member(json!({
            "_id": "m1",
            "personalDetails": { "nameOfMember": "Asha Patil", "dateOfBirth": "1990-04-07" },
            "bankDetails": [{ "bankName": "SBI", "ifscCode": "SBIN0001234" }],
            "documents": { "passportSize": "https://cdn.example/p.jpg" }
        }));
        let html = member_dossier_html(&m, "now");

        assert!(html.contains("Member Dossier: Asha Patil"));
        assert!(html.contains("07/04/1990"));
        assert!(html.contains("<td>SBIN0001234</td>"));
        assert!(html.contains(r#"<img class="doc-image" src="https://cdn.example/p.jpg""#));
        assert!(html.contains("<h2>Nominees</h2>\n    <p><span class=\"missing\">Missing</span></p>"));
    }

    #[test]
    fn test_guarantor_report_skips_unlinked() {
        let entries = vec![
            GuarantorEntry {
                member_id: "m1".into(),
                name: "Asha".into(),
                membership_no: "101".into(),
                guarantees_for: vec![GuarantorLink { membership_no: "102".into(), member_id: "m2".into(), name: "Ravi".into() }],
                guaranteed_by: vec![],
            },
            GuarantorEntry { member_id: "m3".into(), name: "Lone".into(), membership_no: "103".into(), ..Default::default() },
        ];
        let html = guarantor_report_html(&entries, "now");
        assert!(html.contains("Ravi (102)"));
        assert!(!html.contains("Lone"));
        assert!(html.contains("1 members with guarantees"));
    }
}
