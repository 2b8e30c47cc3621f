//! Rule catalog: which rule applies to which field, and the rule checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PAN: Regex = Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap();
    static ref AADHAAR: Regex = Regex::new(r"^[2-9][0-9]{11}$").unwrap();
    static ref IFSC: Regex = Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap();
    static ref GST: Regex =
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").unwrap();
    static ref PINCODE: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
    static ref BANK_ACCOUNT: Regex = Regex::new(r"^[0-9]{9,18}$").unwrap();
    static ref MEMBERSHIP_NO: Regex = Regex::new(r"^[A-Z0-9/-]{1,20}$").unwrap();
    static ref VOTER_ID: Regex = Regex::new(r"^[A-Z]{3}[0-9]{7}$").unwrap();
    static ref PASSPORT: Regex = Regex::new(r"^[A-Z][0-9]{7}$").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap();
}

/// Fixed option sets for select-style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    Gender,
    Religion,
    MaritalStatus,
    Title,
    Relation,
}

impl EnumKind {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            EnumKind::Gender => &["Male", "Female", "Other"],
            EnumKind::Religion => &[
                "Hindu", "Muslim", "Christian", "Sikh", "Buddhist", "Jain", "Parsi", "Other",
            ],
            EnumKind::MaritalStatus => &["Single", "Married", "Divorced", "Widowed"],
            EnumKind::Title => &["Mr", "Mrs", "Ms", "Miss", "Dr", "Shri", "Smt"],
            EnumKind::Relation => &[
                "Father", "Mother", "Spouse", "Husband", "Wife", "Son", "Daughter", "Brother",
                "Sister", "Grandfather", "Grandmother", "Guardian", "Other",
            ],
        }
    }

    /// The canonical spelling of `value`, matched case-insensitively.
    /// A trailing period is ignored so "Mr." matches "Mr".
    pub fn canonical(&self, value: &str) -> Option<&'static str> {
        let wanted = value.trim().trim_end_matches('.');
        self.options()
            .iter()
            .copied()
            .find(|opt| opt.eq_ignore_ascii_case(wanted))
    }
}

/// Rule classes a field can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Mobile,
    Landline,
    Email,
    Pan,
    Aadhaar,
    Ifsc,
    Gst,
    Pincode,
    BankAccount,
    CreditScore,
    DateOfBirth,
    PastDate,
    MembershipNumber,
    VoterId,
    Passport,
    PersonName,
    Amount,
    Enum(EnumKind),
}

impl FieldRule {
    /// Message shown when a non-empty value fails this rule.
    pub fn message(&self) -> &'static str {
        match self {
            FieldRule::Mobile => "Enter a valid 10-digit mobile number",
            FieldRule::Landline => "Enter a valid landline number",
            FieldRule::Email => "Enter a valid email address",
            FieldRule::Pan => "Enter a valid PAN (e.g. ABCDE1234F)",
            FieldRule::Aadhaar => "Enter a valid 12-digit Aadhaar number",
            FieldRule::Ifsc => "Enter a valid IFSC code",
            FieldRule::Gst => "Enter a valid GST number",
            FieldRule::Pincode => "Pincode must be exactly 6 digits",
            FieldRule::BankAccount => "Account number must be 9-18 digits",
            FieldRule::CreditScore => "CIBIL score must be between 300 and 900",
            FieldRule::DateOfBirth | FieldRule::PastDate => "Enter a valid date",
            FieldRule::MembershipNumber => "Enter a valid membership number",
            FieldRule::VoterId => "Enter a valid voter ID",
            FieldRule::Passport => "Enter a valid passport number",
            FieldRule::PersonName => "Name can contain only letters and spaces",
            FieldRule::Amount => "Enter a valid amount",
            FieldRule::Enum(_) => "Select a valid option",
        }
    }

    /// Upper bound on digits kept by normalization, for digit-only rules.
    pub fn max_digits(&self) -> Option<usize> {
        match self {
            FieldRule::Mobile => Some(10),
            FieldRule::Aadhaar => Some(12),
            FieldRule::Pincode => Some(6),
            FieldRule::BankAccount => Some(18),
            FieldRule::CreditScore => Some(3),
            _ => None,
        }
    }
}

/// Look up the rule for a field name.
///
/// Accepts a plain name (`panNo`), a dotted path (`documents.panNo`) or a row
/// key (`ifscCode_2`). Unknown names have no rule.
pub fn rule_for(field: &str) -> Option<FieldRule> {
    let name = field.rsplit('.').next().unwrap_or(field);
    let name = strip_row_index(name);

    let rule = match name {
        "phoneNo1" | "phoneNo2" | "mobileNo" | "whatsappNo" => FieldRule::Mobile,
        "landlineNo" | "officeNo" => FieldRule::Landline,
        "emailId1" | "emailId2" | "email" => FieldRule::Email,
        "panNo" => FieldRule::Pan,
        "aadhaarCardNo" => FieldRule::Aadhaar,
        "ifscCode" => FieldRule::Ifsc,
        "gstNo" => FieldRule::Gst,
        "pincode" => FieldRule::Pincode,
        "accountNumber" => FieldRule::BankAccount,
        "cibilScore" => FieldRule::CreditScore,
        "dateOfBirth" => FieldRule::DateOfBirth,
        "membershipDate" | "dateOfJoining" | "nomineeDob" => FieldRule::PastDate,
        "membershipNumber" | "membershipNo" | "referenceMno" | "guarantorMno" => {
            FieldRule::MembershipNumber
        }
        "voterId" => FieldRule::VoterId,
        "passportNo" => FieldRule::Passport,
        "nameOfMember" | "guardianName" | "nameOfFather" | "nameOfMother" | "nameOfSpouse"
        | "nomineeName" | "referenceName" | "guarantorName" | "name" => FieldRule::PersonName,
        "monthlyIncome" | "amountInCredit" | "annualTurnover" | "amountOfLoan" => FieldRule::Amount,
        "gender" => FieldRule::Enum(EnumKind::Gender),
        "religion" => FieldRule::Enum(EnumKind::Religion),
        "maritalStatus" => FieldRule::Enum(EnumKind::MaritalStatus),
        "title" => FieldRule::Enum(EnumKind::Title),
        "guardianRelation" | "relationWithApplicant" => FieldRule::Enum(EnumKind::Relation),
        _ => return None,
    };
    Some(rule)
}

/// `ifscCode_2` -> `ifscCode`
pub fn strip_row_index(key: &str) -> &str {
    match key.rsplit_once('_') {
        Some((base, idx)) if !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => key,
    }
}

/// Check a non-empty, already-trimmed value against a pattern rule.
/// Date rules are handled by the `dates` module.
pub(crate) fn check_pattern(rule: FieldRule, value: &str) -> bool {
    match rule {
        FieldRule::Mobile => {
            let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.len() == 10 && matches!(digits.as_bytes()[0], b'6'..=b'9')
        }
        FieldRule::Landline => {
            let allowed = value
                .chars()
                .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ');
            let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
            allowed && (6..=12).contains(&digits)
        }
        FieldRule::Email => value.matches('@').count() == 1 && EMAIL.is_match(value),
        FieldRule::Pan => PAN.is_match(value),
        FieldRule::Aadhaar => AADHAAR.is_match(value),
        FieldRule::Ifsc => IFSC.is_match(value),
        FieldRule::Gst => GST.is_match(value),
        FieldRule::Pincode => PINCODE.is_match(value),
        FieldRule::BankAccount => BANK_ACCOUNT.is_match(value),
        FieldRule::CreditScore => {
            value.bytes().all(|b| b.is_ascii_digit())
                && value
                    .parse::<u32>()
                    .map(|score| (300..=900).contains(&score))
                    .unwrap_or(false)
        }
        FieldRule::MembershipNumber => MEMBERSHIP_NO.is_match(value),
        FieldRule::VoterId => VOTER_ID.is_match(value),
        FieldRule::Passport => PASSPORT.is_match(value),
        FieldRule::PersonName => {
            let len = value.chars().count();
            (2..=100).contains(&len)
                && value
                    .chars()
                    .all(|c| c.is_alphabetic() || c.is_whitespace() || ".'-".contains(c))
        }
        FieldRule::Amount => AMOUNT.is_match(value),
        FieldRule::Enum(kind) => kind.options().contains(&value),
        FieldRule::DateOfBirth | FieldRule::PastDate => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lookup_by_path_and_row_key() {
        assert_eq!(rule_for("documents.panNo"), Some(FieldRule::Pan));
        assert_eq!(rule_for("ifscCode_3"), Some(FieldRule::Ifsc));
        assert_eq!(rule_for("phoneNo1"), Some(FieldRule::Mobile));
        assert_eq!(rule_for("personalDetails.gender"), Some(FieldRule::Enum(EnumKind::Gender)));
        assert_eq!(rule_for("somethingElse"), None);
    }

    #[test]
    fn test_strip_row_index_keeps_numbered_names() {
        assert_eq!(strip_row_index("accountNumber_0"), "accountNumber");
        assert_eq!(strip_row_index("phoneNo1"), "phoneNo1");
        assert_eq!(strip_row_index("snake_case"), "snake_case");
    }

    #[test]
    fn test_mobile() {
        assert!(check_pattern(FieldRule::Mobile, "9876543210"));
        assert!(check_pattern(FieldRule::Mobile, "98765-43210"));
        assert!(!check_pattern(FieldRule::Mobile, "1234567890"));
        assert!(!check_pattern(FieldRule::Mobile, "987654321"));
    }

    #[test]
    fn test_landline() {
        assert!(check_pattern(FieldRule::Landline, "020-2567 8901"));
        assert!(check_pattern(FieldRule::Landline, "+91 20 2567"));
        assert!(!check_pattern(FieldRule::Landline, "12345"));
        assert!(!check_pattern(FieldRule::Landline, "020/25678901"));
    }

    #[test]
    fn test_identity_numbers() {
        assert!(check_pattern(FieldRule::Pan, "ABCDE1234F"));
        assert!(!check_pattern(FieldRule::Pan, "abcde1234f"));
        assert!(check_pattern(FieldRule::Aadhaar, "234567890123"));
        assert!(!check_pattern(FieldRule::Aadhaar, "123456789012"));
        assert!(check_pattern(FieldRule::Ifsc, "SBIN0001234"));
        assert!(!check_pattern(FieldRule::Ifsc, "SBIN1001234"));
        assert!(check_pattern(FieldRule::Gst, "27AAPFU0939F1ZV"));
        assert!(!check_pattern(FieldRule::Gst, "27AAPFU0939F1AV"));
    }

    #[test]
    fn test_email_rejects_double_at_and_spaces() {
        assert!(check_pattern(FieldRule::Email, "member@society.in"));
        assert!(!check_pattern(FieldRule::Email, "a@b@c.in"));
        assert!(!check_pattern(FieldRule::Email, "a b@c.in"));
        assert!(!check_pattern(FieldRule::Email, "member@society"));
    }

    #[test]
    fn test_numeric_ranges() {
        assert!(check_pattern(FieldRule::Pincode, "123456"));
        assert!(!check_pattern(FieldRule::Pincode, "12345"));
        assert!(check_pattern(FieldRule::BankAccount, "123456789"));
        assert!(!check_pattern(FieldRule::BankAccount, "12345678"));
        assert!(check_pattern(FieldRule::CreditScore, "300"));
        assert!(check_pattern(FieldRule::CreditScore, "900"));
        assert!(!check_pattern(FieldRule::CreditScore, "299"));
        assert!(!check_pattern(FieldRule::CreditScore, "750.5"));
        assert!(!check_pattern(FieldRule::CreditScore, "+750"));
        assert!(!check_pattern(FieldRule::CreditScore, ""));
    }

    #[test]
    fn test_digit_rules_reject_non_ascii_digits() {
        assert!(!check_pattern(FieldRule::Pincode, "१२३४५६"));
        assert!(!check_pattern(FieldRule::Aadhaar, "२३४५६७८९०१२३"));
        assert!(!check_pattern(FieldRule::BankAccount, "१२३४५६७८९"));
        assert!(!check_pattern(FieldRule::Amount, "٥٠٠٠"));
        assert!(!check_pattern(FieldRule::Amount, "5000.٥"));
    }

    #[test]
    fn test_enum_canonical() {
        assert_eq!(EnumKind::Title.canonical("mr."), Some("Mr"));
        assert_eq!(EnumKind::Gender.canonical("FEMALE"), Some("Female"));
        assert_eq!(EnumKind::Religion.canonical("Atheist"), None);
        assert!(!check_pattern(FieldRule::Enum(EnumKind::Gender), "male"));
    }
}
