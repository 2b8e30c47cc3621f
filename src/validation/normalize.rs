//! On-change formatting. Runs before a value is stored; validation runs later,
//! on blur, against the normalized value.

use super::rules::{rule_for, FieldRule};

/// Normalize raw input for `field`. Fields without a rule pass through.
pub fn normalize(field: &str, raw: &str) -> String {
    let Some(rule) = rule_for(field) else {
        return raw.to_string();
    };

    match rule {
        FieldRule::Pan
        | FieldRule::Ifsc
        | FieldRule::Gst
        | FieldRule::VoterId
        | FieldRule::Passport
        | FieldRule::MembershipNumber => raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase(),
        FieldRule::Mobile
        | FieldRule::Aadhaar
        | FieldRule::Pincode
        | FieldRule::BankAccount
        | FieldRule::CreditScore => {
            let limit = rule.max_digits().unwrap_or(usize::MAX);
            raw.chars().filter(|c| c.is_ascii_digit()).take(limit).collect()
        }
        FieldRule::Landline => raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+' || *c == '-' || *c == ' ')
            .collect(),
        FieldRule::Email => raw.trim().to_lowercase(),
        FieldRule::PersonName => title_case(raw),
        FieldRule::Amount => raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect(),
        FieldRule::Enum(kind) => kind
            .canonical(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        FieldRule::DateOfBirth | FieldRule::PastDate => raw.trim().to_string(),
    }
}

/// "rAMESH  kumar" -> "Ramesh  Kumar". Whitespace is preserved so typing a
/// trailing space is not swallowed mid-edit.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word_start = true;
    for c in raw.chars() {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_codes() {
        assert_eq!(normalize("panNo", "abcde 1234f"), "ABCDE1234F");
        assert_eq!(normalize("ifscCode_0", " sbin 0001234 "), "SBIN0001234");
        assert_eq!(normalize("documents.voterId", "abc1234567"), "ABC1234567");
    }

    #[test]
    fn test_digits_only_with_limit() {
        assert_eq!(normalize("phoneNo1", "+91 98765-43210"), "9198765432");
        assert_eq!(normalize("phoneNo1", "98765 43210"), "9876543210");
        assert_eq!(normalize("aadhaarCardNo", "2345 6789 0123"), "234567890123");
        assert_eq!(normalize("pincode", "411 001 9"), "411001");
    }

    #[test]
    fn test_names_and_email() {
        assert_eq!(normalize("nameOfMember", "rAMESH kumar "), "Ramesh Kumar ");
        assert_eq!(normalize("emailId1", "  Member@Society.IN "), "member@society.in");
    }

    #[test]
    fn test_enum_canonicalized() {
        assert_eq!(normalize("maritalStatus", "married"), "Married");
        assert_eq!(normalize("maritalStatus", "complicated"), "complicated");
    }

    #[test]
    fn test_unknown_field_untouched() {
        assert_eq!(normalize("occupation", " Farmer "), " Farmer ");
    }
}
