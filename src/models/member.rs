use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::get_value_by_path;

/// Member dossier as edited in the onboarding form. All scalar fields are
/// strings because they come straight from text inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberDossier {
    pub personal_details: PersonalDetails,
    pub contact_details: ContactDetails,
    pub address_details: AddressDetails,
    pub professional_details: ProfessionalDetails,
    pub family_details: FamilyDetails,
    pub bank_details: Vec<BankDetail>,
    pub reference_details: Vec<ReferenceDetail>,
    pub guarantee_details: GuaranteeDetails,
    pub documents: Documents,
    pub nominee_details: Vec<NomineeDetail>,
    pub credit_details: CreditDetails,
    pub remarks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub title: String,
    pub name_of_member: String,
    pub membership_number: String,
    pub membership_date: String,
    pub gender: String,
    pub date_of_birth: String,
    pub age_in_years: String,
    pub minor: bool,
    pub guardian_name: String,
    pub guardian_relation: String,
    pub religion: String,
    pub marital_status: String,
    pub name_of_father: String,
    pub name_of_mother: String,
    pub name_of_spouse: String,
    pub amount_in_credit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub phone_no1: String,
    pub phone_no2: String,
    pub landline_no: String,
    pub email_id1: String,
    pub email_id2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub flat_house_no: String,
    pub area_street: String,
    pub landmark: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDetails {
    pub permanent_address: Address,
    pub current_residential_address: Address,
    pub same_as_permanent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalDetails {
    pub qualification: String,
    pub occupation: String,
    /// "service" | "business" | "other"
    pub employment_type: String,
    pub service_details: ServiceDetails,
    pub business_details: BusinessDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDetails {
    pub full_name_of_company: String,
    pub address_of_company: String,
    pub designation: String,
    pub employee_code: String,
    pub monthly_income: String,
    pub date_of_joining: String,
    pub date_of_retirement: String,
    pub office_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessDetails {
    pub business_name: String,
    pub business_address: String,
    pub business_structure: String,
    pub gst_no: String,
    pub annual_turnover: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyDetails {
    pub family_members_member_of_society: bool,
    pub family_members: Vec<FamilyMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
    pub name: String,
    pub membership_no: String,
    pub relation_with_applicant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetail {
    pub bank_name: String,
    pub branch: String,
    pub account_number: String,
    pub ifsc_code: String,
}

/// Who introduced the member and who stands guarantor for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceDetail {
    pub reference_name: String,
    pub reference_mno: String,
    pub guarantor_name: String,
    #[serde(alias = "gurantorMno")]
    pub guarantor_mno: String,
}

/// Guarantees the member has given for other borrowers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuaranteeDetails {
    pub given_in_other_society: bool,
    pub other_society: Vec<GuaranteeEntry>,
    pub given_in_our_society: bool,
    pub our_society: Vec<GuaranteeEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuaranteeEntry {
    pub name_of_society: String,
    pub name_of_member: String,
    pub membership_no: String,
    pub type_of_loan: String,
    pub amount_of_loan: String,
    pub if_irregular: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Documents {
    pub pan_no: String,
    pub aadhaar_card_no: String,
    pub voter_id: String,
    pub passport_no: String,
    pub driving_license: String,
    pub ration_card: String,
    /// Uploaded image URLs, filled in by the backend.
    pub passport_size: String,
    pub signature: String,
    pub pan_card_image: String,
    pub aadhaar_card_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NomineeDetail {
    pub nominee_name: String,
    pub relation_with_applicant: String,
    pub nominee_dob: String,
    pub mobile_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreditDetails {
    pub cibil_score: String,
    pub remarks: String,
}

impl MemberDossier {
    /// The empty form shape as a record.
    pub fn initial_record() -> Value {
        serde_json::to_value(Self::default()).unwrap_or(Value::Null)
    }
}

/// Repeated-row sections, replaced as whole arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSection {
    BankDetails,
    FamilyMembers,
    ReferenceDetails,
    NomineeDetails,
    OtherSocietyGuarantees,
    OurSocietyGuarantees,
}

impl RowSection {
    pub const ALL: [RowSection; 6] = [
        RowSection::BankDetails,
        RowSection::FamilyMembers,
        RowSection::ReferenceDetails,
        RowSection::NomineeDetails,
        RowSection::OtherSocietyGuarantees,
        RowSection::OurSocietyGuarantees,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            RowSection::BankDetails => "bankDetails",
            RowSection::FamilyMembers => "familyDetails.familyMembers",
            RowSection::ReferenceDetails => "referenceDetails",
            RowSection::NomineeDetails => "nomineeDetails",
            RowSection::OtherSocietyGuarantees => "guaranteeDetails.otherSociety",
            RowSection::OurSocietyGuarantees => "guaranteeDetails.ourSociety",
        }
    }
}

/// Scalar dossier fields the core reads or checks by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DossierField {
    Title,
    NameOfMember,
    MembershipNumber,
    MembershipDate,
    Gender,
    DateOfBirth,
    AgeInYears,
    Minor,
    GuardianName,
    GuardianRelation,
    Religion,
    MaritalStatus,
    NameOfFather,
    NameOfMother,
    NameOfSpouse,
    AmountInCredit,
    PhoneNo1,
    PhoneNo2,
    LandlineNo,
    EmailId1,
    EmailId2,
    PermanentCity,
    PermanentPincode,
    CurrentPincode,
    MonthlyIncome,
    DateOfJoining,
    OfficeNo,
    GstNo,
    AnnualTurnover,
    PanNo,
    AadhaarCardNo,
    VoterId,
    PassportNo,
    PassportPhoto,
    CibilScore,
}

impl DossierField {
    pub const ALL: [DossierField; 35] = [
        DossierField::Title,
        DossierField::NameOfMember,
        DossierField::MembershipNumber,
        DossierField::MembershipDate,
        DossierField::Gender,
        DossierField::DateOfBirth,
        DossierField::AgeInYears,
        DossierField::Minor,
        DossierField::GuardianName,
        DossierField::GuardianRelation,
        DossierField::Religion,
        DossierField::MaritalStatus,
        DossierField::NameOfFather,
        DossierField::NameOfMother,
        DossierField::NameOfSpouse,
        DossierField::AmountInCredit,
        DossierField::PhoneNo1,
        DossierField::PhoneNo2,
        DossierField::LandlineNo,
        DossierField::EmailId1,
        DossierField::EmailId2,
        DossierField::PermanentCity,
        DossierField::PermanentPincode,
        DossierField::CurrentPincode,
        DossierField::MonthlyIncome,
        DossierField::DateOfJoining,
        DossierField::OfficeNo,
        DossierField::GstNo,
        DossierField::AnnualTurnover,
        DossierField::PanNo,
        DossierField::AadhaarCardNo,
        DossierField::VoterId,
        DossierField::PassportNo,
        DossierField::PassportPhoto,
        DossierField::CibilScore,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            DossierField::Title => "personalDetails.title",
            DossierField::NameOfMember => "personalDetails.nameOfMember",
            DossierField::MembershipNumber => "personalDetails.membershipNumber",
            DossierField::MembershipDate => "personalDetails.membershipDate",
            DossierField::Gender => "personalDetails.gender",
            DossierField::DateOfBirth => "personalDetails.dateOfBirth",
            DossierField::AgeInYears => "personalDetails.ageInYears",
            DossierField::Minor => "personalDetails.minor",
            DossierField::GuardianName => "personalDetails.guardianName",
            DossierField::GuardianRelation => "personalDetails.guardianRelation",
            DossierField::Religion => "personalDetails.religion",
            DossierField::MaritalStatus => "personalDetails.maritalStatus",
            DossierField::NameOfFather => "personalDetails.nameOfFather",
            DossierField::NameOfMother => "personalDetails.nameOfMother",
            DossierField::NameOfSpouse => "personalDetails.nameOfSpouse",
            DossierField::AmountInCredit => "personalDetails.amountInCredit",
            DossierField::PhoneNo1 => "contactDetails.phoneNo1",
            DossierField::PhoneNo2 => "contactDetails.phoneNo2",
            DossierField::LandlineNo => "contactDetails.landlineNo",
            DossierField::EmailId1 => "contactDetails.emailId1",
            DossierField::EmailId2 => "contactDetails.emailId2",
            DossierField::PermanentCity => "addressDetails.permanentAddress.city",
            DossierField::PermanentPincode => "addressDetails.permanentAddress.pincode",
            DossierField::CurrentPincode => "addressDetails.currentResidentialAddress.pincode",
            DossierField::MonthlyIncome => "professionalDetails.serviceDetails.monthlyIncome",
            DossierField::DateOfJoining => "professionalDetails.serviceDetails.dateOfJoining",
            DossierField::OfficeNo => "professionalDetails.serviceDetails.officeNo",
            DossierField::GstNo => "professionalDetails.businessDetails.gstNo",
            DossierField::AnnualTurnover => "professionalDetails.businessDetails.annualTurnover",
            DossierField::PanNo => "documents.panNo",
            DossierField::AadhaarCardNo => "documents.aadhaarCardNo",
            DossierField::VoterId => "documents.voterId",
            DossierField::PassportNo => "documents.passportNo",
            DossierField::PassportPhoto => "documents.passportSize",
            DossierField::CibilScore => "creditDetails.cibilScore",
        }
    }

    /// Last path segment, the key the validation catalog is keyed by.
    pub fn name(&self) -> &'static str {
        let path = self.path();
        path.rsplit('.').next().unwrap_or(path)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.path() == path)
    }

    /// Identity fields a dossier cannot be submitted without.
    pub fn required() -> &'static [DossierField] {
        &[DossierField::NameOfMember, DossierField::DateOfBirth, DossierField::PhoneNo1]
    }
}

/// A member as returned by the backend. The dossier is kept as a record so
/// fields the form does not know about survive an edit round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub record: serde_json::Map<String, Value>,
}

impl Member {
    pub fn record_value(&self) -> Value {
        Value::Object(self.record.clone())
    }

    /// String value of a scalar field; numbers are stringified.
    pub fn text(&self, field: DossierField) -> Option<String> {
        let value = match field.path().split_once('.') {
            Some((head, rest)) => get_value_by_path(self.record.get(head)?, rest)?,
            None => self.record.get(field.path())?,
        };
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        self.text(DossierField::NameOfMember).unwrap_or_default()
    }

    pub fn membership_number(&self) -> String {
        self.text(DossierField::MembershipNumber).unwrap_or_default()
    }

    pub fn mobile(&self) -> String {
        self.text(DossierField::PhoneNo1).unwrap_or_default()
    }

    pub fn email(&self) -> String {
        self.text(DossierField::EmailId1).unwrap_or_default()
    }
}

/// Page of members from `GET /members`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberPage {
    #[serde(alias = "data")]
    pub members: Vec<Member>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initial_record_shape() {
        let record = MemberDossier::initial_record();
        assert_eq!(record["personalDetails"]["nameOfMember"], "");
        assert_eq!(record["personalDetails"]["minor"], false);
        assert_eq!(record["contactDetails"]["phoneNo1"], "");
        assert_eq!(record["addressDetails"]["currentResidentialAddress"]["pincode"], "");
        assert_eq!(record["bankDetails"], json!([]));
    }

    #[test]
    fn test_every_field_path_exists_in_initial_shape() {
        let record = MemberDossier::initial_record();
        for field in DossierField::ALL {
            assert!(
                get_value_by_path(&record, field.path()).is_some(),
                "missing {}",
                field.path()
            );
        }
    }

    #[test]
    fn test_field_names_and_lookup() {
        assert_eq!(DossierField::PanNo.name(), "panNo");
        assert_eq!(DossierField::from_path("documents.panNo"), Some(DossierField::PanNo));
        assert_eq!(DossierField::from_path("documents.nope"), None);
    }

    #[test]
    fn test_member_accepts_mongo_id_and_keeps_unknown_fields() {
        let member: Member = serde_json::from_value(json!({
            "_id": "64f0",
            "personalDetails": { "nameOfMember": "Asha Patil", "membershipNumber": "M-101" },
            "contactDetails": { "phoneNo1": 9876543210u64 },
            "createdAt": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(member.id, "64f0");
        assert_eq!(member.name(), "Asha Patil");
        assert_eq!(member.membership_number(), "M-101");
        assert_eq!(member.mobile(), "9876543210");
        assert!(member.record.contains_key("createdAt"));
        assert_eq!(member.email(), "");
    }
}
