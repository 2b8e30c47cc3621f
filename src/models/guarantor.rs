use serde::{Deserialize, Serialize};

/// One side of a guarantee: the member on the other end.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorLink {
    pub membership_no: String,
    /// Empty when the membership number is not among the fetched members.
    pub member_id: String,
    pub name: String,
}

/// A member with both directions of their guarantee relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorEntry {
    pub member_id: String,
    pub name: String,
    pub membership_no: String,
    /// Members this member stands guarantor for.
    pub guarantees_for: Vec<GuarantorLink>,
    /// Members standing guarantor for this member.
    pub guaranteed_by: Vec<GuarantorLink>,
}

impl GuarantorEntry {
    pub fn has_links(&self) -> bool {
        !self.guarantees_for.is_empty() || !self.guaranteed_by.is_empty()
    }
}
