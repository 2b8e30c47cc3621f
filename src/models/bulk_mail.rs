use serde::{Deserialize, Serialize};

use crate::forms::{MultipartPayload, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Festival {
    Diwali,
    Holi,
    GudiPadwa,
    GaneshChaturthi,
    Dussehra,
    Eid,
    Christmas,
    NewYear,
    IndependenceDay,
    RepublicDay,
}

impl Festival {
    pub const ALL: [Festival; 10] = [
        Festival::Diwali,
        Festival::Holi,
        Festival::GudiPadwa,
        Festival::GaneshChaturthi,
        Festival::Dussehra,
        Festival::Eid,
        Festival::Christmas,
        Festival::NewYear,
        Festival::IndependenceDay,
        Festival::RepublicDay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Festival::Diwali => "Diwali",
            Festival::Holi => "Holi",
            Festival::GudiPadwa => "Gudi Padwa",
            Festival::GaneshChaturthi => "Ganesh Chaturthi",
            Festival::Dussehra => "Dussehra",
            Festival::Eid => "Eid",
            Festival::Christmas => "Christmas",
            Festival::NewYear => "New Year",
            Festival::IndependenceDay => "Independence Day",
            Festival::RepublicDay => "Republic Day",
        }
    }

    /// Wire value sent as the `festival` field.
    pub fn key(&self) -> &'static str {
        match self {
            Festival::Diwali => "diwali",
            Festival::Holi => "holi",
            Festival::GudiPadwa => "gudiPadwa",
            Festival::GaneshChaturthi => "ganeshChaturthi",
            Festival::Dussehra => "dussehra",
            Festival::Eid => "eid",
            Festival::Christmas => "christmas",
            Festival::NewYear => "newYear",
            Festival::IndependenceDay => "independenceDay",
            Festival::RepublicDay => "republicDay",
        }
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Festival::Diwali => "May the festival of lights bring prosperity to you and your family.",
            Festival::Holi => "Wishing you a Holi full of colour and joy.",
            Festival::GudiPadwa => "May the new year bring you growth and good health.",
            Festival::GaneshChaturthi => "May Lord Ganesha remove every obstacle from your path.",
            Festival::Dussehra => "May good always triumph in your life.",
            Festival::Eid => "May this Eid bring peace and happiness to your home.",
            Festival::Christmas => "Wishing you warmth and cheer this Christmas.",
            Festival::NewYear => "Thank you for being with us. Wishing you a prosperous year ahead.",
            Festival::IndependenceDay => "Celebrating the spirit of freedom with our members.",
            Festival::RepublicDay => "Saluting the constitution that unites us.",
        }
    }
}

/// Subject and body for a festival greeting from `society`.
pub fn festival_template(festival: Festival, society: &str) -> (String, String) {
    let subject = format!("Happy {} from {}", festival.name(), society);
    let message = format!(
        "Dear Member,\n\n{}\n\nWarm regards,\n{}",
        festival.greeting(),
        society
    );
    (subject, message)
}

/// A festival campaign being composed. No recipients means every member.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkMailDraft {
    pub festival: Festival,
    pub subject: String,
    pub message: String,
    pub recipients: Vec<String>,
    pub image: Option<Upload>,
}

impl BulkMailDraft {
    pub fn from_template(festival: Festival, society: &str) -> Self {
        let (subject, message) = festival_template(festival, society);
        Self { festival, subject, message, recipients: Vec::new(), image: None }
    }

    pub fn to_payload(&self) -> MultipartPayload {
        let mut payload = MultipartPayload::new();
        payload.text("festival", self.festival.key());
        payload.text("subject", self.subject.clone());
        payload.text("message", self.message.clone());
        for (i, recipient) in self.recipients.iter().enumerate() {
            payload.text(format!("recipients[{}]", i), recipient.clone());
        }
        if let Some(image) = &self.image {
            payload.file("image", image.clone());
        }
        payload
    }
}

/// A sent campaign, from history or `GET /bulk/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkMailRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub festival: String,
    pub subject: String,
    pub message: String,
    pub image_url: Option<String>,
    pub total_recipients: u32,
    pub sent_count: u32,
    pub failed_count: u32,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkMailStats {
    pub total_campaigns: u32,
    #[serde(alias = "totalEmailsSent")]
    pub total_sent: u64,
    pub total_failed: u64,
    pub this_month: u32,
}
