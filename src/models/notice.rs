use serde::{Deserialize, Serialize};

use crate::forms::{MultipartPayload, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeChannel {
    Email,
    WhatsApp,
}

/// An email notice being composed. Attachments are checked on attach.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeDraft {
    pub subject: String,
    pub message: String,
    pub recipients: Vec<String>,
    pub attachments: Vec<Upload>,
}

impl NoticeDraft {
    pub fn to_payload(&self) -> MultipartPayload {
        let mut payload = MultipartPayload::new();
        payload.text("subject", self.subject.clone());
        payload.text("message", self.message.clone());
        for (i, recipient) in self.recipients.iter().enumerate() {
            payload.text(format!("recipients[{}]", i), recipient.clone());
        }
        for attachment in &self.attachments {
            payload.file("attachments", attachment.clone());
        }
        payload
    }
}

/// Body of `POST /notice/send-whatsapp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppNotice {
    pub numbers: Vec<String>,
    pub message: String,
}

/// Backend acknowledgement of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchReceipt {
    pub success: bool,
    pub message: String,
    #[serde(alias = "sentCount")]
    pub sent: u32,
    #[serde(alias = "failedCount")]
    pub failed: u32,
}

/// One entry of `GET /notice/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoticeRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub subject: String,
    pub message: String,
    pub recipients: Vec<String>,
    #[serde(alias = "type")]
    pub channel: String,
    pub status: String,
    #[serde(alias = "createdAt")]
    pub sent_at: String,
}
