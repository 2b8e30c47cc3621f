use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::multipart::MultipartPayload;
use super::request::RequestState;
use super::upload::{check_upload, Upload};
use crate::config::UploadConfig;
use crate::errors::{AppError, AppResult};
use crate::log_warn;
use crate::models::member::{DossierField, Member, MemberDossier, RowSection};
use crate::record::FormState;
use crate::validation::{self, dates, normalize, row_key, FieldCheck, ValidationErrors};

/// Uploaded document images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocumentSlot {
    PassportPhoto,
    Signature,
    PanCard,
    AadhaarCard,
}

impl DocumentSlot {
    /// Multipart key of the file part.
    pub fn part_key(&self) -> &'static str {
        match self {
            DocumentSlot::PassportPhoto => "documents[passportSize]",
            DocumentSlot::Signature => "documents[signature]",
            DocumentSlot::PanCard => "documents[panCardImage]",
            DocumentSlot::AadhaarCard => "documents[aadhaarCardImage]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { member_id: String },
}

/// The member onboarding / edit form.
///
/// Input is normalized on change and validated on blur. Row sections are
/// replaced as whole arrays. Only this struct writes to its record.
#[derive(Debug, Clone)]
pub struct DossierForm {
    mode: FormMode,
    initial: FormState,
    state: FormState,
    errors: ValidationErrors,
    files: BTreeMap<DocumentSlot, Upload>,
    submission: RequestState<Member>,
    today: NaiveDate,
}

impl Default for DossierForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DossierForm {
    pub fn new() -> Self {
        let initial = FormState::new(MemberDossier::initial_record());
        Self {
            mode: FormMode::Create,
            state: initial.clone(),
            initial,
            errors: ValidationErrors::new(),
            files: BTreeMap::new(),
            submission: RequestState::Idle,
            today: dates::today(),
        }
    }

    /// Edit an existing member. Fields the backend omits keep their empty
    /// initial shape.
    pub fn for_edit(member: &Member) -> Self {
        let merged = deep_merge(MemberDossier::initial_record(), member.record_value());
        let initial = FormState::new(merged);
        Self {
            mode: FormMode::Edit { member_id: member.id.clone() },
            state: initial.clone(),
            initial,
            ..Self::new()
        }
    }

    /// Fix the date used for age and future-date checks.
    pub fn with_reference_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn submission(&self) -> &RequestState<Member> {
        &self.submission
    }

    pub fn is_dirty(&self) -> bool {
        self.state != self.initial || !self.files.is_empty()
    }

    /// Normalize and store a text input. A field already showing an error is
    /// re-checked so the message disappears as soon as the input is fixed.
    pub fn handle_change(&mut self, path: &str, raw: &str) -> AppResult<()> {
        let value = normalize(path, raw);
        self.state = self.state.set(path, Value::String(value.clone()))?;

        if path == DossierField::DateOfBirth.path() {
            self.derive_age()?;
        }

        if self.errors.get(path).is_some() {
            let check = validation::validate_at(path, &value, self.today);
            self.errors.record(path, &check);
        }
        Ok(())
    }

    pub fn set_flag(&mut self, path: &str, value: bool) -> AppResult<()> {
        self.state = self.state.set(path, Value::Bool(value))?;
        if path == "addressDetails.sameAsPermanent" && value {
            self.copy_permanent_address()?;
        }
        Ok(())
    }

    /// Validate the current value at `path` and update its error entry.
    pub fn handle_blur(&mut self, path: &str) -> FieldCheck {
        let raw = self.state.get(path).and_then(Value::as_str).unwrap_or("");
        let check = validation::validate_at(path, raw, self.today);
        self.errors.record(path, &check);
        check
    }

    /// Replace a repeated section and re-check its rows.
    pub fn replace_section<T: Serialize>(&mut self, section: RowSection, rows: &[T]) -> AppResult<()> {
        let value = serde_json::to_value(rows)
            .map_err(|e| AppError::Internal(format!("Cannot encode rows: {}", e)))?;
        self.state = self.state.set(section.path(), value)?;
        self.validate_section(section);
        Ok(())
    }

    /// Re-check every row of a section; keys are `<section>.<field>_<index>`.
    pub fn validate_section(&mut self, section: RowSection) {
        let prefix = format!("{}.", section.path());
        self.errors.clear_where(|k| k.starts_with(&prefix));

        let rows = match self.state.get(section.path()) {
            Some(Value::Array(rows)) => rows.clone(),
            _ => return,
        };

        for (index, row) in rows.iter().enumerate() {
            let Some(fields) = row.as_object() else { continue };
            for (field, value) in fields {
                let Some(raw) = value.as_str() else { continue };
                let check = validation::validate_at(field, raw, self.today);
                let key = format!("{}{}", prefix, row_key(field, index));
                self.errors.record(key, &check);
            }
        }
    }

    /// Check every catalogued field, every row, the required identity
    /// fields, and guardian details for a minor. Returns true when clean.
    pub fn validate_all(&mut self) -> bool {
        self.errors.reset();

        for field in DossierField::ALL {
            if let Some(raw) = self.state.text(field) {
                let check = validation::validate_at(field.path(), raw, self.today);
                self.errors.record(field.path(), &check);
            }
        }

        for section in RowSection::ALL {
            self.validate_section(section);
        }

        for field in DossierField::required() {
            if self.state.is_missing(field.path()) {
                self.errors.set(field.path(), "This field is required");
            }
        }

        if self.state.flag(DossierField::Minor) {
            for field in [DossierField::GuardianName, DossierField::GuardianRelation] {
                if self.state.is_missing(field.path()) {
                    self.errors.set(field.path(), "Guardian details are required for a minor");
                }
            }
        }

        self.errors.is_empty()
    }

    pub fn attach_file(&mut self, slot: DocumentSlot, upload: Upload, limits: &UploadConfig) -> AppResult<()> {
        check_upload(&upload, limits)?;
        self.files.insert(slot, upload);
        Ok(())
    }

    pub fn detach_file(&mut self, slot: DocumentSlot) {
        self.files.remove(&slot);
    }

    /// Build the multipart body. Outstanding errors block unless
    /// `submit_on_error` is set, in which case they are only logged.
    pub fn prepare_submission(&mut self, submit_on_error: bool) -> AppResult<MultipartPayload> {
        if !self.validate_all() {
            if !submit_on_error {
                return Err(AppError::Validation(self.errors.summary()));
            }
            log_warn!(
                "MEMBER",
                "Submitting dossier with field errors",
                serde_json::json!({ "errors": self.errors.len() })
            );
        }

        let mut payload = MultipartPayload::from_record(self.state.record());
        for (slot, upload) in &self.files {
            payload.file(slot.part_key(), upload.clone());
        }
        Ok(payload)
    }

    pub fn begin_submit(&mut self) -> AppResult<()> {
        self.submission.begin()
    }

    /// Record the outcome. Success resets the form to its initial shape;
    /// failure leaves the input in place.
    pub fn finish_submit(&mut self, result: &AppResult<Member>) {
        self.submission.settle(result);
        if result.is_ok() {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.errors.reset();
        self.files.clear();
    }

    fn derive_age(&mut self) -> AppResult<()> {
        let dob = self
            .state
            .text(DossierField::DateOfBirth)
            .and_then(dates::parse_date)
            .filter(|dob| *dob <= self.today);

        let (age, minor) = match dob {
            Some(dob) => (
                dates::age_on(dob, self.today).to_string(),
                dates::is_minor(dob, self.today),
            ),
            None => (String::new(), false),
        };

        self.state = self
            .state
            .set(DossierField::AgeInYears.path(), Value::String(age))?
            .set(DossierField::Minor.path(), Value::Bool(minor))?;

        if !minor {
            self.errors.clear(DossierField::GuardianName.path());
            self.errors.clear(DossierField::GuardianRelation.path());
        }
        Ok(())
    }

    fn copy_permanent_address(&mut self) -> AppResult<()> {
        let permanent = self
            .state
            .get("addressDetails.permanentAddress")
            .cloned()
            .unwrap_or(Value::Null);
        self.state = self
            .state
            .set("addressDetails.currentResidentialAddress", permanent)?;
        Ok(())
    }
}

/// Overlay `overlay` onto `base`, recursing into objects. Nulls in the
/// overlay keep the base value.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
