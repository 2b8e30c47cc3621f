//! Form state for member onboarding and dispatch screens.

pub mod dossier;
pub mod multipart;
pub mod request;
pub mod upload;

pub use dossier::{DocumentSlot, DossierForm, FormMode};
pub use multipart::{MultipartPayload, PartValue};
pub use request::RequestState;
pub use upload::{check_upload, Upload};
