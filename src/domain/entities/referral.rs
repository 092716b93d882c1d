use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::shared::timestamps::now_rfc3339;
use crate::shared::Validator;

/// External referral of a patient into the polyclinic from an outside medical post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub patient_id: String,
    pub external_post: String,
    pub destination_department_id: String,
    pub referral_date: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralDetails {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub external_post: String,
    pub destination_department_id: String,
    pub destination_department_name: String,
    pub referral_date: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferralRequest {
    pub patient_id: String,
    pub external_post: String,
    pub destination_department_id: String,
    pub referral_date: String,
    pub reason: Option<String>,
}

impl CreateReferralRequest {
    pub fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.required("patient_id", &self.patient_id)
            .length("external_post", &self.external_post, 2, 150)
            .required("destination_department_id", &self.destination_department_id);
        let date = v.date("referral_date", &self.referral_date);
        v.not_in_future("referral_date", date)
            .optional_length("reason", self.reason.as_deref(), 1, 500);
        v.finish()
    }
}

impl Referral {
    pub fn new(request: CreateReferralRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: request.patient_id,
            external_post: request.external_post.trim().to_string(),
            destination_department_id: request.destination_department_id,
            referral_date: request.referral_date.trim().to_string(),
            reason: request.reason,
            created_at: now_rfc3339(),
        }
    }
}
