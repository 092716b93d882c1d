//! Domain counters exported through the Prometheus recorder.
//!
//! Without an installed recorder (tests, tooling) every call is a no-op.

use crate::domain::entities::{ConsultationKind, RequestStatus};

pub const LOGINS_TOTAL: &str = "polyclinic_logins_total";
pub const CONSULTATIONS_CREATED_TOTAL: &str = "polyclinic_consultations_created_total";
pub const WAREHOUSE_REQUESTS_TOTAL: &str = "polyclinic_warehouse_requests_total";

pub fn describe() {
    metrics::describe_counter!(LOGINS_TOTAL, "Login attempts by outcome");
    metrics::describe_counter!(
        CONSULTATIONS_CREATED_TOTAL,
        "Consultations recorded, by source kind"
    );
    metrics::describe_counter!(
        WAREHOUSE_REQUESTS_TOTAL,
        "Warehouse request transitions, by resulting status"
    );
}

/// `outcome` is one of `success`, `failure`, `throttled`.
pub fn record_login(outcome: &'static str) {
    metrics::counter!(LOGINS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_consultation_created(kind: ConsultationKind) {
    metrics::counter!(CONSULTATIONS_CREATED_TOTAL, "kind" => kind.to_string()).increment(1);
}

pub fn record_warehouse_request(status: RequestStatus) {
    metrics::counter!(WAREHOUSE_REQUESTS_TOTAL, "status" => status.to_string()).increment(1);
}
