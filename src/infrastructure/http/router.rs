use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::extract::route_not_found;
use crate::infrastructure::http::middleware::{require_auth, AppState};
use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // Build protected routes (require a bearer token)
    let protected = Router::new()
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/auth/password", post(api::auth::change_password))
        // Users and roles
        .route("/api/users", get(api::users::list_users))
        .route("/api/users", post(api::users::create_user))
        .route("/api/users/:id", get(api::users::get_user))
        .route("/api/users/:id", patch(api::users::update_user))
        .route("/api/users/:id", delete(api::users::delete_user))
        .route("/api/users/:id/roles", post(api::users::assign_role))
        .route(
            "/api/users/:id/roles/:role",
            delete(api::users::remove_role),
        )
        .route("/api/roles", get(api::users::list_roles))
        // Departments
        .route("/api/departments", get(api::departments::list_departments))
        .route("/api/departments", post(api::departments::create_department))
        .route("/api/departments/:id", get(api::departments::get_department))
        .route(
            "/api/departments/:id",
            put(api::departments::update_department),
        )
        .route(
            "/api/departments/:id",
            delete(api::departments::delete_department),
        )
        .route(
            "/api/departments/:id/doctors",
            get(api::departments::list_department_doctors),
        )
        .route(
            "/api/departments/:id/head",
            get(api::departments::get_department_head)
                .put(api::departments::appoint_department_head)
                .delete(api::departments::remove_department_head),
        )
        .route(
            "/api/departments/:id/stock",
            get(api::departments::list_department_stock)
                .put(api::departments::upsert_department_stock),
        )
        .route(
            "/api/department-heads",
            get(api::departments::list_department_heads),
        )
        // Doctors
        .route("/api/doctors", get(api::doctors::list_doctors))
        .route("/api/doctors", post(api::doctors::create_doctor))
        .route("/api/doctors/:id", get(api::doctors::get_doctor))
        .route("/api/doctors/:id", put(api::doctors::update_doctor))
        .route("/api/doctors/:id", delete(api::doctors::delete_doctor))
        .route(
            "/api/doctors/license/:license_number",
            get(api::doctors::get_doctor_by_license),
        )
        // Patients
        .route("/api/patients", get(api::patients::list_patients))
        .route("/api/patients", post(api::patients::create_patient))
        .route("/api/patients/:id", get(api::patients::get_patient))
        .route("/api/patients/:id", put(api::patients::update_patient))
        .route("/api/patients/:id", delete(api::patients::delete_patient))
        .route(
            "/api/patients/:id/history",
            get(api::patients::get_patient_history),
        )
        .route(
            "/api/patients/identification/:number",
            get(api::patients::get_patient_by_identification),
        )
        // Medications and stock
        .route("/api/medications", get(api::medications::list_medications))
        .route("/api/medications", post(api::medications::create_medication))
        .route(
            "/api/medications/expiring",
            get(api::medications::list_expiring_medications),
        )
        .route(
            "/api/medications/low-stock",
            get(api::medications::list_low_stock_medications),
        )
        .route("/api/medications/:id", get(api::medications::get_medication))
        .route(
            "/api/medications/:id",
            put(api::medications::update_medication),
        )
        .route(
            "/api/medications/:id",
            delete(api::medications::delete_medication),
        )
        .route("/api/stock/:id", get(api::medications::get_stock))
        .route("/api/stock/:id", delete(api::medications::delete_stock))
        .route("/api/stock/:id/adjust", post(api::medications::adjust_stock))
        // Clinical records
        .route("/api/derivations", get(api::derivations::list_derivations))
        .route("/api/derivations", post(api::derivations::create_derivation))
        .route("/api/derivations/:id", get(api::derivations::get_derivation))
        .route(
            "/api/derivations/:id",
            delete(api::derivations::delete_derivation),
        )
        .route("/api/referrals", get(api::referrals::list_referrals))
        .route("/api/referrals", post(api::referrals::create_referral))
        .route("/api/referrals/:id", get(api::referrals::get_referral))
        .route("/api/referrals/:id", delete(api::referrals::delete_referral))
        .route(
            "/api/consultations",
            get(api::consultations::list_consultations),
        )
        .route(
            "/api/consultations",
            post(api::consultations::create_consultation),
        )
        .route(
            "/api/consultations/:id",
            get(api::consultations::get_consultation),
        )
        .route(
            "/api/consultations/:id",
            delete(api::consultations::delete_consultation),
        )
        // Warehouse requests
        .route("/api/warehouse-requests", get(api::warehouse::list_requests))
        .route("/api/warehouse-requests", post(api::warehouse::create_request))
        .route("/api/warehouse-requests/:id", get(api::warehouse::get_request))
        .route(
            "/api/warehouse-requests/:id",
            delete(api::warehouse::delete_request),
        )
        .route(
            "/api/warehouse-requests/:id/approve",
            post(api::warehouse::approve_request),
        )
        .route(
            "/api/warehouse-requests/:id/reject",
            post(api::warehouse::reject_request),
        )
        // Analytics
        .route(
            "/api/analytics/doctor-success-rate",
            get(api::analytics::doctor_success_rate),
        )
        .route(
            "/api/analytics/monthly-averages",
            get(api::analytics::monthly_averages),
        )
        .route(
            "/api/analytics/medication-consumption",
            get(api::analytics::medication_consumption),
        )
        .route("/api/analytics/summary", get(api::analytics::summary))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Build public routes
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(api::auth::login))
        .merge(protected)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
