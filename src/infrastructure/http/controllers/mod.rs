pub mod analytics;
pub mod auth;
pub mod consultations;
pub mod departments;
pub mod derivations;
pub mod doctors;
pub mod medications;
pub mod patients;
pub mod referrals;
pub mod users;
pub mod warehouse;
