pub mod analytics;
pub mod consultation;
pub mod department;
pub mod derivation;
pub mod doctor;
pub mod medication;
pub mod patient;
pub mod referral;
pub mod role;
pub mod user;
pub mod warehouse;

pub use analytics::*;
pub use consultation::*;
pub use department::*;
pub use derivation::*;
pub use doctor::*;
pub use medication::*;
pub use patient::*;
pub use referral::*;
pub use role::*;
pub use user::*;
pub use warehouse::*;
