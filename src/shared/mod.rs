pub mod pagination;
pub mod rate_limiter;
pub mod timestamps;
pub mod utils;
pub mod validation;

pub use pagination::*;
pub use rate_limiter::*;
pub use utils::*;
pub use validation::Validator;
