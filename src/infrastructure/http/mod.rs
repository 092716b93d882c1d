pub mod controllers;
pub mod extract;
pub mod middleware;
pub mod router;
