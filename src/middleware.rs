pub mod auth;
pub mod intake;
pub mod rbac;
