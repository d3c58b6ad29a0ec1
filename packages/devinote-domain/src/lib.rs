pub mod access;
pub mod pagination;
pub mod roles;
pub mod validation;
