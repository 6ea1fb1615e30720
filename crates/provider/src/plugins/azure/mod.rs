//! Azure Active Directory identity plugin and its discovery helpers.

pub mod aad;
pub mod authority;
pub mod az;
pub mod realm;
