//! Amazon Web Services plugins: EKS discovery and IAM identity.

pub mod arn;
pub mod eks;
pub mod iam;
