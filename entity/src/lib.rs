//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod accounts;
pub mod external_identity_links;
pub mod exercises;
pub mod submissions;

pub use accounts::Entity as Accounts;
pub use external_identity_links::Entity as ExternalIdentityLinks;
pub use exercises::Entity as Exercises;
pub use submissions::Entity as Submissions;

#[cfg(test)]
mod tests;
