//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod auth;
pub mod caller;
pub mod dto;
pub mod error;
pub mod groups;
pub mod health;
pub mod recipes;
pub mod recipes_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
