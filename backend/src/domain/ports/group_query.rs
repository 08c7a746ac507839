//! Driving port for listing the caller's groups.

use async_trait::async_trait;

use crate::domain::{Caller, Error, GroupSummary};

/// Domain use-case port for group reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupQuery: Send + Sync {
    /// The caller's groups ordered by name, with recipe counts.
    async fn list_groups(&self, caller: &Caller) -> Result<Vec<GroupSummary>, Error>;
}

/// Fixture returning an empty listing for any authenticated caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGroupQuery;

#[async_trait]
impl GroupQuery for FixtureGroupQuery {
    async fn list_groups(&self, caller: &Caller) -> Result<Vec<GroupSummary>, Error> {
        caller.require_user()?;
        Ok(Vec::new())
    }
}
