//! Driving port for group changes.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Caller, Error, Group, GroupDeletion, GroupId, GroupName};

/// Domain use-case port for creating, renaming and deleting groups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupCommand: Send + Sync {
    async fn create_group(&self, caller: &Caller, name: GroupName) -> Result<Group, Error>;

    /// Rename a group. The new name is validated only after existence and
    /// ownership have been confirmed.
    async fn rename_group(
        &self,
        caller: &Caller,
        id: &GroupId,
        name: String,
    ) -> Result<Group, Error>;

    /// Delete the group and every recipe linked to it, whoever owns them.
    async fn delete_group(&self, caller: &Caller, id: &GroupId) -> Result<GroupDeletion, Error>;
}

/// Fixture group commands that never touch storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGroupCommand;

#[async_trait]
impl GroupCommand for FixtureGroupCommand {
    async fn create_group(&self, caller: &Caller, name: GroupName) -> Result<Group, Error> {
        let owner_id = *caller.require_user()?;
        Ok(Group {
            id: GroupId::random(),
            name,
            owner_id,
            created_at: Utc::now(),
        })
    }

    async fn rename_group(
        &self,
        caller: &Caller,
        id: &GroupId,
        name: String,
    ) -> Result<Group, Error> {
        let owner_id = *caller.require_user()?;
        let name = GroupName::new(name).map_err(|err| Error::invalid_field(&err))?;
        Ok(Group {
            id: *id,
            name,
            owner_id,
            created_at: Utc::now(),
        })
    }

    async fn delete_group(&self, caller: &Caller, _id: &GroupId) -> Result<GroupDeletion, Error> {
        caller.require_user()?;
        Ok(GroupDeletion {
            deleted_recipe_count: 0,
        })
    }
}
