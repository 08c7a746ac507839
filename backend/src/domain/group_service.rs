//! Group domain services.
//!
//! Single-row group writes and listings run here; the destructive delete is
//! handed to [`ConsistencyService`] because it spans recipes too.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::consistency::{ConsistencyService, ensure_account};
use crate::domain::ports::{
    GroupCommand, GroupQuery, GroupStore, RecipeBookStore, RecipeBookTransaction,
};
use crate::domain::transaction::{begin, finish, map_store_error};
use crate::domain::{Caller, Error, Group, GroupDeletion, GroupId, GroupName, GroupSummary, UserId};

/// Group service implementing the group driving ports.
pub struct GroupService<S> {
    store: Arc<S>,
    consistency: Arc<ConsistencyService<S>>,
    clock: Arc<dyn Clock>,
}

impl<S> GroupService<S> {
    pub fn new(
        store: Arc<S>,
        consistency: Arc<ConsistencyService<S>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            consistency,
            clock,
        }
    }
}

async fn rename_in(
    tx: &mut dyn RecipeBookTransaction,
    user: &UserId,
    id: &GroupId,
    name: String,
) -> Result<Group, Error> {
    let mut group = tx
        .find_group(id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::entity_not_found("group"))?;
    if !group.is_owned_by(user) {
        return Err(Error::forbidden("you do not own this group"));
    }
    let name = GroupName::new(name).map_err(|err| Error::invalid_field(&err))?;
    tx.update_group_name(id, &name)
        .await
        .map_err(map_store_error)?;
    group.name = name;
    Ok(group)
}

#[async_trait]
impl<S> GroupCommand for GroupService<S>
where
    S: RecipeBookStore,
{
    async fn create_group(&self, caller: &Caller, name: GroupName) -> Result<Group, Error> {
        let owner_id = *caller.require_user()?;
        let group = Group {
            id: GroupId::random(),
            name,
            owner_id,
            created_at: self.clock.utc(),
        };
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = async {
            ensure_account(tx.as_mut(), &owner_id).await?;
            tx.insert_group(&group).await.map_err(map_store_error)
        }
        .await;
        finish(tx, outcome).await?;
        Ok(group)
    }

    async fn rename_group(
        &self,
        caller: &Caller,
        id: &GroupId,
        name: String,
    ) -> Result<Group, Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = rename_in(tx.as_mut(), user, id, name).await;
        finish(tx, outcome).await
    }

    async fn delete_group(&self, caller: &Caller, id: &GroupId) -> Result<GroupDeletion, Error> {
        self.consistency.delete_group(caller, id).await
    }
}

#[async_trait]
impl<S> GroupQuery for GroupService<S>
where
    S: RecipeBookStore,
{
    async fn list_groups(&self, caller: &Caller) -> Result<Vec<GroupSummary>, Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx.list_groups(user).await.map_err(map_store_error);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
