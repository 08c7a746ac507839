//! Recipe read service. Reads are open to anonymous callers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{RecipeBookStore, RecipeListRequest, RecipeQuery, RecipeStore};
use crate::domain::transaction::{begin, finish, map_store_error};
use crate::domain::{Caller, Error, RecipeAggregate, RecipeFilter, RecipeId};

/// Recipe service implementing the recipe query driving port.
pub struct RecipeQueryService<S> {
    store: Arc<S>,
}

impl<S> RecipeQueryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> RecipeQuery for RecipeQueryService<S>
where
    S: RecipeBookStore,
{
    async fn get_recipe(&self, id: &RecipeId) -> Result<RecipeAggregate, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx
            .load_aggregate(id)
            .await
            .map_err(map_store_error)
            .and_then(|found| found.ok_or_else(|| Error::entity_not_found("recipe")));
        finish(tx, outcome).await
    }

    async fn list_recipes(
        &self,
        caller: &Caller,
        request: RecipeListRequest,
    ) -> Result<Vec<RecipeAggregate>, Error> {
        let filter = RecipeFilter::for_caller(caller, request.mine, request.search);
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx.load_aggregates(&filter).await.map_err(map_store_error);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{IdentityStore, RecipeBookTransaction};
    use crate::domain::{
        EmailAddress, ErrorCode, IngredientDraft, Recipe, RecipeDraft, RecipeInput, StepDraft,
        User, UserId, Username, position_ingredients, position_steps,
    };
    use crate::outbound::memory::InMemoryRecipeBookStore;

    async fn seed(tx: &mut dyn RecipeBookTransaction, owner: &User, title: &str) -> RecipeId {
        let draft = RecipeDraft::try_from(RecipeInput {
            title: Some(title.to_owned()),
            ingredients: Some(vec![IngredientDraft {
                name: "Salt".to_owned(),
                quantity: String::new(),
            }]),
            steps: Some(vec![StepDraft {
                description: "Stir".to_owned(),
            }]),
            ..RecipeInput::default()
        })
        .expect("valid draft");
        let recipe = Recipe::from_draft(&draft, owner.id, Utc::now());
        tx.insert_recipe(&recipe).await.expect("insert recipe");
        tx.insert_ingredients(&recipe.id, &position_ingredients(draft.ingredients))
            .await
            .expect("insert ingredients");
        tx.insert_steps(&recipe.id, &position_steps(draft.steps))
            .await
            .expect("insert steps");
        recipe.id
    }

    fn user(name: &str) -> User {
        User {
            id: UserId::random(),
            username: Username::new(name).expect("username"),
            email: EmailAddress::new(format!("{name}@example.com")).expect("email"),
            created_at: Utc::now(),
        }
    }

    async fn populated() -> (RecipeQueryService<InMemoryRecipeBookStore>, User, User) {
        let store = Arc::new(InMemoryRecipeBookStore::new());
        let ana = user("ana");
        let bea = user("bea");
        let mut tx = store.begin().await.expect("begin");
        tx.insert_user(&ana, "hash").await.expect("ana");
        tx.insert_user(&bea, "hash").await.expect("bea");
        seed(tx.as_mut(), &ana, "Tacos").await;
        seed(tx.as_mut(), &ana, "Arepas").await;
        seed(tx.as_mut(), &bea, "Taco salad").await;
        tx.commit().await.expect("commit");
        (RecipeQueryService::new(store), ana, bea)
    }

    fn titles(aggregates: &[RecipeAggregate]) -> Vec<&str> {
        aggregates
            .iter()
            .map(|aggregate| aggregate.recipe.title.as_ref())
            .collect()
    }

    #[rstest]
    #[case(Caller::Anonymous, false, None, vec!["Arepas", "Taco salad", "Tacos"])]
    #[case(Caller::Anonymous, true, None, vec!["Arepas", "Taco salad", "Tacos"])]
    #[case(Caller::Anonymous, false, Some("TACO"), vec!["Taco salad", "Tacos"])]
    #[tokio::test]
    async fn anonymous_listing_ignores_mine(
        #[case] caller: Caller,
        #[case] mine: bool,
        #[case] search: Option<&str>,
        #[case] expected: Vec<&str>,
    ) {
        let (service, _, _) = populated().await;
        let request = RecipeListRequest {
            mine,
            search: search.map(str::to_owned),
        };
        let listed = service
            .list_recipes(&caller, request)
            .await
            .expect("listing");
        assert_eq!(titles(&listed), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn mine_narrows_to_the_authenticated_owner() {
        let (service, ana, _) = populated().await;
        let request = RecipeListRequest {
            mine: true,
            search: Some("tac".to_owned()),
        };
        let listed = service
            .list_recipes(&Caller::Authenticated(ana.id), request)
            .await
            .expect("listing");
        assert_eq!(titles(&listed), vec!["Tacos"]);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let (service, _, _) = populated().await;
        let err = service
            .get_recipe(&RecipeId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
