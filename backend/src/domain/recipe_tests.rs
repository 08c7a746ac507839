//! Tests for recipe drafts, patches and aggregate assembly.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

fn ingredient(name: &str) -> IngredientDraft {
    IngredientDraft {
        name: name.to_owned(),
        quantity: "1".to_owned(),
    }
}

fn step(description: &str) -> StepDraft {
    StepDraft {
        description: description.to_owned(),
    }
}

#[fixture]
fn tacos_input() -> RecipeInput {
    RecipeInput {
        title: Some("Tacos".to_owned()),
        ingredients: Some(vec![ingredient("Tortilla")]),
        steps: Some(vec![step("Fry")]),
        ..RecipeInput::default()
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
        .single()
        .expect("valid fixture timestamp")
}

#[rstest]
fn draft_accepts_minimal_recipe(tacos_input: RecipeInput) {
    let draft = RecipeDraft::try_from(tacos_input).expect("valid draft");
    assert_eq!(draft.title.as_ref(), "Tacos");
    assert_eq!(draft.image_url, DEFAULT_IMAGE_URL);
}

#[rstest]
fn draft_keeps_supplied_image(mut tacos_input: RecipeInput) {
    tacos_input.image_url = Some("https://img.example/tacos.png".to_owned());
    let draft = RecipeDraft::try_from(tacos_input).expect("valid draft");
    assert_eq!(draft.image_url, "https://img.example/tacos.png");
}

#[rstest]
fn draft_reports_title_before_lists() {
    let input = RecipeInput {
        title: Some("  ".to_owned()),
        ..RecipeInput::default()
    };
    assert_eq!(
        RecipeDraft::try_from(input),
        Err(RecipeValidationError::EmptyTitle)
    );
}

#[rstest]
#[case(None, Some(vec![step("Fry")]), RecipeValidationError::MissingIngredients)]
#[case(Some(vec![]), None, RecipeValidationError::MissingIngredients)]
#[case(Some(vec![ingredient("Salt")]), None, RecipeValidationError::MissingSteps)]
#[case(Some(vec![ingredient("Salt")]), Some(vec![]), RecipeValidationError::MissingSteps)]
#[case(Some(vec![ingredient("Salt"), ingredient(" ")]), Some(vec![step("Fry")]), RecipeValidationError::EmptyIngredientName { index: 1 })]
#[case(Some(vec![ingredient("Salt")]), Some(vec![step("")]), RecipeValidationError::EmptyStepDescription { index: 0 })]
fn draft_rejects_empty_children(
    mut tacos_input: RecipeInput,
    #[case] ingredients: Option<Vec<IngredientDraft>>,
    #[case] steps: Option<Vec<StepDraft>>,
    #[case] expected: RecipeValidationError,
) {
    tacos_input.ingredients = ingredients;
    tacos_input.steps = steps;
    assert_eq!(RecipeDraft::try_from(tacos_input), Err(expected));
}

#[rstest]
fn patch_leaves_absent_lists_alone() {
    let patch = RecipePatch::try_from(RecipePatchInput::default()).expect("empty patch");
    assert!(patch.ingredients.is_none());
    assert!(patch.steps.is_none());
    assert!(patch.group_ids.is_none());
}

#[rstest]
fn patch_rejects_supplied_empty_lists() {
    let input = RecipePatchInput {
        steps: Some(vec![]),
        ..RecipePatchInput::default()
    };
    assert_eq!(
        RecipePatch::try_from(input),
        Err(RecipeValidationError::MissingSteps)
    );
}

#[rstest]
fn patch_keeps_explicit_empty_group_list() {
    let input = RecipePatchInput {
        group_ids: Some(vec![]),
        ..RecipePatchInput::default()
    };
    let patch = RecipePatch::try_from(input).expect("valid patch");
    assert_eq!(patch.group_ids, Some(vec![]));
}

#[rstest]
fn positions_are_dense_and_ordered() {
    let positioned = position_ingredients(vec![ingredient("a"), ingredient("b"), ingredient("c")]);
    let positions: Vec<u32> = positioned.iter().map(|item| item.position).collect();
    let names: Vec<&str> = positioned.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[rstest]
fn apply_fields_only_touches_supplied_values(tacos_input: RecipeInput) {
    let draft = RecipeDraft::try_from(tacos_input).expect("valid draft");
    let mut recipe = Recipe::from_draft(&draft, UserId::random(), fixed_now());
    let patch = RecipePatch {
        servings: Some(4),
        ..RecipePatch::default()
    };
    recipe.apply_fields(&patch, fixed_now());

    assert_eq!(recipe.title.as_ref(), "Tacos");
    assert_eq!(recipe.servings, Some(4));
    assert_eq!(recipe.image_url, DEFAULT_IMAGE_URL);
}

#[rstest]
#[case(Some("tAc"), true)]
#[case(Some("burrito"), false)]
#[case(None, true)]
fn title_search_is_case_insensitive(#[case] search: Option<&str>, #[case] expected: bool) {
    let filter = RecipeFilter {
        owner: None,
        title_search: search.map(str::to_owned),
    };
    let title = RecipeTitle::new("Tacos").expect("valid title");
    assert_eq!(filter.matches_title(&title), expected);
}

#[rstest]
fn mine_filter_requires_authentication() {
    let user = UserId::random();
    let filter = RecipeFilter::for_caller(&Caller::Authenticated(user), true, None);
    assert_eq!(filter.owner, Some(user));
}

#[rstest]
fn assemble_orders_children_by_position(tacos_input: RecipeInput) {
    let draft = RecipeDraft::try_from(tacos_input).expect("valid draft");
    let owner = OwnerSummary {
        id: UserId::random(),
        username: crate::domain::Username::new("ana").expect("valid username"),
    };
    let recipe = Recipe::from_draft(&draft, owner.id, fixed_now());
    let mut ingredients = position_ingredients(vec![ingredient("first"), ingredient("second")]);
    ingredients.reverse();

    let parts = AggregateParts {
        recipes: vec![recipe.clone()],
        ingredients: ingredients.into_iter().map(|item| (recipe.id, item)).collect(),
        steps: position_steps(vec![step("Fry")])
            .into_iter()
            .map(|item| (recipe.id, item))
            .collect(),
        memberships: Vec::new(),
        owners: vec![owner.clone()],
    };

    let aggregates = parts.assemble().expect("owner present");
    let [aggregate] = aggregates.as_slice() else {
        panic!("expected exactly one aggregate");
    };
    assert_eq!(aggregate.ingredients[0].name, "first");
    assert_eq!(aggregate.ingredients[1].name, "second");
    assert_eq!(aggregate.owner, owner);
}

#[rstest]
fn assemble_reports_missing_owner(tacos_input: RecipeInput) {
    let draft = RecipeDraft::try_from(tacos_input).expect("valid draft");
    let recipe = Recipe::from_draft(&draft, UserId::random(), fixed_now());
    let parts = AggregateParts {
        recipes: vec![recipe.clone()],
        ..AggregateParts::default()
    };
    assert_eq!(parts.assemble(), Err(MissingOwner(recipe.id)));
}
