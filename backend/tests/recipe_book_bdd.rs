//! Behaviour tests for the recipe book HTTP surface.
//!
//! Scenarios run against the in-memory store through the real domain
//! services, covering the group-delete cascade, replace-all ingredient
//! updates, title uniqueness and ownership checks.
#![expect(
    non_snake_case,
    reason = "rstest-bdd generates guard variables with double underscores"
)]

#[path = "support/recipe_book_world.rs"]
mod support;

use actix_web::http::Method;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use support::{RecipeBookWorld, recipe_payload, split_list};

#[fixture]
fn world() -> RecipeBookWorld {
    RecipeBookWorld::new()
}

#[given("a registered user {user}")]
fn a_registered_user(world: &RecipeBookWorld, user: String) {
    world.register(&user);
}

#[given("{user} owns a group {name}")]
fn user_owns_a_group(world: &RecipeBookWorld, user: String, name: String) {
    world.create_group(&user, &name);
}

#[given("{user} has a recipe {title} in groups {groups}")]
fn user_has_a_recipe_in_groups(
    world: &RecipeBookWorld,
    user: String,
    title: String,
    groups: String,
) {
    let payload = recipe_payload(&title, world.group_ids(&groups));
    let reply = world.send(Some(&user), Method::POST, "/recipes", Some(payload));
    assert_eq!(reply.status, 201, "create recipe {title}: {}", reply.body);
    let id = reply.body["id"].as_str().expect("recipe id").to_owned();
    world.remember_recipe(&title, id);
}

#[when("{user} deletes the group {name}")]
fn user_deletes_the_group(world: &RecipeBookWorld, user: String, name: String) {
    let path = format!("/groups/{}", world.group_id(&name));
    world.send(Some(&user), Method::DELETE, &path, None);
}

#[when("{user} replaces the ingredients of {title} with {names}")]
fn user_replaces_the_ingredients(
    world: &RecipeBookWorld,
    user: String,
    title: String,
    names: String,
) {
    let ingredients: Vec<Value> = split_list(&names)
        .into_iter()
        .map(|name| json!({ "name": name, "quantity": "1" }))
        .collect();
    let path = format!("/recipes/{}", world.recipe_id(&title));
    world.send(
        Some(&user),
        Method::PUT,
        &path,
        Some(json!({ "ingredients": ingredients })),
    );
}

#[when("{user} creates a recipe titled {title}")]
fn user_creates_a_recipe_titled(world: &RecipeBookWorld, user: String, title: String) {
    world.send(
        Some(&user),
        Method::POST,
        "/recipes",
        Some(recipe_payload(&title, Vec::new())),
    );
}

#[when("{user} deletes the recipe {title}")]
fn user_deletes_the_recipe(world: &RecipeBookWorld, user: String, title: String) {
    let path = format!("/recipes/{}", world.recipe_id(&title));
    world.send(Some(&user), Method::DELETE, &path, None);
}

#[when("an anonymous client creates a group {name}")]
fn an_anonymous_client_creates_a_group(world: &RecipeBookWorld, name: String) {
    world.send(None, Method::POST, "/groups", Some(json!({ "name": name })));
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &RecipeBookWorld, status: u16) {
    let reply = world.last();
    assert_eq!(reply.status, status, "body: {}", reply.body);
}

#[then("the response reports {count} deleted recipes")]
fn the_response_reports_deleted_recipes(world: &RecipeBookWorld, count: u64) {
    assert_eq!(
        world.last().body["deletedRecipesCount"].as_u64(),
        Some(count)
    );
}

#[then("the recipe {title} no longer exists")]
fn the_recipe_no_longer_exists(world: &RecipeBookWorld, title: String) {
    let path = format!("/recipes/{}", world.recipe_id(&title));
    let reply = world.send(None, Method::GET, &path, None);
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body["code"], "not_found");
}

#[then("the recipe {title} still exists")]
fn the_recipe_still_exists(world: &RecipeBookWorld, title: String) {
    let path = format!("/recipes/{}", world.recipe_id(&title));
    let reply = world.send(None, Method::GET, &path, None);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["title"], title.as_str());
}

#[then("{user} sees {count} recipe in the group {name}")]
fn user_sees_recipes_in_the_group(
    world: &RecipeBookWorld,
    user: String,
    count: u64,
    name: String,
) {
    let group_id = world.group_id(&name);
    let reply = world.send(Some(&user), Method::GET, "/groups", None);
    assert_eq!(reply.status, 200);
    let groups = reply.body.as_array().expect("group list");
    let group = groups
        .iter()
        .find(|group| group["id"] == group_id.as_str())
        .unwrap_or_else(|| panic!("group {name} listed"));
    assert_eq!(group["recipeCount"].as_u64(), Some(count));
}

#[then("the recipe lists ingredients {names} in positions {positions}")]
fn the_recipe_lists_ingredients(world: &RecipeBookWorld, names: String, positions: String) {
    let body = world.last().body;
    let ingredients = body["ingredients"].as_array().expect("ingredients");
    let actual_names: Vec<&str> = ingredients
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    let actual_positions: Vec<String> = ingredients
        .iter()
        .map(|item| item["position"].to_string())
        .collect();
    assert_eq!(actual_names, split_list(&names));
    assert_eq!(actual_positions, split_list(&positions));
}

#[then("the error names the field {field}")]
fn the_error_names_the_field(world: &RecipeBookWorld, field: String) {
    let body = world.last().body;
    assert_eq!(body["details"]["field"], field.as_str());
}

#[then("the error body carries the response trace id")]
fn the_error_body_carries_the_trace_id(world: &RecipeBookWorld) {
    let reply = world.last();
    let trace_id = reply.trace_id.expect("trace id header");
    assert_eq!(reply.body["traceId"].as_str(), Some(trace_id.as_str()));
}

#[scenario(
    path = "tests/features/recipe_book.feature",
    name = "Deleting a group removes every recipe linked to it"
)]
fn deleting_a_group_removes_linked_recipes(world: RecipeBookWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_book.feature",
    name = "Updating ingredients replaces the whole list"
)]
fn updating_ingredients_replaces_the_list(world: RecipeBookWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_book.feature",
    name = "Recipe titles are unique across users"
)]
fn recipe_titles_are_unique(world: RecipeBookWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_book.feature",
    name = "Only the owner may delete a recipe"
)]
fn only_the_owner_may_delete(world: RecipeBookWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipe_book.feature",
    name = "Anonymous clients cannot create groups"
)]
fn anonymous_clients_cannot_create_groups(world: RecipeBookWorld) {
    drop(world);
}
