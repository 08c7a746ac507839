//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update this file alongside it (or regenerate it
//! with `diesel print-schema`).

diesel::table! {
    /// Registered accounts. `username` and `email` carry unique constraints.
    users (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        /// PHC-formatted Argon2 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Personal recipe collections.
    groups (id) {
        id -> Uuid,
        name -> Text,
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe headers. `title` is globally unique.
    recipes (id) {
        id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        image_url -> Text,
        prep_time -> Nullable<Text>,
        servings -> Nullable<Int4>,
        owner_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        name -> Text,
        quantity -> Text,
        /// Zero-based, dense within one recipe.
        position -> Int4,
    }
}

diesel::table! {
    steps (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        description -> Text,
        /// Zero-based, dense within one recipe.
        position -> Int4,
    }
}

diesel::table! {
    /// Many-to-many membership of recipes in groups.
    recipe_groups (recipe_id, group_id) {
        recipe_id -> Uuid,
        group_id -> Uuid,
    }
}

diesel::joinable!(groups -> users (owner_id));
diesel::joinable!(recipes -> users (owner_id));
diesel::joinable!(ingredients -> recipes (recipe_id));
diesel::joinable!(steps -> recipes (recipe_id));
diesel::joinable!(recipe_groups -> recipes (recipe_id));
diesel::joinable!(recipe_groups -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    groups,
    recipes,
    ingredients,
    steps,
    recipe_groups,
);
