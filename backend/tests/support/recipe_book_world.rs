//! World for recipe book behaviour tests.
//!
//! Every request goes through a freshly initialised actix service that shares
//! one in-memory store, so state carries across steps without a socket.
//! Actix needs its own system, so the world owns a `SystemRunner` and blocks
//! on it from the synchronous step functions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::rt::{System, SystemRunner};
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use recipe_backend::Trace;
use recipe_backend::domain::TRACE_ID_HEADER;
use recipe_backend::inbound::http::auth::{
    delete_account, get_profile, login, register, update_profile,
};
use recipe_backend::inbound::http::error::{
    json_error_handler, path_error_handler, query_error_handler,
};
use recipe_backend::inbound::http::groups::{
    create_group, delete_group, list_groups, rename_group,
};
use recipe_backend::inbound::http::recipes::{
    attach_to_groups, create_recipe, delete_recipe, detach_from_group, get_recipe, list_recipes,
    update_recipe,
};
use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::outbound::memory::InMemoryRecipeBookStore;
use recipe_backend::outbound::security::{Argon2PasswordHasher, HmacTokenIssuer};

/// Outcome of the most recent request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

pub(crate) struct RecipeBookWorld {
    runner: SystemRunner,
    state: web::Data<HttpState>,
    tokens: RefCell<HashMap<String, String>>,
    groups: RefCell<HashMap<String, String>>,
    recipes: RefCell<HashMap<String, String>>,
    last: RefCell<Option<Reply>>,
}

impl RecipeBookWorld {
    pub(crate) fn new() -> Self {
        let runner = System::new();
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let hasher = Arc::new(Argon2PasswordHasher::new().expect("password hasher"));
        let tokens = Arc::new(
            HmacTokenIssuer::new(HmacTokenIssuer::generate_key(), clock.clone())
                .expect("token issuer"),
        );
        let store = Arc::new(InMemoryRecipeBookStore::new());
        let state = web::Data::new(HttpState::from_store(store, hasher, tokens, clock));
        Self {
            runner,
            state,
            tokens: RefCell::new(HashMap::new()),
            groups: RefCell::new(HashMap::new()),
            recipes: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        }
    }

    /// Send a JSON request as `user`, or anonymously when `user` is `None`.
    pub(crate) fn send(
        &self,
        user: Option<&str>,
        method: Method,
        path: &str,
        payload: Option<Value>,
    ) -> Reply {
        let token = user.map(|name| self.token(name));
        let state = self.state.clone();
        let uri = format!("/api/v1{path}");
        let reply = self.runner.block_on(async move {
            let app = test::init_service(
                App::new()
                    .app_data(state)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .app_data(web::PathConfig::default().error_handler(path_error_handler))
                    .wrap(Trace)
                    .service(
                        web::scope("/api/v1")
                            .service(register)
                            .service(login)
                            .service(get_profile)
                            .service(update_profile)
                            .service(delete_account)
                            .service(create_group)
                            .service(list_groups)
                            .service(rename_group)
                            .service(delete_group)
                            .service(list_recipes)
                            .service(get_recipe)
                            .service(create_recipe)
                            .service(update_recipe)
                            .service(delete_recipe)
                            .service(attach_to_groups)
                            .service(detach_from_group),
                    ),
            )
            .await;
            let mut request = test::TestRequest::default().method(method).uri(&uri);
            if let Some(token) = token {
                request = request.insert_header(("Authorization", format!("Bearer {token}")));
            }
            if let Some(payload) = payload {
                request = request.set_json(payload);
            }
            let response = test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let trace_id = response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned);
            let bytes = test::read_body(response).await;
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            Reply {
                status,
                trace_id,
                body,
            }
        });
        *self.last.borrow_mut() = Some(reply.clone());
        reply
    }

    pub(crate) fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a request has been sent")
    }

    fn token(&self, user: &str) -> String {
        self.tokens
            .borrow()
            .get(user)
            .cloned()
            .unwrap_or_else(|| panic!("{user} is not registered"))
    }

    pub(crate) fn register(&self, user: &str) {
        let reply = self.send(
            None,
            Method::POST,
            "/auth/register",
            Some(json!({
                "username": user,
                "email": format!("{user}@example.com"),
                "password": "correct horse",
            })),
        );
        assert_eq!(reply.status, 201, "register {user}: {}", reply.body);
        let token = reply.body["token"].as_str().expect("token").to_owned();
        self.tokens.borrow_mut().insert(user.to_owned(), token);
    }

    pub(crate) fn create_group(&self, user: &str, name: &str) {
        let reply = self.send(
            Some(user),
            Method::POST,
            "/groups",
            Some(json!({ "name": name })),
        );
        assert_eq!(reply.status, 201, "create group {name}: {}", reply.body);
        let id = reply.body["id"].as_str().expect("group id").to_owned();
        self.groups.borrow_mut().insert(name.to_owned(), id);
    }

    /// Group ids for a comma-separated list of names; `none` means empty.
    pub(crate) fn group_ids(&self, names: &str) -> Vec<String> {
        split_list(names)
            .into_iter()
            .map(|name| self.group_id(&name))
            .collect()
    }

    pub(crate) fn group_id(&self, name: &str) -> String {
        self.groups
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unknown group {name}"))
    }

    pub(crate) fn remember_recipe(&self, title: &str, id: String) {
        self.recipes.borrow_mut().insert(title.to_owned(), id);
    }

    pub(crate) fn recipe_id(&self, title: &str) -> String {
        self.recipes
            .borrow()
            .get(title)
            .cloned()
            .unwrap_or_else(|| panic!("unknown recipe {title}"))
    }
}

/// Split a comma-separated step argument.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    if raw == "none" {
        return Vec::new();
    }
    raw.split(',').map(|item| item.trim().to_owned()).collect()
}

/// Minimal valid recipe body with three ingredients and two steps.
pub(crate) fn recipe_payload(title: &str, group_ids: Vec<String>) -> Value {
    json!({
        "title": title,
        "description": format!("{title} for tests"),
        "servings": 2,
        "ingredients": [
            { "name": "Tortilla", "quantity": "4" },
            { "name": "Beans", "quantity": "1 can" },
            { "name": "Cheese", "quantity": "100 g" },
        ],
        "steps": [
            { "description": "Warm everything" },
            { "description": "Assemble" },
        ],
        "groupIds": group_ids,
    })
}
