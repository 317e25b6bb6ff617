//! # Users
//!
//! Accounts, their network memberships and event registrations, and the
//! credential check behind HTTP basic auth.

use std::collections::HashMap;

use crate::auth::{hash_password, verify_password, AuthError, BasicCredentials};
use crate::observability::{log_event_with_fields, Event};
use crate::rest_api::form::{FormSource, PseudoForm, RequestForm};
use crate::rest_api::mutation::{insert_statement, update_statement, validate_required};
use crate::rest_api::pagination::{paginate, CursorKind, PageQuery, MAX_REGISTRATION_DATE_PARAM};
use crate::rest_api::selection::Predicate;
use crate::rest_api::tables::{exists, fetch_by_id, Table};
use crate::rest_api::{MessageResponse, Record, RestError, RestResult};
use crate::store::{SqlValue, Store};

use super::events::EventRole;
use super::networks::NetworkQuery;

/// Columns set when creating a user
pub const USER_FIELDS: &[&str] = &[
    "username",
    "first_name",
    "last_name",
    "email",
    "password",
    "role",
    "img_link",
    "about_me",
    "gender",
];

/// Fields a new user must supply
pub const REQUIRED_USER_FIELDS: &[&str] = &[
    "username",
    "first_name",
    "last_name",
    "email",
    "password",
    "role",
    "about_me",
    "gender",
];

/// Columns a user may change on their own account
pub const UPDATABLE_USER_FIELDS: &[&str] = &[
    "username",
    "first_name",
    "last_name",
    "email",
    "password",
    "img_link",
    "about_me",
    "gender",
];

/// Users registered in any network matching the request, newest first
pub async fn find_users(store: &Store, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let networks = NetworkQuery::from_params(params)?;
    let query = PageQuery::filtered(
        "SELECT DISTINCT users.* FROM users \
         INNER JOIN network_registration ON network_registration.id_user = users.id \
         INNER JOIN networks ON networks.id = network_registration.id_network",
        networks.predicate()?,
    )
    .order_by("users.id");

    paginate(store, &query, params).await
}

/// Create an account. The password is stored as an Argon2 hash.
pub async fn create_user(store: &Store, form: RequestForm) -> RestResult<i64> {
    validate_required(&form, REQUIRED_USER_FIELDS)?;

    let password = form
        .text("password")
        .ok_or_else(|| RestError::invalid("password must be a string"))?;
    let mut form = PseudoForm::from(form);
    form.set("password", hash(password).await?);

    let statement = insert_statement(Table::Users, USER_FIELDS, &form)?;
    let outcome = store.execute(&statement.sql, &statement.args).await?;

    let id_text = outcome.last_insert_id.to_string();
    log_event_with_fields(Event::UserCreated, &[("id", id_text.as_str())]);

    Ok(outcome.last_insert_id)
}

/// Update the caller's own account. Any `id` in the body is ignored.
pub async fn update_user(store: &Store, user_id: i64, form: RequestForm) -> RestResult<()> {
    let mut form = PseudoForm::from(form);
    if form.has("password") {
        let password = form
            .text("password")
            .ok_or_else(|| RestError::invalid("password must be a string"))?;
        form.set("password", hash(password).await?);
    }

    let statement = update_statement(Table::Users, UPDATABLE_USER_FIELDS, user_id, &form)?;
    store.execute(&statement.sql, &statement.args).await?;
    Ok(())
}

pub async fn get_user(store: &Store, id: i64) -> RestResult<Record> {
    fetch_by_id(store, Table::Users, id).await?.into_result()
}

/// Networks the user belongs to, most recently joined first
pub async fn user_networks(store: &Store, id: i64, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = PageQuery::new(
        "SELECT networks.*, network_registration.join_date FROM network_registration \
         INNER JOIN networks ON networks.id = network_registration.id_network \
         WHERE network_registration.id_user = ?",
        vec![SqlValue::Integer(id)],
    )
    .order_by("network_registration.join_date")
    .cursor(MAX_REGISTRATION_DATE_PARAM, CursorKind::Timestamp);

    paginate(store, &query, params).await
}

pub async fn user_posts(store: &Store, id: i64, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = PageQuery::filtered("SELECT * FROM posts", Predicate::eq("id_user", id));
    paginate(store, &query, params).await
}

/// Events the user hosts or attends, by role
pub async fn user_events(
    store: &Store,
    id: i64,
    role: EventRole,
    params: &HashMap<String, String>,
) -> RestResult<Vec<Record>> {
    let query = PageQuery::new(
        "SELECT events.* FROM event_registration \
         INNER JOIN events ON events.id = event_registration.id_event \
         WHERE event_registration.id_guest = ? AND event_registration.job = ?",
        vec![SqlValue::Integer(id), SqlValue::from(role.as_str())],
    )
    .order_by("events.id");

    paginate(store, &query, params).await
}

pub async fn join_event(store: &Store, user_id: i64, event_id: i64, role: EventRole) -> RestResult<()> {
    require_exists(store, Table::Events, event_id).await?;
    store
        .execute(
            "INSERT INTO event_registration (id_guest, id_event, job) VALUES (?, ?, ?)",
            &[
                SqlValue::Integer(user_id),
                SqlValue::Integer(event_id),
                SqlValue::from(role.as_str()),
            ],
        )
        .await?;
    Ok(())
}

pub async fn leave_event(store: &Store, user_id: i64, event_id: i64) -> RestResult<()> {
    require_exists(store, Table::Events, event_id).await?;
    store
        .execute(
            "DELETE FROM event_registration WHERE id_guest = ? AND id_event = ?",
            &[SqlValue::Integer(user_id), SqlValue::Integer(event_id)],
        )
        .await?;
    Ok(())
}

pub async fn join_network(store: &Store, user_id: i64, network_id: i64) -> RestResult<()> {
    require_exists(store, Table::Networks, network_id).await?;
    store
        .execute(
            "INSERT INTO network_registration (id_user, id_network) VALUES (?, ?)",
            &[SqlValue::Integer(user_id), SqlValue::Integer(network_id)],
        )
        .await
        .map_err(|err| match RestError::from(err) {
            RestError::Conflict(_) => {
                RestError::Conflict(format!("user {} already in network {}", user_id, network_id))
            }
            other => other,
        })?;
    Ok(())
}

pub async fn leave_network(store: &Store, user_id: i64, network_id: i64) -> RestResult<MessageResponse> {
    store
        .execute(
            "DELETE FROM network_registration WHERE id_user = ? AND id_network = ?",
            &[SqlValue::Integer(user_id), SqlValue::Integer(network_id)],
        )
        .await?;
    Ok(MessageResponse::new(format!(
        "User {} left network {}",
        user_id, network_id
    )))
}

/// Resolve basic-auth credentials to a user id.
///
/// The login may be a username or an email address; a username match wins
/// over another account's email. Unknown logins and wrong passwords are
/// reported the same way.
pub async fn authenticate(store: &Store, credentials: &BasicCredentials) -> RestResult<i64> {
    let rows = store
        .fetch_optional(
            "SELECT id, password FROM users WHERE username = ? OR email = ? \
             ORDER BY username = ? DESC LIMIT 1",
            &[
                SqlValue::from(credentials.login.as_str()),
                SqlValue::from(credentials.login.as_str()),
                SqlValue::from(credentials.login.as_str()),
            ],
        )
        .await?;

    let row = rows.values.first().ok_or(AuthError::InvalidCredentials)?;
    let id = row.first().and_then(|v| v.as_i64());
    let stored = row.get(1).and_then(|v| v.as_str()).map(str::to_string);
    let (id, stored) = match (id, stored) {
        (Some(id), Some(stored)) => (id, stored),
        _ => return Err(AuthError::InvalidCredentials.into()),
    };

    let password = credentials.password.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|err| RestError::Upstream(err.to_string()))?;

    if verified {
        Ok(id)
    } else {
        Err(AuthError::InvalidCredentials.into())
    }
}

async fn require_exists(store: &Store, table: Table, id: i64) -> RestResult<()> {
    if exists(store, table, id).await? {
        Ok(())
    } else {
        Err(RestError::EntityNotFound(table.entity(), id))
    }
}

/// Argon2 is CPU-bound, so it runs off the async workers
async fn hash(password: String) -> RestResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| RestError::Upstream(err.to_string()))?
        .map_err(RestError::from)
}
