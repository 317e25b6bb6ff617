//! # Events
//!
//! Events belong to a network and have one host. Creating an event also
//! registers its host, and deleting it removes every registration.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::rest_api::form::{FormSource, PseudoForm, RequestForm};
use crate::rest_api::mutation::{insert_statement, update_statement, validate_required};
use crate::rest_api::pagination::{paginate, CursorKind, PageQuery, MAX_REGISTRATION_DATE_PARAM};
use crate::rest_api::selection::{require_id, Predicate};
use crate::rest_api::tables::{fetch_by_id, fetch_single, Table};
use crate::rest_api::{Record, RestError, RestResult};
use crate::store::{SqlValue, Statement, Store};

/// Columns set when creating an event
pub const EVENT_FIELDS: &[&str] = &[
    "id_network",
    "id_host",
    "event_date",
    "title",
    "address_1",
    "address_2",
    "country",
    "city",
    "region",
    "description",
];

/// Columns the host may change
pub const UPDATABLE_EVENT_FIELDS: &[&str] = &[
    "event_date",
    "title",
    "address_1",
    "address_2",
    "country",
    "city",
    "region",
    "description",
];

pub const ROLE_PARAM: &str = "role";

/// A user's part in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    Host,
    Guest,
}

impl EventRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventRole::Host => "host",
            EventRole::Guest => "guest",
        }
    }

    /// Parse the `role` query parameter
    pub fn parse(raw: Option<&str>) -> RestResult<Self> {
        match raw.map(str::trim) {
            Some("host") => Ok(EventRole::Host),
            Some("guest") => Ok(EventRole::Guest),
            Some(other) => Err(RestError::invalid(format!(
                "role must be host or guest, got '{}'",
                other
            ))),
            None => Err(RestError::MissingParam(ROLE_PARAM.to_string())),
        }
    }
}

impl fmt::Display for EventRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub async fn get_event(store: &Store, id: i64) -> RestResult<Record> {
    fetch_by_id(store, Table::Events, id).await?.into_result()
}

/// Registrations for an event, most recent first
pub async fn event_registrations(
    store: &Store,
    id: i64,
    params: &HashMap<String, String>,
) -> RestResult<Vec<Record>> {
    let query = PageQuery::filtered("SELECT * FROM event_registration", Predicate::eq("id_event", id))
        .order_by("date_registered")
        .cursor(MAX_REGISTRATION_DATE_PARAM, CursorKind::Timestamp);

    paginate(store, &query, params).await
}

/// `{"reg_count": n}`
pub async fn registration_count(store: &Store, id: i64) -> RestResult<Record> {
    fetch_single(
        store,
        "SELECT count(*) AS reg_count FROM event_registration WHERE id_event = ?",
        &[SqlValue::Integer(id)],
    )
    .await?
    .into_result()
}

/// Create an event hosted by `host_id` and register the host, atomically
pub async fn create_event(store: &Store, host_id: i64, form: RequestForm) -> RestResult<i64> {
    let mut form = PseudoForm::from(form);
    form.set("id_host", host_id);
    validate_required(&form, &["id_network"])?;

    let insert = insert_statement(Table::Events, EVENT_FIELDS, &form)?;
    let register_host = Statement::new(
        "INSERT INTO event_registration (id_guest, id_event, job) VALUES (?, last_insert_rowid(), ?)",
        vec![SqlValue::Integer(host_id), SqlValue::from(EventRole::Host.as_str())],
    );

    let outcomes = store.execute_all(&[insert, register_host]).await?;
    let id = outcomes
        .first()
        .map(|outcome| outcome.last_insert_id)
        .ok_or_else(|| RestError::Upstream("event insert reported no outcome".to_string()))?;

    let id_text = id.to_string();
    let host_text = host_id.to_string();
    log_event_with_fields(
        Event::EventCreated,
        &[("host", host_text.as_str()), ("id", id_text.as_str())],
    );

    Ok(id)
}

/// Update the event named by the body's `id`. Only its host may.
pub async fn update_event(store: &Store, user_id: i64, form: RequestForm) -> RestResult<()> {
    let id = form
        .text("id")
        .ok_or_else(|| RestError::MissingParam("id".to_string()))?;
    let id = require_id(&id)?;

    require_host(store, user_id, id).await?;

    let mut form = PseudoForm::from(form);
    form.remove("id_host");
    let statement = update_statement(Table::Events, UPDATABLE_EVENT_FIELDS, id, &form)?;
    store.execute(&statement.sql, &statement.args).await?;
    Ok(())
}

/// Events in a network that the user hosts or is registered for
pub async fn user_events_for_network(
    store: &Store,
    user_id: i64,
    network_id: i64,
    params: &HashMap<String, String>,
) -> RestResult<Vec<Record>> {
    let query = PageQuery::new(
        "SELECT DISTINCT events.* FROM events \
         LEFT JOIN event_registration ON event_registration.id_event = events.id \
         WHERE (event_registration.id_guest = ? OR events.id_host = ?) AND events.id_network = ?",
        vec![
            SqlValue::Integer(user_id),
            SqlValue::Integer(user_id),
            SqlValue::Integer(network_id),
        ],
    )
    .order_by("events.id");

    paginate(store, &query, params).await
}

/// Delete an event and its registrations. Only its host may.
pub async fn delete_event(store: &Store, user_id: i64, id: i64) -> RestResult<()> {
    require_host(store, user_id, id).await?;

    store
        .execute_all(&[
            Statement::new(
                "DELETE FROM event_registration WHERE id_event = ?",
                vec![SqlValue::Integer(id)],
            ),
            Statement::new("DELETE FROM events WHERE id = ?", vec![SqlValue::Integer(id)]),
        ])
        .await?;
    Ok(())
}

async fn require_host(store: &Store, user_id: i64, event_id: i64) -> RestResult<()> {
    let event = fetch_by_id(store, Table::Events, event_id)
        .await?
        .found()
        .ok_or(RestError::EntityNotFound("event", event_id))?;

    match event.get("id_host").and_then(Value::as_i64) {
        Some(host) if host == user_id => Ok(()),
        _ => Err(RestError::Forbidden(format!(
            "only the host may modify event {}",
            event_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::fixtures::{create_user, seed_network, test_store};
    use crate::social::users::{join_event, user_events};
    use serde_json::json;

    fn body(value: serde_json::Value) -> RequestForm {
        RequestForm::from_body(value).unwrap()
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(EventRole::parse(Some("host")).unwrap(), EventRole::Host);
        assert_eq!(EventRole::parse(Some("guest")).unwrap(), EventRole::Guest);
        assert!(matches!(EventRole::parse(Some("admin")), Err(RestError::InvalidArgument(_))));
        assert!(matches!(EventRole::parse(None), Err(RestError::MissingParam(_))));
    }

    #[tokio::test]
    async fn test_create_event_registers_host() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;
        let network = seed_network(&store).await;

        let id = create_event(
            &store,
            host,
            body(json!({"id_network": network, "title": "Cawl night", "address_2": "-1"})),
        )
        .await
        .unwrap();

        let event = get_event(&store, id).await.unwrap();
        assert_eq!(event["id_host"], json!(host));
        assert_eq!(event["address_2"], json!(null));

        let registrations = event_registrations(&store, id, &HashMap::new()).await.unwrap();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0]["id_guest"], json!(host));
        assert_eq!(registrations[0]["job"], json!("host"));

        let hosting = user_events(&store, host, EventRole::Host, &HashMap::new()).await.unwrap();
        assert_eq!(hosting.len(), 1);
        assert_eq!(registration_count(&store, id).await.unwrap()["reg_count"], json!(1));
    }

    #[tokio::test]
    async fn test_create_event_ignores_client_host() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;
        let other = create_user(&store, "iolo").await;
        let network = seed_network(&store).await;

        let id = create_event(
            &store,
            host,
            body(json!({"id_network": network, "id_host": other, "title": "Noson lawen"})),
        )
        .await
        .unwrap();

        assert_eq!(get_event(&store, id).await.unwrap()["id_host"], json!(host));
    }

    #[tokio::test]
    async fn test_create_event_in_missing_network_leaves_nothing() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;

        let err = create_event(&store, host, body(json!({"id_network": 77, "title": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));

        let rows = store.fetch("SELECT * FROM event_registration", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_create_event_without_network_is_missing() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;

        for network in [json!(-1), json!("-1"), json!("")] {
            let err = create_event(&store, host, body(json!({"id_network": network, "title": "x"})))
                .await
                .unwrap_err();
            assert!(matches!(err, RestError::MissingParam(ref name) if name == "id_network"));
        }

        let rows = store.fetch("SELECT * FROM events", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_only_host_updates_and_deletes() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;
        let guest = create_user(&store, "iolo").await;
        let network = seed_network(&store).await;
        let id = create_event(&store, host, body(json!({"id_network": network, "title": "Cawl"})))
            .await
            .unwrap();

        let rename = json!({"id": id, "title": "Cawl and cân"});
        assert!(matches!(
            update_event(&store, guest, body(rename.clone())).await,
            Err(RestError::Forbidden(_))
        ));
        update_event(&store, host, body(rename)).await.unwrap();
        assert_eq!(get_event(&store, id).await.unwrap()["title"], json!("Cawl and cân"));

        join_event(&store, guest, id, EventRole::Guest).await.unwrap();
        assert!(matches!(
            delete_event(&store, guest, id).await,
            Err(RestError::Forbidden(_))
        ));

        delete_event(&store, host, id).await.unwrap();
        assert!(matches!(get_event(&store, id).await, Err(RestError::NotFound)));
        let rows = store.fetch("SELECT * FROM event_registration", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_event() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;

        assert!(matches!(
            update_event(&store, host, body(json!({"title": "x"}))).await,
            Err(RestError::MissingParam(_))
        ));
        assert!(matches!(
            update_event(&store, host, body(json!({"id": 9, "title": "x"}))).await,
            Err(RestError::EntityNotFound("event", 9))
        ));
    }

    #[tokio::test]
    async fn test_user_events_for_network_has_no_duplicates() {
        let store = test_store().await;
        let host = create_user(&store, "maria").await;
        let guest = create_user(&store, "iolo").await;
        let network = seed_network(&store).await;
        let id = create_event(&store, host, body(json!({"id_network": network})))
            .await
            .unwrap();
        join_event(&store, guest, id, EventRole::Guest).await.unwrap();

        let for_host = user_events_for_network(&store, host, network, &HashMap::new())
            .await
            .unwrap();
        let for_guest = user_events_for_network(&store, guest, network, &HashMap::new())
            .await
            .unwrap();

        assert_eq!(for_host.len(), 1);
        assert_eq!(for_guest.len(), 1);
        assert_eq!(for_guest[0]["id"], json!(id));
    }
}
