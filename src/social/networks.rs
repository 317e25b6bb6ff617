//! # Networks
//!
//! A network groups people by where they live now (`*_cur`) and where they
//! come from, either a location (`*_origin`) or a language.
//!
//! Looking up a network that does not exist yet creates it: the lookup is
//! turned into a synthesized insert and the query is run once more.

use std::collections::HashMap;

use crate::observability::{log_event_with_fields, Event};
use crate::rest_api::form::{FormSource, PseudoForm};
use crate::rest_api::mutation::insert_statement;
use crate::rest_api::pagination::{
    fetch_page, paginate, CursorKind, PageQuery, MAX_REGISTRATION_DATE_PARAM,
};
use crate::rest_api::selection::{id_values, parse_location, Location, Predicate};
use crate::rest_api::tables::{fetch_by_id, fetch_single, Table};
use crate::rest_api::{Record, RestError, RestResult};
use crate::store::{SqlValue, Store};

/// Columns a client may set when creating a network
pub const NETWORK_FIELDS: &[&str] = &[
    "city_cur",
    "id_city_cur",
    "region_cur",
    "id_region_cur",
    "country_cur",
    "id_country_cur",
    "city_origin",
    "id_city_origin",
    "region_origin",
    "id_region_origin",
    "country_origin",
    "id_country_origin",
    "language_origin",
    "id_language_origin",
    "network_class",
];

pub const NEAR_LOCATION_PARAM: &str = "near_location";
pub const FROM_LOCATION_PARAM: &str = "from_location";
pub const LANGUAGE_PARAM: &str = "language";

const CUR_COLUMNS: [&str; 3] = ["id_country_cur", "id_region_cur", "id_city_cur"];
const ORIGIN_COLUMNS: [&str; 3] = ["id_country_origin", "id_region_origin", "id_city_origin"];

/// Lookup tables and column stems for the country, region and city
/// components of a location
const LOCATION_PARTS: [(Table, &str); 3] = [
    (Table::Countries, "country"),
    (Table::Regions, "region"),
    (Table::Cities, "city"),
];

/// Where the members of a network come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Location(Location),
    Language(String),
}

/// The identity of a network: current location plus origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkQuery {
    pub near: Location,
    pub origin: Origin,
}

impl NetworkQuery {
    /// Read `near_location` and one of `from_location` / `language`.
    ///
    /// `from_location` wins when both are given.
    pub fn from_params(params: &HashMap<String, String>) -> RestResult<Self> {
        let near = params
            .get(NEAR_LOCATION_PARAM)
            .ok_or_else(|| RestError::MissingParam(NEAR_LOCATION_PARAM.to_string()))?;
        let near = parse_location(near)?;

        let origin = if let Some(from) = params.get(FROM_LOCATION_PARAM) {
            Origin::Location(parse_location(from)?)
        } else if let Some(language) = params.get(LANGUAGE_PARAM) {
            let language = language.trim();
            if language.is_empty() {
                return Err(RestError::invalid("language must not be empty"));
            }
            Origin::Language(language.to_string())
        } else {
            return Err(RestError::MissingParam(format!(
                "{} or {}",
                FROM_LOCATION_PARAM, LANGUAGE_PARAM
            )));
        };

        Ok(Self { near, origin })
    }

    /// Selection over the `networks` columns
    pub fn predicate(&self) -> RestResult<Predicate> {
        let near = Predicate::build(&id_values(&self.near), &CUR_COLUMNS)?;
        let origin = match &self.origin {
            Origin::Location(from) => Predicate::build(&id_values(from), &ORIGIN_COLUMNS)?,
            Origin::Language(name) => Predicate::eq("language_origin", name.as_str()),
        };
        Ok(near.and(origin))
    }

    /// `cc`, `rc` or `co` by the most specific current component for
    /// location origins, `_l` for language origins
    pub fn network_class(&self) -> &'static str {
        match self.origin {
            Origin::Language(_) => "_l",
            Origin::Location(_) => match self.near {
                [_, _, Some(_)] => "cc",
                [_, Some(_), None] => "rc",
                _ => "co",
            },
        }
    }
}

/// Networks matching the request, creating the network on a first miss
pub async fn find_networks(store: &Store, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = NetworkQuery::from_params(params)?;
    let page_query = PageQuery::filtered("SELECT * FROM networks", query.predicate()?);
    let page = page_query.params(params)?;

    let records = fetch_page(store, &page_query, &page).await?;
    if !records.is_empty() || page.has_cursor() {
        return Ok(records);
    }

    let form = synthesize_network(store, &query).await?;
    let id = create_network(store, &form).await?;
    let id_text = id.to_string();
    log_event_with_fields(
        Event::NetworkCreated,
        &[("id", id_text.as_str()), ("network_class", query.network_class())],
    );

    fetch_page(store, &page_query, &page).await
}

/// Build the insert request for a network that does not exist yet.
///
/// Location names are resolved from the lookup tables and the language id
/// from its name.
pub async fn synthesize_network(store: &Store, query: &NetworkQuery) -> RestResult<PseudoForm> {
    let mut form = PseudoForm::new();

    set_location(store, &mut form, &query.near, "cur").await?;
    match &query.origin {
        Origin::Location(from) => set_location(store, &mut form, from, "origin").await?,
        Origin::Language(name) => {
            let id = language_id(store, name).await?;
            form.set("language_origin", name.as_str());
            form.set("id_language_origin", id);
        }
    }
    form.set("network_class", query.network_class());

    Ok(form)
}

async fn set_location(
    store: &Store,
    form: &mut PseudoForm,
    location: &Location,
    suffix: &str,
) -> RestResult<()> {
    for ((table, stem), id) in LOCATION_PARTS.iter().zip(location.iter()) {
        if let Some(id) = id {
            let name = location_name(store, *table, *id).await?;
            form.set(&format!("id_{}_{}", stem, suffix), *id);
            form.set(&format!("{}_{}", stem, suffix), name);
        }
    }
    Ok(())
}

async fn location_name(store: &Store, table: Table, id: i64) -> RestResult<String> {
    let record = fetch_by_id(store, table, id)
        .await?
        .found()
        .ok_or(RestError::EntityNotFound(table.entity(), id))?;

    record
        .get("name")
        .and_then(|name| name.as_str())
        .map(str::to_string)
        .ok_or_else(|| RestError::Upstream(format!("{} {} has no name", table.entity(), id)))
}

async fn language_id(store: &Store, name: &str) -> RestResult<i64> {
    let rows = store
        .fetch_optional("SELECT id FROM languages WHERE name = ?", &[SqlValue::from(name)])
        .await?;

    rows.values
        .first()
        .and_then(|row| row.first())
        .and_then(|id| id.as_i64())
        .ok_or_else(|| RestError::invalid(format!("unknown language '{}'", name)))
}

/// Insert a network from a client body or a synthesized request
pub async fn create_network(store: &Store, form: &dyn FormSource) -> RestResult<i64> {
    let statement = insert_statement(Table::Networks, NETWORK_FIELDS, form)?;
    let outcome = store.execute(&statement.sql, &statement.args).await?;
    Ok(outcome.last_insert_id)
}

pub async fn get_network(store: &Store, id: i64) -> RestResult<Record> {
    fetch_by_id(store, Table::Networks, id).await?.into_result()
}

pub async fn network_posts(store: &Store, id: i64, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = PageQuery::filtered("SELECT * FROM posts", Predicate::eq("id_network", id));
    paginate(store, &query, params).await
}

pub async fn network_events(store: &Store, id: i64, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = PageQuery::filtered("SELECT * FROM events", Predicate::eq("id_network", id));
    paginate(store, &query, params).await
}

/// Members of a network, most recently joined first
pub async fn network_users(store: &Store, id: i64, params: &HashMap<String, String>) -> RestResult<Vec<Record>> {
    let query = PageQuery::new(
        "SELECT users.*, network_registration.join_date FROM network_registration \
         INNER JOIN users ON users.id = network_registration.id_user \
         WHERE network_registration.id_network = ?",
        vec![SqlValue::Integer(id)],
    )
    .order_by("network_registration.join_date")
    .cursor(MAX_REGISTRATION_DATE_PARAM, CursorKind::Timestamp);

    paginate(store, &query, params).await
}

/// `{"post_count": n}`
pub async fn post_count(store: &Store, id: i64) -> RestResult<Record> {
    fetch_single(
        store,
        "SELECT count(*) AS post_count FROM posts WHERE id_network = ?",
        &[SqlValue::Integer(id)],
    )
    .await?
    .into_result()
}

/// `{"user_count": n}`
pub async fn user_count(store: &Store, id: i64) -> RestResult<Record> {
    fetch_single(
        store,
        "SELECT count(*) AS user_count FROM network_registration WHERE id_network = ?",
        &[SqlValue::Integer(id)],
    )
    .await?
    .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::fixtures::{create_user, seed_locations, test_store};
    use serde_json::json;

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_network_futures_are_send() {
        let store = test_store().await;
        let params = HashMap::new();
        let form = PseudoForm::new();

        // Handlers run on a multi-threaded runtime
        assert_send(&find_networks(&store, &params));
        assert_send(&create_network(&store, &form));
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_requires_near_location() {
        let err = NetworkQuery::from_params(&params(&[("language", "Welsh")])).unwrap_err();
        assert!(matches!(err, RestError::MissingParam(name) if name == "near_location"));
    }

    #[test]
    fn test_query_requires_origin() {
        let err = NetworkQuery::from_params(&params(&[("near_location", "1,2,3")])).unwrap_err();
        assert!(matches!(err, RestError::MissingParam(_)));
    }

    #[test]
    fn test_from_location_predicate() {
        let query = NetworkQuery::from_params(&params(&[
            ("near_location", "1,-1,3"),
            ("from_location", "2,null,null"),
        ]))
        .unwrap();
        let predicate = query.predicate().unwrap();

        assert_eq!(
            predicate.sql(),
            "id_country_cur = ? AND id_region_cur IS NULL AND id_city_cur = ? AND \
             id_country_origin = ? AND id_region_origin IS NULL AND id_city_origin IS NULL"
        );
        assert_eq!(
            predicate.args(),
            &[SqlValue::Integer(1), SqlValue::Integer(3), SqlValue::Integer(2)]
        );
    }

    #[test]
    fn test_network_class() {
        let class = |near: &str, origin: (&str, &str)| {
            NetworkQuery::from_params(&params(&[("near_location", near), origin]))
                .unwrap()
                .network_class()
        };

        assert_eq!(class("1,2,3", ("from_location", "4,5,6")), "cc");
        assert_eq!(class("1,2,-1", ("from_location", "4,5,6")), "rc");
        assert_eq!(class("1,-1,-1", ("from_location", "4,5,6")), "co");
        assert_eq!(class("1,2,3", ("language", "Welsh")), "_l");
    }

    #[tokio::test]
    async fn test_find_creates_missing_location_network() {
        let store = test_store().await;
        seed_locations(&store).await;

        let request = params(&[("near_location", "1,10,100"), ("from_location", "2,-1,-1")]);
        let networks = find_networks(&store, &request).await.unwrap();

        assert_eq!(networks.len(), 1);
        let network = &networks[0];
        assert_eq!(network["city_cur"], json!("Cardiff"));
        assert_eq!(network["region_cur"], json!("Glamorgan"));
        assert_eq!(network["country_cur"], json!("Wales"));
        assert_eq!(network["country_origin"], json!("Argentina"));
        assert_eq!(network["id_region_origin"], json!(null));
        assert_eq!(network["network_class"], json!("cc"));

        // Second lookup finds the same network instead of creating another
        let again = find_networks(&store, &request).await.unwrap();
        assert_eq!(again, networks);
    }

    #[tokio::test]
    async fn test_find_creates_language_network() {
        let store = test_store().await;
        seed_locations(&store).await;

        let request = params(&[("near_location", "1,-1,-1"), ("language", "Welsh")]);
        let networks = find_networks(&store, &request).await.unwrap();

        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0]["language_origin"], json!("Welsh"));
        assert_eq!(networks[0]["id_language_origin"], json!(7));
        assert_eq!(networks[0]["network_class"], json!("_l"));
    }

    #[tokio::test]
    async fn test_find_with_cursor_does_not_create() {
        let store = test_store().await;
        seed_locations(&store).await;

        let request = params(&[
            ("near_location", "1,-1,-1"),
            ("language", "Welsh"),
            ("max_id", "50"),
        ]);
        assert!(find_networks(&store, &request).await.unwrap().is_empty());

        let rows = store.fetch("SELECT id FROM networks", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_location_component() {
        let store = test_store().await;
        seed_locations(&store).await;

        let request = params(&[("near_location", "1,10,999"), ("language", "Welsh")]);
        let err = find_networks(&store, &request).await.unwrap_err();
        assert!(matches!(err, RestError::EntityNotFound("city", 999)));
    }

    #[tokio::test]
    async fn test_counts_and_members() {
        let store = test_store().await;
        seed_locations(&store).await;
        let mut form = PseudoForm::new();
        form.set("id_country_cur", 1).set("network_class", "co");
        let network = create_network(&store, &form).await.unwrap();
        let user = create_user(&store, "maria").await;

        store
            .execute(
                "INSERT INTO network_registration (id_user, id_network) VALUES (?, ?)",
                &[SqlValue::Integer(user), SqlValue::Integer(network)],
            )
            .await
            .unwrap();

        assert_eq!(user_count(&store, network).await.unwrap()["user_count"], json!(1));
        assert_eq!(post_count(&store, network).await.unwrap()["post_count"], json!(0));

        let members = network_users(&store, network, &HashMap::new()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["username"], json!("maria"));
        assert!(members[0].contains_key("join_date"));
        assert!(!members[0].contains_key("password"));
    }

    #[tokio::test]
    async fn test_get_missing_network() {
        let store = test_store().await;
        assert!(matches!(
            get_network(&store, 404).await,
            Err(RestError::NotFound)
        ));
    }
}
