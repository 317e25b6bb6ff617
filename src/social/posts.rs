//! # Posts

use crate::rest_api::form::{PseudoForm, RequestForm};
use crate::rest_api::mutation::{insert_statement, validate_required};
use crate::rest_api::tables::{fetch_by_id, Table};
use crate::rest_api::{Record, RestResult};
use crate::store::Store;

/// Columns set when creating a post
pub const POST_FIELDS: &[&str] = &[
    "id_user",
    "id_network",
    "post_text",
    "post_class",
    "post_original",
    "vid_link",
    "img_link",
];

pub const REQUIRED_POST_FIELDS: &[&str] = &["id_network", "post_text"];

pub async fn get_post(store: &Store, id: i64) -> RestResult<Record> {
    fetch_by_id(store, Table::Posts, id).await?.into_result()
}

/// Create a post authored by `user_id`
pub async fn create_post(store: &Store, user_id: i64, form: RequestForm) -> RestResult<i64> {
    let mut form = PseudoForm::from(form);
    form.set("id_user", user_id);
    validate_required(&form, REQUIRED_POST_FIELDS)?;

    let statement = insert_statement(Table::Posts, POST_FIELDS, &form)?;
    let outcome = store.execute(&statement.sql, &statement.args).await?;
    Ok(outcome.last_insert_id)
}
