//! Item operation handlers.
//!
//! Each handler translates between HTTP and the [`ItemRepository`]; none of
//! them carries business rules of its own.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use hestia_config::ApiSection;
use hestia_core::{FieldError, HestiaError, ItemId, ItemRepository, RepositoryError, RequestContext};
use hestia_server::{HandlerRegistry, Reply};

use crate::payload::{parse_integer, parse_item_payload, Integer, MSG_INT_PARSING};

/// Detail sent when an item does not exist.
pub const ITEM_NOT_FOUND: &str = "Item no encontrado";

/// Operation IDs, as used in routes, logs and metrics.
pub mod operations {
    /// `GET /`
    pub const READ_ROOT: &str = "readRoot";
    /// `GET /items`
    pub const LIST_ITEMS: &str = "listItems";
    /// `POST /items`
    pub const CREATE_ITEM: &str = "createItem";
    /// `GET /items/{item_id}`
    pub const GET_ITEM: &str = "getItem";
    /// `PUT /items/{item_id}`
    pub const UPDATE_ITEM: &str = "updateItem";
    /// `DELETE /items/{item_id}`
    pub const DELETE_ITEM: &str = "deleteItem";
}

const ITEM_ID_PARAM: &str = "item_id";

#[derive(Debug, Serialize)]
struct Welcome<'a> {
    message: &'a str,
    docs: &'a str,
}

/// The item API bound to one repository.
#[derive(Debug, Clone)]
pub struct ItemHandlers {
    repository: Arc<ItemRepository>,
    api: Arc<ApiSection>,
}

impl ItemHandlers {
    /// Creates handlers over `repository`.
    pub fn new(repository: Arc<ItemRepository>, api: ApiSection) -> Self {
        Self {
            repository,
            api: Arc::new(api),
        }
    }

    /// Returns the backing repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<ItemRepository> {
        &self.repository
    }

    /// Registers every operation with `registry`.
    pub fn register(&self, registry: &mut HandlerRegistry) {
        let this = self.clone();
        registry.register_no_body(operations::READ_ROOT, move |ctx| {
            let this = this.clone();
            async move { this.read_root(&ctx) }
        });

        let this = self.clone();
        registry.register_no_body(operations::LIST_ITEMS, move |ctx| {
            let this = this.clone();
            async move { this.list_items(&ctx) }
        });

        let this = self.clone();
        registry.register(operations::CREATE_ITEM, move |ctx, body| {
            let this = this.clone();
            async move { this.create_item(&ctx, &body) }
        });

        let this = self.clone();
        registry.register_no_body(operations::GET_ITEM, move |ctx| {
            let this = this.clone();
            async move { this.get_item(&ctx) }
        });

        let this = self.clone();
        registry.register(operations::UPDATE_ITEM, move |ctx, body| {
            let this = this.clone();
            async move { this.update_item(&ctx, &body) }
        });

        let this = self.clone();
        registry.register_no_body(operations::DELETE_ITEM, move |ctx| {
            let this = this.clone();
            async move { this.delete_item(&ctx) }
        });
    }

    /// `GET /`: greeting and the documentation path.
    pub fn read_root(&self, _ctx: &RequestContext) -> Result<Reply, HestiaError> {
        Reply::ok(&Welcome {
            message: &self.api.welcome_message,
            docs: &self.api.docs_url,
        })
    }

    /// `GET /items`: every item in insertion order.
    pub fn list_items(&self, _ctx: &RequestContext) -> Result<Reply, HestiaError> {
        Reply::ok(&self.repository.list())
    }

    /// `POST /items`: stores a new item under a fresh id.
    pub fn create_item(&self, ctx: &RequestContext, body: &Bytes) -> Result<Reply, HestiaError> {
        let draft = parse_item_payload(body)?;
        let item = self.repository.create(draft);

        tracing::debug!(request_id = %ctx.request_id(), item_id = %item.id, "Item created");
        Reply::created(&item)
    }

    /// `GET /items/{item_id}`
    pub fn get_item(&self, ctx: &RequestContext) -> Result<Reply, HestiaError> {
        let id = item_id(ctx)?;
        let item = self.repository.get(id).map_err(not_found)?;
        Reply::ok(&item)
    }

    /// `PUT /items/{item_id}`: replaces every field but the id.
    ///
    /// The path id is checked before the body, so a bad id is reported
    /// even when the body is also invalid.
    pub fn update_item(&self, ctx: &RequestContext, body: &Bytes) -> Result<Reply, HestiaError> {
        let id = item_id(ctx)?;
        let draft = parse_item_payload(body)?;
        let item = self.repository.update(id, draft).map_err(not_found)?;

        tracing::debug!(request_id = %ctx.request_id(), item_id = %id, "Item updated");
        Reply::ok(&item)
    }

    /// `DELETE /items/{item_id}`
    pub fn delete_item(&self, ctx: &RequestContext) -> Result<Reply, HestiaError> {
        let id = item_id(ctx)?;
        self.repository.delete(id).map_err(not_found)?;

        tracing::debug!(request_id = %ctx.request_id(), item_id = %id, "Item deleted");
        Ok(Reply::no_content())
    }
}

/// Reads `item_id` from the path.
///
/// Text that is not an integer is a validation error. Integers that can
/// never name an item (negative, or beyond the id range) are reported as
/// not found, the same as any other unknown id.
fn item_id(ctx: &RequestContext) -> Result<ItemId, HestiaError> {
    let raw = ctx.path_param(ITEM_ID_PARAM).unwrap_or_default();

    match parse_integer(raw) {
        Some(Integer::Value(value)) => u64::try_from(value)
            .map(ItemId::new)
            .map_err(|_| HestiaError::not_found_resource(ITEM_NOT_FOUND, raw)),
        Some(Integer::OutOfRange) => Err(HestiaError::not_found_resource(ITEM_NOT_FOUND, raw)),
        None => Err(HestiaError::validation(
            FieldError::new("int_parsing", ["path", ITEM_ID_PARAM], MSG_INT_PARSING).into(),
        )),
    }
}

fn not_found(error: RepositoryError) -> HestiaError {
    match error {
        RepositoryError::NotFound(id) => HestiaError::not_found_resource(ITEM_NOT_FOUND, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_core::{Item, ItemDraft};
    use http::StatusCode;

    fn handlers() -> ItemHandlers {
        ItemHandlers::new(Arc::new(ItemRepository::new()), ApiSection::default())
    }

    fn ctx(id: &str) -> RequestContext {
        RequestContext::new().with_path_param(ITEM_ID_PARAM, id)
    }

    fn body(json: &str) -> Bytes {
        Bytes::copy_from_slice(json.as_bytes())
    }

    fn item(reply: &Reply) -> Item {
        serde_json::from_slice(reply.body().unwrap()).unwrap()
    }

    #[test]
    fn test_create_assigns_id_and_201() {
        let h = handlers();
        let reply = h
            .create_item(&RequestContext::new(), &body(r#"{"id": 50, "name": "Prueba", "price": 9.99}"#))
            .unwrap();

        assert_eq!(reply.status(), StatusCode::CREATED);
        let created = item(&reply);
        assert_eq!(created.id, ItemId::new(1));
        assert_eq!(created.name, "Prueba");
        assert_eq!(h.repository().len(), 1);
    }

    #[test]
    fn test_create_rejects_invalid_body_without_storing() {
        let h = handlers();
        let err = h
            .create_item(&RequestContext::new(), &body(r#"{"name": "A", "price": "x"}"#))
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(h.repository().is_empty());
    }

    #[test]
    fn test_get_update_delete() {
        let h = handlers();
        h.repository().create(ItemDraft::new("A", None, 1.0));

        let got = h.get_item(&ctx("1")).unwrap();
        assert_eq!(item(&got).name, "A");

        let updated = h
            .update_item(&ctx("1"), &body(r#"{"name": "B", "description": "n", "price": 2}"#))
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(item(&updated), Item::from_draft(ItemId::new(1), ItemDraft::new("B", Some("n"), 2.0)));

        let deleted = h.delete_item(&ctx("1")).unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert!(deleted.body().is_none());

        let err = h.get_item(&ctx("1")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(err.to_body()).unwrap(),
            serde_json::json!({"detail": ITEM_NOT_FOUND})
        );
    }

    #[test]
    fn test_missing_item_is_not_found() {
        let h = handlers();
        for op in [
            h.get_item(&ctx("7")),
            h.delete_item(&ctx("7")),
            h.update_item(&ctx("7"), &body(r#"{"name": "A", "price": 1}"#)),
        ] {
            assert_eq!(op.unwrap_err().status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_item_id_parsing() {
        assert_eq!(item_id(&ctx("3")).unwrap(), ItemId::new(3));

        let negative = item_id(&ctx("-1")).unwrap_err();
        assert_eq!(negative.status_code(), StatusCode::NOT_FOUND);

        let huge = item_id(&ctx("123456789012345678901234")).unwrap_err();
        assert_eq!(huge.status_code(), StatusCode::NOT_FOUND);

        let text = item_id(&ctx("abc")).unwrap_err();
        assert_eq!(text.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            serde_json::to_value(text.to_body()).unwrap()["detail"][0]["loc"],
            serde_json::json!(["path", "item_id"])
        );
    }

    #[test]
    fn test_bad_path_id_reported_before_body() {
        let err = handlers().update_item(&ctx("x"), &body("{}")).unwrap_err();
        let detail = serde_json::to_value(err.to_body()).unwrap()["detail"].clone();
        assert_eq!(detail.as_array().unwrap().len(), 1);
        assert_eq!(detail[0]["type"], "int_parsing");
    }

    #[test]
    fn test_read_root_uses_api_section() {
        let api = ApiSection {
            welcome_message: "Hola".to_string(),
            docs_url: "/documentacion".to_string(),
        };
        let h = ItemHandlers::new(Arc::new(ItemRepository::new()), api);
        let reply = h.read_root(&RequestContext::new()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(reply.body().unwrap()).unwrap();

        assert_eq!(json, serde_json::json!({"message": "Hola", "docs": "/documentacion"}));
    }

    #[test]
    fn test_register_binds_every_operation() {
        let mut registry = HandlerRegistry::new();
        handlers().register(&mut registry);

        for op in [
            operations::READ_ROOT,
            operations::LIST_ITEMS,
            operations::CREATE_ITEM,
            operations::GET_ITEM,
            operations::UPDATE_ITEM,
            operations::DELETE_ITEM,
        ] {
            assert!(registry.contains(op), "{op} not registered");
        }
        assert_eq!(registry.len(), 6);
    }
}
