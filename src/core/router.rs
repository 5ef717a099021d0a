use std::{collections::BTreeMap, collections::HashMap, future::Future, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use futures::{FutureExt, future::BoxFuture};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use crate::{
    core::{
        controller::{Controller, ListQuery, Listing, Lookup},
        record::RecordCore,
    },
    errors::ApiError,
    models::ListParams,
    response::{Envelope, PageSection, content_range},
};

/// Built-in actions of `PATCH /R/{id}/{action}`.
pub const DELETE_ACTION: &str = "delete";
pub const UNDELETE_ACTION: &str = "undelete";

pub const DELETED_MESSAGE: &str = "Successfully deleted";

/// What a custom action receives.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub db: DatabaseConnection,
    pub id: i32,
    /// The target record as the resource schema dumps it.
    pub item: Value,
    /// Query string of the action request.
    pub args: HashMap<String, String>,
}

pub type ActionFuture = BoxFuture<'static, Result<Value, ApiError>>;
pub type ActionHandler = Arc<dyn Fn(ActionContext) -> ActionFuture + Send + Sync>;

/// HTTP surface of one resource:
///
/// | Method | Path | Operation |
/// |---|---|---|
/// | `GET` | `/R` | list |
/// | `POST` | `/R` | create |
/// | `GET` | `/R/{id}` | read |
/// | `PATCH` | `/R/{id}` | update |
/// | `DELETE` | `/R/{id}` | hard delete |
/// | `PATCH` | `/R/{id}/{action}` | `delete`, `undelete` or a registered action |
/// | `GET` | `/R/from/{owner_id}` | list scoped to an owner |
pub struct RouterCore<R: RecordCore> {
    controller: Controller<R>,
    actions: BTreeMap<String, ActionHandler>,
}

impl<R: RecordCore> Default for RouterCore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RecordCore> RouterCore<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_controller(Controller::strict())
    }

    #[must_use]
    pub fn with_controller(controller: Controller<R>) -> Self {
        Self {
            controller,
            actions: BTreeMap::new(),
        }
    }

    /// Register a custom action reachable at `PATCH /R/{id}/{name}`.
    ///
    /// `delete` and `undelete` always dispatch to the soft-delete operations
    /// and cannot be overridden.
    #[must_use]
    pub fn action<F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        if name == DELETE_ACTION || name == UNDELETE_ACTION {
            tracing::warn!(resource = R::ENDPOINT, action = name, "built-in action not overridden");
            return self;
        }
        let handler: ActionHandler = Arc::new(move |context| handler(context).boxed());
        self.actions.insert(name.to_string(), handler);
        self
    }

    /// Built-in and registered action names, sorted.
    #[must_use]
    pub fn action_names(&self) -> Vec<String> {
        let mut names = vec![DELETE_ACTION.to_string(), UNDELETE_ACTION.to_string()];
        names.extend(self.actions.keys().cloned());
        names.sort();
        names
    }

    pub fn into_router(self, db: DatabaseConnection) -> Router {
        let base = format!("/{}", R::ENDPOINT);
        let state = ResourceState::<R> {
            db,
            controller: self.controller,
            actions: Arc::new(self.actions),
        };

        Router::new()
            .route(&base, get(list_items::<R>).post(create_item::<R>))
            .route(
                &format!("{base}/{{id}}"),
                get(read_item::<R>)
                    .patch(update_item::<R>)
                    .delete(delete_item::<R>),
            )
            .route(&format!("{base}/{{id}}/{{action}}"), patch(run_action::<R>))
            .route(&format!("{base}/from/{{owner_id}}"), get(list_from_owner::<R>))
            .with_state(state)
    }
}

struct ResourceState<R: RecordCore> {
    db: DatabaseConnection,
    controller: Controller<R>,
    actions: Arc<BTreeMap<String, ActionHandler>>,
}

impl<R: RecordCore> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            controller: self.controller,
            actions: Arc::clone(&self.actions),
        }
    }
}

fn bad_path(rejection: &PathRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

fn bad_query(rejection: &QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

fn bad_body(rejection: &JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

fn found<R: RecordCore>(model: Option<R::Model>, lookup: Lookup) -> Result<R::Model, ApiError> {
    model.ok_or_else(|| ApiError::not_found(R::ENDPOINT, lookup))
}

async fn list_response<R: RecordCore>(
    state: &ResourceState<R>,
    query: ListQuery,
) -> Result<Response, ApiError> {
    let schema = R::schema();
    match state.controller.get_list(&state.db, query).await? {
        Listing::All(items) => Ok(Envelope::data(schema.dump_many(&items)?).into_response()),
        Listing::Page(page) => {
            let returned = u64::try_from(page.items.len()).unwrap_or(u64::MAX);
            let headers = content_range(R::ENDPOINT, page.offset(), returned, page.total);
            let section = PageSection::new(
                schema.dump_many(&page.items)?,
                page.total,
                page.page,
                page.limit,
            );
            Ok((headers, Envelope::data(section)).into_response())
        }
    }
}

async fn list_items<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| bad_query(&rejection))?;
    list_response(&state, params.into_query(None)).await
}

async fn list_from_owner<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    owner_id: Result<Path<i32>, PathRejection>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(owner_id) = owner_id.map_err(|rejection| bad_path(&rejection))?;
    let Query(params) = params.map_err(|rejection| bad_query(&rejection))?;
    list_response(&state, params.into_query(Some(owner_id))).await
}

async fn create_item<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    body: Result<Json<R::CreateModel>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body.map_err(|rejection| bad_body(&rejection))?;
    let model = state.controller.create(&state.db, input).await?;
    let data = R::schema().dump(&model)?;
    Ok((StatusCode::CREATED, Envelope::data(data)).into_response())
}

async fn read_item<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|rejection| bad_path(&rejection))?;
    let model = found::<R>(state.controller.read(&state.db, id).await?, Lookup::Id(id))?;
    let item = R::schema().dump(&model)?;
    Ok(Envelope::data(json!({ "item": item })).into_response())
}

async fn update_item<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<R::UpdateModel>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|rejection| bad_path(&rejection))?;
    let Json(changes) = body.map_err(|rejection| bad_body(&rejection))?;
    let model = found::<R>(
        state.controller.update(&state.db, id, changes).await?,
        Lookup::Id(id),
    )?;
    Ok(Envelope::data(R::schema().dump(&model)?).into_response())
}

async fn delete_item<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|rejection| bad_path(&rejection))?;
    if state.controller.delete(&state.db, id).await? {
        Ok(Envelope::<()>::message(DELETED_MESSAGE).into_response())
    } else {
        Err(ApiError::not_found(R::ENDPOINT, Lookup::Id(id)))
    }
}

async fn run_action<R: RecordCore>(
    State(state): State<ResourceState<R>>,
    path: Result<Path<(i32, String)>, PathRejection>,
    args: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path((id, action)) = path.map_err(|rejection| bad_path(&rejection))?;
    let Query(args) = args.map_err(|rejection| bad_query(&rejection))?;
    let schema = R::schema();

    let model = match action.as_str() {
        DELETE_ACTION => state.controller.mark_to_delete(&state.db, id).await?,
        UNDELETE_ACTION => state.controller.mark_to_undelete(&state.db, id).await?,
        name => {
            let handler = state
                .actions
                .get(name)
                .cloned()
                .ok_or_else(|| ApiError::unknown_action(R::ENDPOINT, name))?;
            let model = found::<R>(state.controller.read(&state.db, id).await?, Lookup::Id(id))?;
            let context = ActionContext {
                db: state.db.clone(),
                id,
                item: schema.dump(&model)?,
                args,
            };
            let data = handler(context).await?;
            tracing::info!(resource = R::ENDPOINT, id, action = name, "action finished");
            return Ok(Envelope::data(data).into_response());
        }
    };

    let model = found::<R>(model, Lookup::Id(id))?;
    Ok(Envelope::data(schema.dump(&model)?).into_response())
}
