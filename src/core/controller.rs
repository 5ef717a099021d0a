use std::{fmt, marker::PhantomData};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Value,
};

use crate::{
    core::record::{MergeIntoActiveModel, RecordCore},
    errors::ApiError,
    search::search_condition,
};

/// What a controller does when an operation hits an invalid state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Raise,
    /// Log a warning and hand back the best-effort value instead.
    BestEffort,
}

/// Selects a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i32),
    Code(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Code(code) => write!(f, "code '{code}'"),
        }
    }
}

impl From<i32> for Lookup {
    fn from(id: i32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Lookup {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

/// Arguments of [`Controller::get_list`].
///
/// `limit == 0` disables pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u64,
    pub page: u64,
    pub query_string: Option<String>,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    pub items: Vec<M>,
    pub total: u64,
    /// 1-based
    pub page: u64,
    pub limit: u64,
}

impl<M> Page<M> {
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    #[must_use]
    pub fn pages(&self) -> u64 {
        crate::response::page_count(self.total, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing<M> {
    All(Vec<M>),
    Page(Page<M>),
}

impl<M> Listing<M> {
    #[must_use]
    pub fn items(&self) -> &[M] {
        match self {
            Self::All(items) => items,
            Self::Page(page) => &page.items,
        }
    }
}

/// Generic CRUD and soft-delete operations for one resource.
///
/// Every operation takes any sea-orm connection. Pass a
/// `DatabaseTransaction` to keep the writes uncommitted until the caller
/// commits.
pub struct Controller<R> {
    policy: ErrorPolicy,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Controller<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Controller<R> {}

impl<R> fmt::Debug for Controller<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<R> Default for Controller<R> {
    fn default() -> Self {
        Self::new(ErrorPolicy::default())
    }
}

impl<R> Controller<R> {
    #[must_use]
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            resource: PhantomData,
        }
    }

    #[must_use]
    pub fn strict() -> Self {
        Self::new(ErrorPolicy::Raise)
    }

    #[must_use]
    pub fn lenient() -> Self {
        Self::new(ErrorPolicy::BestEffort)
    }

    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }
}

impl<R: RecordCore> Controller<R> {
    fn settle<T>(&self, error: ApiError, fallback: T) -> Result<T, ApiError> {
        match self.policy {
            ErrorPolicy::Raise => Err(error),
            ErrorPolicy::BestEffort => {
                tracing::warn!(resource = R::ENDPOINT, %error, "ignored by best-effort policy");
                Ok(fallback)
            }
        }
    }

    fn select(lookup: &Lookup) -> Select<R::Entity> {
        let query = R::Entity::find();
        match lookup {
            Lookup::Id(id) => query.filter(R::ID.eq(*id)),
            Lookup::Code(code) => query.filter(R::CODE.eq(code.as_str())),
        }
    }

    fn requested_code(active: &R::ActiveModel) -> Option<String> {
        if !R::UNIQUE_CODE {
            return None;
        }
        match active.get(R::CODE).into_value() {
            Some(Value::String(Some(code))) if !code.is_empty() => Some(*code),
            _ => None,
        }
    }

    async fn find<C: ConnectionTrait>(db: &C, lookup: &Lookup) -> Result<Option<R::Model>, ApiError> {
        Ok(Self::select(lookup).one(db).await?)
    }

    /// Insert a new record.
    ///
    /// With `UNIQUE_CODE`, a code that is already taken fails with
    /// `Duplicate`; the best-effort policy returns the existing row instead.
    ///
    /// # Errors
    ///
    /// `Duplicate`, `Conflict` on a unique-constraint violation, or `Database`.
    pub async fn create<C: ConnectionTrait>(
        &self,
        db: &C,
        input: R::CreateModel,
    ) -> Result<R::Model, ApiError> {
        let mut active: R::ActiveModel = input.into();

        if let Some(code) = Self::requested_code(&active) {
            if let Some(existing) = Self::find(db, &Lookup::Code(code.clone())).await? {
                return self.settle(ApiError::duplicate(R::ENDPOINT, code), existing);
            }
        }

        let now = Utc::now();
        active.set(R::CREATED_AT, now.into());
        active.set(R::UPDATED_AT, now.into());
        active.set(R::IS_DELETED, false.into());

        let model = active.insert(db).await?;
        tracing::info!(resource = R::ENDPOINT, id = ?R::record_id(&model), "created");
        Ok(model)
    }

    /// # Errors
    ///
    /// `NotFound` under the raising policy, or `Database`.
    pub async fn read<C: ConnectionTrait>(
        &self,
        db: &C,
        lookup: impl Into<Lookup>,
    ) -> Result<Option<R::Model>, ApiError> {
        let lookup = lookup.into();
        match Self::find(db, &lookup).await? {
            Some(model) => Ok(Some(model)),
            None => self.settle(ApiError::not_found(R::ENDPOINT, &lookup), None),
        }
    }

    /// Apply the set fields of `changes` and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `BadRequest` when the changes cannot be merged, `Conflict`
    /// or `Database`.
    pub async fn update<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
        changes: R::UpdateModel,
    ) -> Result<Option<R::Model>, ApiError> {
        let Some(existing) = Self::find(db, &Lookup::Id(id)).await? else {
            return self.settle(ApiError::not_found(R::ENDPOINT, Lookup::Id(id)), None);
        };

        let mut active: R::ActiveModel = changes
            .merge_into_activemodel(existing.into_active_model())
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        active.set(R::UPDATED_AT, Utc::now().into());

        let model = active.update(db).await?;
        tracing::info!(resource = R::ENDPOINT, id, "updated");
        Ok(Some(model))
    }

    /// Remove a record for good. Only rows already marked as deleted qualify.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` when the row is not marked, or `Database`.
    pub async fn delete<C: ConnectionTrait>(
        &self,
        db: &C,
        lookup: impl Into<Lookup>,
    ) -> Result<bool, ApiError> {
        let lookup = lookup.into();
        let Some(model) = Self::find(db, &lookup).await? else {
            return self.settle(ApiError::not_found(R::ENDPOINT, &lookup), false);
        };
        if !R::is_deleted(&model) {
            return self.settle(
                ApiError::invalid_state(format!(
                    "{} {lookup} must be marked as deleted first",
                    R::ENDPOINT
                )),
                false,
            );
        }

        let result = R::Entity::delete_many()
            .filter(R::ID.eq(model.get(R::ID)))
            .exec(db)
            .await?;
        tracing::info!(resource = R::ENDPOINT, %lookup, "deleted");
        Ok(result.rows_affected > 0)
    }

    /// Soft delete: set `is_deleted`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` when already marked, or `Database`.
    pub async fn mark_to_delete<C: ConnectionTrait>(
        &self,
        db: &C,
        lookup: impl Into<Lookup>,
    ) -> Result<Option<R::Model>, ApiError> {
        self.set_deleted(db, lookup.into(), true).await
    }

    /// Reverse of [`Controller::mark_to_delete`].
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState` when not marked, or `Database`.
    pub async fn mark_to_undelete<C: ConnectionTrait>(
        &self,
        db: &C,
        lookup: impl Into<Lookup>,
    ) -> Result<Option<R::Model>, ApiError> {
        self.set_deleted(db, lookup.into(), false).await
    }

    async fn set_deleted<C: ConnectionTrait>(
        &self,
        db: &C,
        lookup: Lookup,
        flag: bool,
    ) -> Result<Option<R::Model>, ApiError> {
        let Some(model) = Self::find(db, &lookup).await? else {
            return self.settle(ApiError::not_found(R::ENDPOINT, &lookup), None);
        };
        if R::is_deleted(&model) == flag {
            let state = if flag { "already" } else { "not" };
            return self.settle(
                ApiError::invalid_state(format!(
                    "{} {lookup} is {state} marked as deleted",
                    R::ENDPOINT
                )),
                Some(model),
            );
        }

        let mut active: R::ActiveModel = model.into_active_model();
        active.set(R::IS_DELETED, flag.into());
        active.set(R::UPDATED_AT, Utc::now().into());
        let model = active.update(db).await?;

        tracing::info!(
            resource = R::ENDPOINT,
            %lookup,
            is_deleted = flag,
            "soft-delete flag changed"
        );
        Ok(Some(model))
    }

    /// Newest first, optionally scoped to an owner, filtered by `q` and
    /// paginated.
    ///
    /// # Errors
    ///
    /// `BadRequest` when an owner is given for a resource without an owner
    /// column or when `limit` does not fit a signed 64-bit integer, or
    /// `Database`. A page past the addressable range comes back empty.
    pub async fn get_list<C: ConnectionTrait>(
        &self,
        db: &C,
        query: ListQuery,
    ) -> Result<Listing<R::Model>, ApiError> {
        let mut select = R::Entity::find()
            .order_by_desc(R::CREATED_AT)
            .order_by_desc(R::ID);

        if let Some(owner_id) = query.owner_id {
            let Some(owner) = R::owner_column() else {
                return self.settle(
                    ApiError::bad_request(format!("{} has no owner", R::ENDPOINT)),
                    Listing::All(Vec::new()),
                );
            };
            select = select.filter(owner.eq(owner_id));
        }

        if let Some(condition) = query.query_string.as_deref().and_then(search_condition::<R>) {
            select = select.filter(condition);
        }

        if i64::try_from(query.limit).is_err() {
            return Err(ApiError::bad_request(format!(
                "limit must not exceed {}",
                i64::MAX
            )));
        }

        if query.limit == 0 {
            let items = select.all(db).await?;
            tracing::info!(resource = R::ENDPOINT, count = items.len(), "listed");
            return Ok(Listing::All(items));
        }

        let page = query.page.max(1);
        let addressable = (page - 1)
            .checked_mul(query.limit)
            .is_some_and(|offset| i64::try_from(offset).is_ok());
        let paginator = select.paginate(db, query.limit);
        let total = paginator.num_items().await?;
        let items = if addressable {
            paginator.fetch_page(page - 1).await?
        } else {
            Vec::new()
        };
        tracing::info!(resource = R::ENDPOINT, page, total, "listed page");

        Ok(Listing::Page(Page {
            items,
            total,
            page,
            limit: query.limit,
        }))
    }
}
