use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, FromQueryResult,
    IntoActiveModel, ModelTrait, Value,
};
use serde::{Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

use crate::core::schema::SchemaCore;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this update model into an existing active model.
    ///
    /// Fields left as `None` must stay untouched.
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if a value cannot be converted for the column.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// Persistence base shared by every resource.
///
/// Implemented on a marker type per resource. The entity must carry the base
/// columns: an `i32` auto-increment `id`, a nullable unique `code`, a nullable
/// `title`, `created_at` / `updated_at` as `DateTimeUtc` and a boolean
/// `is_deleted`. The controller writes the timestamps and the flag itself, so
/// neither `CreateModel` nor `UpdateModel` should expose them.
///
/// The [`record_core!`](crate::record_core) macro fills in the conventional
/// column constants.
pub trait RecordCore: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel, Column = Self::Column>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Serialize
        + Clone
        + Send
        + Sync
        + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Column: ColumnTrait;
    type CreateModel: Into<Self::ActiveModel> + DeserializeOwned + ToSchema + Send + 'static;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModel>
        + DeserializeOwned
        + ToSchema
        + Send
        + 'static;

    /// Path segment the router mounts the resource under; also its display name.
    const ENDPOINT: &'static str;
    const RESOURCE_DESCRIPTION: &'static str = "";
    /// Reject `create` when another row already holds the same code.
    const UNIQUE_CODE: bool = true;

    const ID: Self::Column;
    const CODE: Self::Column;
    const TITLE: Self::Column;
    const CREATED_AT: Self::Column;
    const UPDATED_AT: Self::Column;
    const IS_DELETED: Self::Column;

    /// Columns matched by the free-text `q` parameter.
    #[must_use]
    fn search_columns() -> Vec<Self::Column> {
        vec![Self::CODE, Self::TITLE]
    }

    /// Column holding the owner id for `GET /R/from/{owner_id}`.
    #[must_use]
    fn owner_column() -> Option<Self::Column> {
        None
    }

    #[must_use]
    fn schema() -> SchemaCore {
        SchemaCore::default()
    }

    fn record_id(model: &Self::Model) -> Option<i32> {
        match model.get(Self::ID) {
            Value::Int(Some(id)) => Some(id),
            Value::BigInt(Some(id)) => i32::try_from(id).ok(),
            Value::Unsigned(Some(id)) => i32::try_from(id).ok(),
            _ => None,
        }
    }

    fn is_deleted(model: &Self::Model) -> bool {
        matches!(model.get(Self::IS_DELETED), Value::Bool(Some(true)))
    }
}

/// Implement [`RecordCore`] for a resource module.
///
/// Expects the sea-orm `Entity`, `Model`, `ActiveModel` and `Column` of the
/// module in scope and base columns named `Id`, `Code`, `Title`,
/// `CreatedAt`, `UpdatedAt` and `IsDeleted`. Extra trait items go in a
/// trailing block.
///
/// ```rust,ignore
/// record_core! {
///     /// Tasks belonging to a project.
///     pub struct Task;
///     endpoint = "task",
///     create = TaskCreate,
///     update = TaskUpdate,
///     {
///         fn owner_column() -> Option<Column> {
///             Some(Column::ProjectId)
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! record_core {
    (
        $(#[$meta:meta])*
        $vis:vis struct $marker:ident;
        endpoint = $endpoint:literal,
        create = $create:ty,
        update = $update:ty
        $(, { $($extra:tt)* })?
        $(,)?
    ) => {
        $(#[$meta])*
        $vis struct $marker;

        impl $crate::core::record::RecordCore for $marker {
            type Entity = Entity;
            type Model = Model;
            type ActiveModel = ActiveModel;
            type Column = Column;
            type CreateModel = $create;
            type UpdateModel = $update;

            const ENDPOINT: &'static str = $endpoint;
            const ID: Column = Column::Id;
            const CODE: Column = Column::Code;
            const TITLE: Column = Column::Title;
            const CREATED_AT: Column = Column::CreatedAt;
            const UPDATED_AT: Column = Column::UpdatedAt;
            const IS_DELETED: Column = Column::IsDeleted;

            $($($extra)*)?
        }
    };
}
