use chrono::{DateTime, Utc};
use crudcore::{
    ActionContext, ApiError, MergeIntoActiveModel, RecordCore, RouterCore, SchemaCore,
    flexible_datetime, record_core,
};
use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Owned resource: tasks belong to a project and can be completed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: Option<String>,
    #[sea_orm(indexed)]
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub project_id: i32,
    pub completed: bool,
    pub due_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TaskCreate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: i32,
    #[serde(default, with = "flexible_datetime::option")]
    #[schema(value_type = Option<String>)]
    pub due_at: Option<DateTime<Utc>>,
}

impl From<TaskCreate> for ActiveModel {
    fn from(input: TaskCreate) -> Self {
        Self {
            code: Set(input.code),
            title: Set(input.title),
            description: Set(input.description),
            project_id: Set(input.project_id),
            completed: Set(false),
            due_at: Set(input.due_at),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TaskUpdate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "flexible_datetime::option")]
    #[schema(value_type = Option<String>)]
    pub due_at: Option<DateTime<Utc>>,
}

impl MergeIntoActiveModel<ActiveModel> for TaskUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(code) = self.code {
            existing.code = Set(Some(code));
        }
        if let Some(title) = self.title {
            existing.title = Set(Some(title));
        }
        if let Some(description) = self.description {
            existing.description = Set(Some(description));
        }
        if let Some(due_at) = self.due_at {
            existing.due_at = Set(Some(due_at));
        }
        Ok(existing)
    }
}

record_core! {
    pub struct Task;
    endpoint = "task",
    create = TaskCreate,
    update = TaskUpdate,
    {
        fn search_columns() -> Vec<Column> {
            vec![Column::Code, Column::Title, Column::Description]
        }

        fn owner_column() -> Option<Column> {
            Some(Column::ProjectId)
        }

        fn schema() -> SchemaCore {
            SchemaCore::default().with_timestamp_field("due_at")
        }
    }
}

/// Router with a `complete` action; `?note=...` replaces the description.
pub fn router() -> RouterCore<Task> {
    RouterCore::new().action("complete", |context: ActionContext| async move {
        let task = Entity::find()
            .filter(Column::Id.eq(context.id))
            .one(&context.db)
            .await?
            .ok_or_else(|| ApiError::not_found(Task::ENDPOINT, context.id))?;

        let mut active: ActiveModel = task.into();
        active.completed = Set(true);
        if let Some(note) = context.args.get("note") {
            active.description = Set(Some(note.clone()));
        }
        let task = active.update(&context.db).await?;
        Task::schema().dump(&task)
    })
}
