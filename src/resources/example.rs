use sea_orm::{ActiveValue::Set, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{core::record::MergeIntoActiveModel, record_core};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "example")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: Option<String>,
    #[sea_orm(indexed)]
    pub title: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExampleCreate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<ExampleCreate> for ActiveModel {
    fn from(input: ExampleCreate) -> Self {
        Self {
            code: Set(input.code),
            title: Set(input.title),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExampleUpdate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl MergeIntoActiveModel<ActiveModel> for ExampleUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(code) = self.code {
            existing.code = Set(Some(code));
        }
        if let Some(title) = self.title {
            existing.title = Set(Some(title));
        }
        Ok(existing)
    }
}

record_core! {
    /// Minimal resource carrying only the record base columns.
    pub struct Example;
    endpoint = "example",
    create = ExampleCreate,
    update = ExampleUpdate,
    {
        const RESOURCE_DESCRIPTION: &'static str = "Example records with code and title";
    }
}
