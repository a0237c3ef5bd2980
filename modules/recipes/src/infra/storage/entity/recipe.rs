use sea_orm::entity::prelude::*;

use crate::contract::model::Recipe;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub category: String,
    pub description: String,
    pub prep_time: i32,
    pub instructions: String,
    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Recipe {
    fn from(m: Model) -> Self {
        Recipe {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            prep_time: m.prep_time,
            instructions: m.instructions,
            image_url: m.image_url,
        }
    }
}
