use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{Comment, Recipe, RecipeWithComments};

/// REST DTO for a recipe, flat field mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDto {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub prep_time: i32,
    pub instructions: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentDto {
    pub id: i64,
    pub recipe_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A recipe with its comments embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDetailDto {
    #[serde(flatten)]
    pub recipe: RecipeDto,
    pub comments: Vec<CommentDto>,
}

/// Acknowledgement for writes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageDto {
    pub message: String,
    pub id: i64,
}

impl MessageDto {
    pub fn added(id: i64) -> Self {
        Self {
            message: "Recipe added successfully".to_string(),
            id,
        }
    }

    pub fn updated(id: i64) -> Self {
        Self {
            message: "Recipe updated successfully".to_string(),
            id,
        }
    }
}

impl From<Recipe> for RecipeDto {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            description: r.description,
            prep_time: r.prep_time,
            instructions: r.instructions,
            image_url: r.image_url,
        }
    }
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            recipe_id: c.recipe_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

impl From<RecipeWithComments> for RecipeDetailDto {
    fn from(rc: RecipeWithComments) -> Self {
        Self {
            recipe: rc.recipe.into(),
            comments: rc.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}
