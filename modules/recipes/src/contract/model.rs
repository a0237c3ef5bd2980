use chrono::{DateTime, Utc};

/// Pure recipe model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub prep_time: i32,
    pub instructions: String,
    pub image_url: Option<String>,
}

/// Data for creating a recipe; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub category: String,
    pub description: String,
    pub prep_time: i32,
    pub instructions: String,
    pub image_url: Option<String>,
}

impl NewRecipe {
    /// Full overwrite of `id`'s attributes, keeping the identity.
    pub fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            prep_time: self.prep_time,
            instructions: self.instructions,
            image_url: self.image_url,
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub instructions: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the provided fields into `recipe`.
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(name) = self.name {
            recipe.name = name;
        }
        if let Some(category) = self.category {
            recipe.category = category;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if let Some(prep_time) = self.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub recipe_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub recipe_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWithComments {
    pub recipe: Recipe,
    pub comments: Vec<Comment>,
}
