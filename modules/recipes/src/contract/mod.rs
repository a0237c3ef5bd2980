pub mod client;
pub mod error;
pub mod model;

pub use client::RecipesApi;
pub use error::RecipesError;
pub use model::{Comment, NewComment, NewRecipe, Recipe, RecipePatch, RecipeWithComments};
