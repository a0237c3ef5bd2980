pub mod comment;
pub mod recipe;
