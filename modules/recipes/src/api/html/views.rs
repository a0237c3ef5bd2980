//! Maud templates for the HTML pages.

use maud::{html, Markup, DOCTYPE};

use crate::contract::model::{Recipe, RecipeWithComments};
use crate::domain::fields::RecipeField;

fn layout(title: &str, prefix: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                nav {
                    a href={ (prefix) "/" } { "All recipes" }
                    " | "
                    a href={ (prefix) "/recipes/add" } { "Add a recipe" }
                }
                main { (body) }
            }
        }
    }
}

fn error_banner(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            p class="error" { (message) }
        }
    }
}

pub fn index(prefix: &str, recipes: &[Recipe], search: Option<&str>, error: Option<&str>) -> Markup {
    let body = html! {
        h1 { "Recipes" }
        form method="get" action={ (prefix) "/" } {
            input type="search" name="search" placeholder="Name or category" value=[search];
            button type="submit" { "Search" }
        }
        (error_banner(error))
        @if recipes.is_empty() {
            p { "No recipes found." }
        } @else {
            ul {
                @for r in recipes {
                    li {
                        a href={ (prefix) "/recipes/" (r.id) "/" } { (r.name) }
                        " (" (r.category) ", " (r.prep_time) " min)"
                    }
                }
            }
        }
    };
    layout("Recipes", prefix, body)
}

pub fn detail(prefix: &str, rc: &RecipeWithComments) -> Markup {
    let r = &rc.recipe;
    let body = html! {
        h1 { (r.name) }
        @if let Some(url) = &r.image_url {
            img src=(url) alt=(r.name);
        }
        dl {
            dt { "Category" } dd { (r.category) }
            dt { "Preparation time" } dd { (r.prep_time) " min" }
            dt { "Description" } dd { (r.description) }
            dt { "Instructions" } dd { (r.instructions) }
        }
        h2 { "Comments" }
        @if rc.comments.is_empty() {
            p { "No comments yet." }
        } @else {
            ul {
                @for c in &rc.comments {
                    li {
                        (c.content)
                        " "
                        small { (c.created_at.format("%Y-%m-%d %H:%M").to_string()) }
                    }
                }
            }
        }
        form method="post" action={ (prefix) "/recipes/" (r.id) "/comments" } {
            textarea name="content" rows="3" {}
            button type="submit" { "Add comment" }
        }
    };
    layout(&r.name, prefix, body)
}

/// Add form, pre-filled with `values` when re-rendered after a rejected post.
pub fn add_form(prefix: &str, values: &[(String, String)], error: Option<&str>) -> Markup {
    let value_of = |key: &str| {
        values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let body = html! {
        h1 { "Add a recipe" }
        (error_banner(error))
        form method="post" action={ (prefix) "/recipes/add" } {
            @for field in RecipeField::ALL {
                p {
                    label for=(field.as_str()) { (field.as_str()) }
                    br;
                    @match field {
                        RecipeField::Description | RecipeField::Instructions => {
                            textarea id=(field.as_str()) name=(field.as_str()) rows="4" {
                                (value_of(field.as_str()).unwrap_or_default())
                            }
                        }
                        RecipeField::PrepTime => {
                            input type="number" id=(field.as_str()) name=(field.as_str())
                                value=[value_of(field.as_str())];
                        }
                        _ => {
                            input type="text" id=(field.as_str()) name=(field.as_str())
                                value=[value_of(field.as_str())];
                        }
                    }
                }
            }
            p {
                label for="image_url" { "image_url" }
                br;
                input type="url" id="image_url" name="image_url" value=[value_of("image_url")];
            }
            button type="submit" { "Save" }
        }
    };
    layout("Add a recipe", prefix, body)
}

pub fn not_found(prefix: &str) -> Markup {
    let body = html! {
        h1 { "Recipe not found" }
        p { a href={ (prefix) "/" } { "Back to the list" } }
    };
    layout("Not found", prefix, body)
}
