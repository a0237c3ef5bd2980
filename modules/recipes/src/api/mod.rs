pub mod html;
pub mod rest;
