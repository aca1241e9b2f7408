// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod comments;
pub mod profile;
pub mod reviews;
pub mod titles;
