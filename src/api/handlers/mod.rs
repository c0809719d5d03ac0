//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod chat;
pub mod contact;
pub mod files;
pub mod health;
pub mod items;
pub mod tasks;
