//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `item` - Item CRUD and listing DTOs
//! - `contact` - Contact form submission
//! - `file` - Upload/list responses
//! - `task` - Background task submission and status
//! - `health` - Health check responses
//! - `error` - Common error response DTOs

mod contact;
mod error;
mod file;
mod health;
mod item;
mod task;

pub use contact::{ContactForm, ContactResponse, ContactSubmission};
pub use error::ErrorResponse;
pub use file::{FileInfo, FileListResponse, FileUploadResponse};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use item::{CreateItemRequest, ItemListQuery, ItemResponse, UpdateItemRequest};
pub use task::{
    LogQuery, ProcessDataRequest, SendEmailRequest, TaskAcceptedResponse, TaskStatusResponse,
};
