//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! stores, the file system and the task queue on behalf of handlers.

mod file_service;
mod item_service;

pub use file_service::{FileEntry, FileService, StoredFile};
pub use item_service::ItemService;

use crate::config::FilesConfig;
use crate::repositories::Repositories;
use crate::tasks::TaskQueue;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap: stores sit behind `Arc` and the queue handle is shared.
#[derive(Clone)]
pub struct Services {
    pub items: ItemService,
    pub files: FileService,
    pub tasks: TaskQueue,
}

impl Services {
    pub fn new(repos: Repositories, files: &FilesConfig, tasks: TaskQueue) -> Self {
        Self {
            items: ItemService::new(repos.items),
            files: FileService::new(files),
            tasks,
        }
    }
}
