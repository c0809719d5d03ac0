use utoipa::OpenApi;

pub const ITEM_TAG: &str = "Items";
pub const FILE_TAG: &str = "Files";
pub const TASK_TAG: &str = "Tasks";
pub const CHAT_TAG: &str = "Chat";
pub const CONTACT_TAG: &str = "Contact";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quarry",
        description = "Paginated, filterable item store with file storage, background tasks and chat",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::common::SortOrder,
            crate::tasks::TaskStatus,
        )
    ),
    tags(
        (name = ITEM_TAG, description = "Item CRUD and listing endpoints"),
        (name = FILE_TAG, description = "File upload and download endpoints"),
        (name = TASK_TAG, description = "Background task endpoints"),
        (name = CHAT_TAG, description = "WebSocket chat endpoint"),
        (name = CONTACT_TAG, description = "Contact form endpoint"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
