use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CreateFolderRequest { pub name: String, pub icon: Option<String> }

#[derive(utoipa::ToSchema)]
pub struct CreateBookmarkRequest {
    pub folder_id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct BridgeRequestDoc {
    pub action: String,
    #[schema(value_type = Option<Object>)]
    pub params: Option<serde_json::Value>,
    pub api_key: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::folders::list,
        crate::routes::folders::create,
        crate::routes::bookmarks::create,
        crate::routes::bookmarks::search,
        crate::routes::apikey::get_key,
        crate::routes::public::get_folder,
        crate::routes::bridge::dispatch,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateFolderRequest,
            CreateBookmarkRequest,
            BridgeRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "folders"),
        (name = "bookmarks"),
        (name = "api-key"),
        (name = "public"),
        (name = "bridge")
    )
)]
pub struct ApiDoc;
