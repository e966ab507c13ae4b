//! Image upload handler.
//!
//! Uploaded files are stored under the configured uploads directory with a
//! UUID filename and served back via the static `/uploads/` route.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::{images::ImageUploadResponse, users::CurrentUser},
    errors::{Error, Result},
};

/// Upload an image
#[utoipa::path(
    post,
    path = "/images",
    tag = "images",
    request_body(content_type = "multipart/form-data", description = "Image file upload"),
    responses(
        (status = 201, description = "Image uploaded", body = ImageUploadResponse),
        (status = 400, description = "No file in the request"),
        (status = 401, description = "Not authenticated"),
        (status = 413, description = "File too large"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImageUploadResponse>)> {
    let max_file_size = state.config.uploads.max_file_size;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            // Not a file field, skip it
            continue;
        };

        let file_id = Uuid::new_v4();
        let filename = match Path::new(&original_name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{file_id}.{}", ext.to_ascii_lowercase()),
            None => file_id.to_string(),
        };

        tracing::info!(user_id = %current_user.id, filename = %filename, original = %original_name, "Storing uploaded image");

        tokio::fs::create_dir_all(&state.config.uploads.dir)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("create uploads directory: {e}"),
            })?;

        let path = state.config.uploads.dir.join(&filename);
        let mut file = tokio::fs::File::create(&path).await.map_err(|e| Error::Internal {
            operation: format!("create upload file: {e}"),
        })?;

        // Stream chunks to disk, enforcing the size cap as we go
        let mut total_size = 0u64;
        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(Error::BadRequest {
                        message: format!("Failed to read file chunk: {e}"),
                    });
                }
            };

            total_size += chunk.len() as u64;
            if total_size > max_file_size {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(Error::PayloadTooLarge {
                    message: format!("File size exceeds maximum allowed size of {max_file_size} bytes"),
                });
            }

            if let Err(e) = file.write_all(&chunk).await {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(Error::Internal {
                    operation: format!("write upload file: {e}"),
                });
            }
        }

        file.flush().await.map_err(|e| Error::Internal {
            operation: format!("flush upload file: {e}"),
        })?;

        return Ok((
            StatusCode::CREATED,
            Json(ImageUploadResponse {
                url: format!("/uploads/{filename}"),
            }),
        ));
    }

    Err(Error::BadRequest {
        message: "No file found in the request".to_string(),
    })
}
