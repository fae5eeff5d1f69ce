use uuid::Uuid;
use tokio::fs::File;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use actix_files::NamedFile;
use actix_multipart::{Field, Multipart};
use sanitize_filename::sanitize;
use serde::Serialize;
use futures::{StreamExt, TryStreamExt};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder, Scope};
use actix_web::http::header::ContentDisposition;
use tokio::task::spawn_blocking;
use crate::utils::logging::*;
use crate::utils::log_entry::input::InputEntry;
use crate::utils::log_entry::system::SystemEntry;
use crate::detection::detection_manager::DetectionManager;
use crate::detection::utils::detection_result::DetectionResult;

pub fn initialize() -> Scope {
    web::scope("/detection")
        .service(detect)
        .service(download_result)
}

#[derive(Serialize)]
struct ApiDetection {
    object: String,
    confidence: String,
    confidence_score: f64,
    bbox: [u32; 4],
}

impl From<&DetectionResult> for ApiDetection {
    fn from(result: &DetectionResult) -> Self {
        Self {
            object: result.description.clone(),
            confidence: result.category.to_string(),
            confidence_score: result.score,
            bbox: result.region.to_array(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    ok: bool,
    image_url: Option<String>,
    targets: Vec<String>,
    results: Vec<ApiDetection>,
    message: Option<String>,
}

#[post("/detect")]
async fn detect(mut payload: Multipart) -> impl Responder {
    let uuid = Uuid::new_v4();
    let mut image_filename = String::new();
    let mut targets: Vec<String> = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = match field.content_disposition() {
            Some(content_disposition) => content_disposition,
            None => return HttpResponse::InternalServerError().finish(),
        };
        let field_name = match get_field_name(content_disposition) {
            Some(field_name) => field_name,
            None => return HttpResponse::BadRequest().body(InputEntry::InvalidPayload.to_string()),
        };
        if field_name == "targets" {
            match parse_targets(&mut field).await {
                Some(parsed) => targets = parsed,
                None => return HttpResponse::BadRequest().body(InputEntry::InvalidPayload.to_string()),
            }
        } else if field_name == "imageFile" {
            let file_name = match get_file_name(content_disposition) {
                Some(file_name) => file_name,
                None => return HttpResponse::BadRequest().body(InputEntry::InvalidPayload.to_string()),
            };
            let sanitized_file_name = sanitize(file_name);
            if sanitized_file_name.is_empty() {
                return HttpResponse::BadRequest().body(InputEntry::InvalidFileName.to_string());
            }
            let file_name = format!("{}_{}", uuid, sanitized_file_name);
            let file_extension = Path::new(&file_name).extension()
                .and_then(|os_str| os_str.to_str()).unwrap_or("");
            if !matches!(file_extension, "png" | "jpg" | "jpeg" | "webp") {
                return HttpResponse::BadRequest().body(InputEntry::UnsupportedMediaType.to_string());
            }
            let file_path = Path::new(".").join("SavedFile").join(&file_name);
            if create_file(&file_path, &mut field).await.is_err() {
                return HttpResponse::InternalServerError().finish();
            }
            image_filename = file_name;
        } else {
            return HttpResponse::BadRequest().body(InputEntry::InvalidPayload.to_string());
        }
    }
    if image_filename.is_empty() {
        return HttpResponse::BadRequest().body(InputEntry::InvalidPayload.to_string());
    }
    if targets.is_empty() {
        return HttpResponse::BadRequest().body(InputEntry::EmptyTargetList.to_string());
    }
    let file_path = Path::new(".").join("SavedFile").join(&image_filename);
    let loaded = spawn_blocking(move || image::open(&file_path).map(|image| image.to_rgb8())).await;
    remove_saved_upload(&image_filename).await;
    let image = match loaded {
        Ok(Ok(image)) => image,
        Ok(Err(err)) => {
            logging_error!(InputEntry::ImageDecodeError(image_filename.clone(), err));
            return HttpResponse::BadRequest().body(InputEntry::UnsupportedMediaType.to_string());
        },
        Err(err) => {
            logging_error!(SystemEntry::TaskPanickedError(err));
            return HttpResponse::InternalServerError().finish();
        },
    };
    let batch = match DetectionManager::detect_multiple(image, targets.clone()).await {
        Ok(batch) => batch,
        Err(entry) => {
            logging_entry!(entry);
            return HttpResponse::ServiceUnavailable().finish();
        },
    };
    let image_url = match batch.visualization {
        Some(visualization) => {
            let result_filename = format!("{}_result.png", uuid);
            let result_path = Path::new(".").join("Result").join(&result_filename);
            match spawn_blocking(move || visualization.save(&result_path)).await {
                Ok(Ok(())) => Some(format!("/api/detection/result/{}", result_filename)),
                Ok(Err(err)) => {
                    logging_error!("Unable to save annotated image", format!("Err: {err}"));
                    None
                },
                Err(err) => {
                    logging_error!(SystemEntry::TaskPanickedError(err));
                    None
                },
            }
        },
        None => None,
    };
    let results = batch.results.iter().map(ApiDetection::from).collect::<Vec<_>>();
    let message = results.is_empty().then(|| "no objects found".to_string());
    HttpResponse::Ok().json(ApiResponse {
        ok: true,
        image_url,
        targets,
        results,
        message,
    })
}

#[get("/result/{filename}")]
async fn download_result(req: HttpRequest, filename: web::Path<String>) -> impl Responder {
    let filename = sanitize(filename.into_inner());
    if filename.is_empty() {
        return HttpResponse::BadRequest().body(InputEntry::InvalidFileName.to_string());
    }
    let file_path = Path::new(".").join("Result").join(&filename);
    match NamedFile::open_async(&file_path).await {
        Ok(named_file) => named_file
            .set_content_type(mime_guess::from_path(&file_path).first_or_octet_stream())
            .into_response(&req),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

fn get_field_name(content_disposition: &ContentDisposition) -> Option<String> {
    content_disposition.get_name().map(|field_name| field_name.to_string())
}

fn get_file_name(content_disposition: &ContentDisposition) -> Option<String> {
    content_disposition.get_filename().map(|file_name| file_name.to_string())
}

async fn parse_targets(field: &mut Field) -> Option<Vec<String>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        data.extend_from_slice(&chunk.ok()?);
    }
    let text = String::from_utf8_lossy(&data).to_string();
    let targets = text.split(',')
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map(String::from)
        .collect();
    Some(targets)
}

async fn create_file(file_path: &PathBuf, field: &mut Field) -> Result<(), ()> {
    let mut file = File::create(&file_path).await.map_err(|_| ())?;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|_| ())?;
        file.write_all(&data).await.map_err(|_| ())?;
    }
    Ok(())
}

async fn remove_saved_upload(file_name: &str) {
    let file_path = Path::new(".").join("SavedFile").join(file_name);
    if let Err(err) = tokio::fs::remove_file(&file_path).await {
        logging_warning!("Unable to remove uploaded image", format!("Err: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saved_upload_is_removed_after_processing() {
        std::fs::create_dir_all("./SavedFile").unwrap();
        let file_name = format!("{}_upload.png", Uuid::new_v4());
        let file_path = Path::new(".").join("SavedFile").join(&file_name);
        std::fs::write(&file_path, b"payload").unwrap();
        remove_saved_upload(&file_name).await;
        assert!(!file_path.exists());
    }
}
