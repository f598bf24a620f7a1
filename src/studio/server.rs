use crate::{
    config::ServerConfig,
    encoder,
    error::{Result, StudioError},
    gemini::ImageGenerator,
    models::ReferenceUpload,
    studio::{
        render,
        session::{SessionStore, SESSION_COOKIE},
        state::StudioState,
    },
};
use actix_multipart::{Field, Multipart};
use actix_web::{
    cookie::{Cookie, SameSite},
    http::header,
    web, App, HttpRequest, HttpResponse, HttpResponseBuilder, HttpServer,
};
use futures::TryStreamExt;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound for plain text form fields such as the brand name.
pub const MAX_TEXT_FIELD_BYTES: usize = 256;

pub struct AppState {
    pub store: Arc<SessionStore>,
    pub generator: Arc<dyn ImageGenerator>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(generator: Arc<dyn ImageGenerator>, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(SessionStore::new(config.session_ttl)),
            generator,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Fields of the configuration form. Every field is optional.
#[derive(Debug, Default)]
pub struct StudioForm {
    pub upload: Option<ReferenceUpload>,
    pub brand_name: Option<String>,
    pub image_count: Option<i32>,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/reference", web::post().to(upload_reference))
        .route("/reference/preview", web::get().to(reference_preview))
        .route("/generate", web::post().to(generate))
        .route("/health", web::get().to(health));
}

pub async fn run(config: ServerConfig, generator: Arc<dyn ImageGenerator>) -> Result<()> {
    let data = web::Data::new(AppState::new(generator, &config));
    let address = config.bind_address();

    log::info!("Studio listening on http://{}:{}", address.0, address.1);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
        .bind(address.clone())
        .map_err(|e| StudioError::Server(format!("cannot bind {}:{}: {}", address.0, address.1, e)))?
        .run()
        .await
        .map_err(|e| StudioError::Server(e.to_string()))
}

fn session_id(req: &HttpRequest) -> (Uuid, bool) {
    req.cookie(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
        .map(|id| (id, false))
        .unwrap_or_else(|| (Uuid::new_v4(), true))
}

fn with_cookie(mut builder: HttpResponseBuilder, id: Uuid, is_new: bool) -> HttpResponseBuilder {
    if is_new {
        builder.cookie(
            Cookie::build(SESSION_COOKIE, id.to_string())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish(),
        );
    }
    builder
}

fn back_to_studio(id: Uuid, is_new: bool) -> HttpResponse {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, "/"));
    with_cookie(builder, id, is_new).finish()
}

async fn index(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let (id, is_new) = session_id(&req);
    let state = data.store.snapshot(id);

    with_cookie(HttpResponse::Ok(), id, is_new)
        .content_type("text/html; charset=utf-8")
        .body(render::render_page(&state))
}

async fn reference_preview(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let (id, _) = session_id(&req);
    match data.store.snapshot(id).reference {
        Some(upload) => HttpResponse::Ok()
            .content_type(encoder::resolve_mime_type(&upload))
            .insert_header((header::CACHE_CONTROL, "private, max-age=3600"))
            .body(upload.bytes),
        None => HttpResponse::NotFound().finish(),
    }
}

async fn upload_reference(
    req: HttpRequest,
    payload: Multipart,
    data: web::Data<AppState>,
) -> HttpResponse {
    let (id, is_new) = session_id(&req);
    let form = read_form(payload, data.max_upload_bytes).await;
    data.store.with_session(id, |state| apply_form(state, form));
    back_to_studio(id, is_new)
}

async fn generate(req: HttpRequest, payload: Multipart, data: web::Data<AppState>) -> HttpResponse {
    let (id, is_new) = session_id(&req);
    let form = read_form(payload, data.max_upload_bytes).await;

    let pending = data.store.with_session(id, |state| {
        if apply_form(state, form) {
            state.begin_generation()
        } else {
            None
        }
    });

    if let Some(pending) = pending {
        log::info!(
            "Session {} requested {} image(s) for brand {:?}",
            id,
            pending.count,
            pending.brand_name
        );
        let store = Arc::clone(&data.store);
        let generator = Arc::clone(&data.generator);
        actix_web::rt::spawn(async move {
            pending
                .run_then(generator, move |outcome| {
                    store.with_session(id, |state| state.finish_generation(outcome))
                })
                .await;
        });
    }

    back_to_studio(id, is_new)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Applies a parsed form to the session. Returns false when the form was rejected.
fn apply_form(state: &mut StudioState, form: Result<StudioForm>) -> bool {
    let form = match form {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Rejected studio form: {}", e);
            state.report(&e);
            return false;
        }
    };

    if let Some(brand_name) = form.brand_name {
        state.set_brand_name(brand_name.trim());
    }
    if let Some(count) = form.image_count {
        state.set_image_count(count);
    }
    if let Some(upload) = form.upload {
        if let Err(e) = encoder::validate(&upload) {
            log::warn!("Rejected reference upload: {}", e);
            state.report(&e);
            return false;
        }
        state.select_reference(upload);
    }
    true
}

pub async fn read_form(mut payload: Multipart, max_upload_bytes: usize) -> Result<StudioForm> {
    let mut form = StudioForm::default();

    while let Some(field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().to_string();
        match name.as_str() {
            "image" => form.upload = read_upload(field, max_upload_bytes).await?,
            "brand_name" => form.brand_name = Some(read_text(field, MAX_TEXT_FIELD_BYTES).await?),
            "image_count" => {
                form.image_count = read_text(field, MAX_TEXT_FIELD_BYTES).await?.trim().parse().ok()
            }
            other => log::debug!("Ignoring unknown form field {:?}", other),
        }
    }

    Ok(form)
}

async fn read_upload(mut field: Field, limit: usize) -> Result<Option<ReferenceUpload>> {
    let file_name = field
        .content_disposition()
        .get_filename()
        .filter(|name| !name.is_empty())
        .map(String::from);
    let declared_type = field.content_type().map(|m| m.essence_str().to_string());

    let mut bytes = web::BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(StudioError::Encoding(format!(
                "the file is larger than {}",
                describe_size(limit)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    // An empty file input still submits a nameless, empty part.
    if bytes.is_empty() && file_name.is_none() {
        return Ok(None);
    }

    let mut upload = ReferenceUpload::new(bytes.freeze(), declared_type);
    if let Some(name) = file_name {
        upload = upload.with_file_name(name);
    }
    Ok(Some(upload))
}

async fn read_text(mut field: Field, limit: usize) -> Result<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            return Err(StudioError::Encoding(format!(
                "the {} field is longer than {}",
                field.name(),
                describe_size(limit)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|e| StudioError::Encoding(format!("form field is not UTF-8: {}", e)))
}

fn describe_size(bytes: usize) -> String {
    const MB: usize = 1024 * 1024;
    if bytes >= MB {
        format!("{} MB", bytes / MB)
    } else {
        format!("{} bytes", bytes)
    }
}

fn multipart_error(e: actix_multipart::MultipartError) -> StudioError {
    StudioError::Encoding(format!("malformed upload: {}", e))
}
