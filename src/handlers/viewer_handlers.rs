//! HTTP handlers for the upload-to-view flow: the index page, the upload
//! pipeline entry, session reset, and serving the processed rendering and
//! its nested assets. Storage concerns live in the services; these
//! handlers only translate HTTP in and out.

use crate::{
    errors::{AppError, Notice},
    services::{artifacts, session::SessionBinding, validation::MAX_UPLOAD_BYTES},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;

/// Cookie carrying the opaque session token.
const SESSION_COOKIE: &str = "ragview_session";

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub notice: Option<String>,
}

/// `GET /` — upload UI or viewer UI depending on session state, with an
/// optional notice banner resolved through the notice table.
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> Html<String> {
    let binding = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.current(cookie.value()).await,
        None => None,
    };
    let notice = query.notice.as_deref().and_then(Notice::from_code);
    Html(render_index(binding.as_ref(), notice))
}

/// `POST /upload` — run the ingestion pipeline on the multipart `file`
/// field and bind the verified artifact to the session.
pub async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(CookieJar, Redirect), AppError> {
    // Upfront declared-length check; the route's DefaultBodyLimit is the
    // transport backstop and maps to the same notice.
    if let Some(declared) = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        if declared > MAX_UPLOAD_BYTES {
            return Err(AppError::BodyTooLarge);
        }
    }

    let mut upload: Option<(Option<String>, bytes::Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_err)? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(map_multipart_err)?;
            upload = Some((filename, data));
            break;
        }
    }
    let Some((filename, data)) = upload else {
        return Err(crate::services::validation::ValidationError::MissingFile.into());
    };

    let artifact = state.pipeline.ingest(filename.as_deref(), data).await?;

    // Reuse the client's token when present, otherwise mint one.
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    state
        .sessions
        .bind(
            &token,
            SessionBinding {
                unique_filename: artifact.unique_filename.clone(),
                original_filename: artifact.original_filename,
            },
        )
        .await;
    info!(artifact = %artifact.unique_filename, "session bound");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok((jar.add(cookie), Notice::Uploaded.redirect()))
}

/// `GET /refresh` — clear the session binding and return to the upload UI.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.clear(cookie.value()).await;
    }
    Redirect::to("/")
}

/// `GET /load/{unique_filename}` — entry-point HTML for the viewer iframe.
pub async fn load_document(
    State(state): State<AppState>,
    Path(unique_filename): Path<String>,
) -> Result<Html<String>, AppError> {
    let content = artifacts::load_entry_point(&state.layout, &unique_filename).await?;
    Ok(Html(content))
}

/// `GET /load/assets/{category}/{filename}` — stream a generated asset.
///
/// Gated on session ownership: the artifact served is the one bound to the
/// caller's session, not whatever exists on disk.
pub async fn load_asset(
    State(state): State<AppState>,
    jar: CookieJar,
    Path((category, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let token = jar.get(SESSION_COOKIE).ok_or(AppError::NoSession)?;
    let binding = state
        .sessions
        .current(token.value())
        .await
        .ok_or(AppError::NoSession)?;

    let (file, len, content_type) =
        artifacts::open_asset(&state.layout, &binding.unique_filename, &category, &filename)
            .await?;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&len.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    Ok(response)
}

/// `GET /file_size_error` — target of the client-side size pre-check;
/// surfaces the same notice as the server-side ceiling.
pub async fn file_size_error() -> Redirect {
    Notice::FileTooLarge.redirect()
}

/// Oversized bodies rejected by the transport layer must produce the same
/// notice as the upfront ceiling check; anything else is unexpected.
fn map_multipart_err(err: MultipartError) -> AppError {
    if err.into_response().status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge
    } else {
        AppError::Unexpected(anyhow::anyhow!("malformed multipart request"))
    }
}

fn render_index(binding: Option<&SessionBinding>, notice: Option<Notice>) -> String {
    let notice_html = notice
        .map(|n| format!(r#"<div class="notice">{}</div>"#, n.message()))
        .unwrap_or_default();

    // Unique and original filenames are sanitized to [A-Za-z0-9._-] plus a
    // UUID prefix, so they can be interpolated without escaping.
    let main = match binding {
        Some(binding) => format!(
            concat!(
                r#"<a class="reset" href="/refresh">Start over</a>"#,
                r#"<p class="docname">{original}</p>"#,
                r#"<iframe class="viewer" src="/load/{unique}"></iframe>"#,
            ),
            original = binding.original_filename,
            unique = binding.unique_filename,
        ),
        None => UPLOAD_FORM.to_string(),
    };

    PAGE_TEMPLATE
        .replace("{notice}", &notice_html)
        .replace("{main}", &main)
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>RAG Document Viewer</title>
<style>
  body { margin: 0; font-family: 'Helvetica Neue', Arial, sans-serif;
         background: #111; color: #f3f3f3; min-height: 100vh; }
  h2 { text-align: center; margin: 0.5rem 0; }
  .notice { position: fixed; top: 25px; left: 50%; transform: translateX(-50%);
            background: rgba(0, 57, 150, 0.6); padding: 12px 20px;
            border-radius: 6px; z-index: 10; }
  .upload-area { max-width: 500px; height: 280px; margin: 15vh auto;
                 border: 2px dashed #4a5568; border-radius: 8px;
                 display: flex; flex-direction: column; align-items: center;
                 justify-content: center; cursor: pointer; }
  .upload-area p { color: #9ca3af; font-size: 14px; text-align: center; }
  .file-input { display: none; }
  .viewer { display: block; width: 100%; height: calc(100vh - 80px);
            border: none; background: #fff; }
  .docname { text-align: center; color: #9ca3af; margin: 0; }
  .reset { position: fixed; top: 0.5rem; left: 0.5rem; background: #212529;
           color: #fff; text-decoration: none; border-radius: 6px;
           padding: 10px 16px; font-size: 14px; }
</style>
</head>
<body>
{notice}
<h2>RAG Document Viewer</h2>
{main}
<script>
  const area = document.getElementById('uploadArea');
  if (area) {
    const input = document.getElementById('fileInput');
    const form = document.getElementById('uploadForm');
    const maxSize = 16 * 1024 * 1024;
    area.addEventListener('click', () => input.click());
    input.addEventListener('change', () => {
      if (input.files.length === 0) return;
      if (input.files[0].size > maxSize) {
        input.value = '';
        window.location.href = '/file_size_error';
        return;
      }
      form.submit();
    });
  }
  setTimeout(() => {
    const notice = document.querySelector('.notice');
    if (notice) notice.style.display = 'none';
  }, 5000);
</script>
</body>
</html>
"#;

const UPLOAD_FORM: &str = r#"<form id="uploadForm" method="POST" action="/upload" enctype="multipart/form-data">
  <div class="upload-area" id="uploadArea">
    <div>Drop your file here or click to browse</div>
    <p>Supports: PDFs, Office documents, OpenOffice documents<br>(Max: 16MB)</p>
    <input type="file" name="file" class="file-input" id="fileInput"
           accept=".txt,.pdf,.doc,.docx,.ppt,.pptx,.xls,.xlsx,.odt,.odp,.ods">
  </div>
</form>"#;
