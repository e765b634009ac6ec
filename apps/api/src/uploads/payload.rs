//! Normalizes the three accepted upload encodings into a name plus raw bytes.
//!
//! The branch is chosen from the declared `Content-Type` only; the body is
//! never sniffed.

use anyhow::anyhow;
use axum::{
    extract::{
        multipart::MultipartError, rejection::BytesRejection, FromRequest, Multipart, Query,
        Request,
    },
    http::{header, StatusCode},
    Json,
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;

/// Standard alphabet; padding optional.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const MULTIPART_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Multipart,
    OctetStream,
    Base64Json,
}

impl PayloadFormat {
    /// Matches the media type essence, ignoring parameters and case.
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        [Self::Multipart, Self::OctetStream, Self::Base64Json]
            .into_iter()
            .find(|format| essence.eq_ignore_ascii_case(format.mime()))
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Multipart => "multipart/form-data",
            Self::OctetStream => "application/octet-stream",
            Self::Base64Json => "application/json",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Multipart => "multipart",
            Self::OctetStream => "octet-stream",
            Self::Base64Json => "base64 JSON",
        }
    }
}

/// The two upload routes. They share every branch except multipart, which
/// only `/coverletter/upload` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEndpoint {
    Upload,
    File,
}

impl UploadEndpoint {
    pub fn accepted(self) -> &'static [PayloadFormat] {
        match self {
            Self::Upload => &[
                PayloadFormat::Multipart,
                PayloadFormat::OctetStream,
                PayloadFormat::Base64Json,
            ],
            Self::File => &[PayloadFormat::OctetStream, PayloadFormat::Base64Json],
        }
    }

    fn default_prefix(self) -> &'static str {
        match self {
            Self::Upload => "upload-",
            Self::File => "file-",
        }
    }

    /// Response message, e.g. `Uploaded (multipart)`.
    pub fn message(self, format: PayloadFormat) -> String {
        let verb = match self {
            Self::Upload => "Uploaded",
            Self::File => "File received",
        };
        format!("{verb} ({})", format.label())
    }

    /// `<prefix><unix millis>`, with `.bin` appended for raw bodies.
    pub fn default_filename(self, format: PayloadFormat) -> String {
        let ext = match format {
            PayloadFormat::OctetStream => ".bin",
            _ => "",
        };
        format!(
            "{}{}{ext}",
            self.default_prefix(),
            Utc::now().timestamp_millis()
        )
    }

    fn unsupported(self) -> AppError {
        AppError::UnsupportedMediaType {
            accepted: self.accepted().iter().map(|f| f.mime()).collect(),
        }
    }
}

/// A decoded upload, not yet written anywhere.
#[derive(Debug)]
pub struct IncomingFile {
    pub filename: String,
    pub bytes: Bytes,
    pub format: PayloadFormat,
}

#[derive(Debug, Deserialize)]
struct FilenameQuery {
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Base64Upload {
    filename: Option<String>,
    data: Option<String>,
}

/// Reads the request body according to its content type.
pub async fn read_upload(
    endpoint: UploadEndpoint,
    request: Request,
) -> Result<IncomingFile, AppError> {
    let format = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(PayloadFormat::from_content_type)
        .filter(|format| endpoint.accepted().contains(format))
        .ok_or_else(|| endpoint.unsupported())?;

    let file = match format {
        PayloadFormat::Multipart => read_multipart(endpoint, request).await?,
        PayloadFormat::OctetStream => read_octet_stream(endpoint, request).await?,
        PayloadFormat::Base64Json => read_base64_json(endpoint, request).await?,
    };
    Ok(file)
}

async fn read_multipart(
    endpoint: UploadEndpoint,
    request: Request,
) -> Result<IncomingFile, AppError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::UploadRejected(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(MULTIPART_FIELD) {
            tracing::debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = non_empty(field.file_name().map(str::to_string))
            .unwrap_or_else(|| endpoint.default_filename(PayloadFormat::Multipart));
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Empty file upload".to_string()));
        }

        return Ok(IncomingFile {
            filename,
            bytes,
            format: PayloadFormat::Multipart,
        });
    }

    Err(AppError::Validation(format!(
        "No file uploaded (field name: {MULTIPART_FIELD})"
    )))
}

async fn read_octet_stream(
    endpoint: UploadEndpoint,
    request: Request,
) -> Result<IncomingFile, AppError> {
    let Query(query) = Query::<FilenameQuery>::try_from_uri(request.uri())
        .map_err(|e| AppError::Validation(e.body_text()))?;
    let filename = non_empty(query.filename)
        .unwrap_or_else(|| endpoint.default_filename(PayloadFormat::OctetStream));

    let bytes = Bytes::from_request(request, &())
        .await
        .map_err(bytes_rejection)?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Empty binary body".to_string()));
    }

    Ok(IncomingFile {
        filename,
        bytes,
        format: PayloadFormat::OctetStream,
    })
}

async fn read_base64_json(
    endpoint: UploadEndpoint,
    request: Request,
) -> Result<IncomingFile, AppError> {
    let Json(body) = Json::<Base64Upload>::from_request(request, &())
        .await
        .map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(e.body_text())
            } else {
                AppError::Validation(e.body_text())
            }
        })?;

    let data = non_empty(body.data).ok_or_else(|| {
        AppError::Validation("JSON must include base64 `data` field".to_string())
    })?;
    let bytes = decode_base64(&data)?;
    if bytes.is_empty() {
        return Err(AppError::Validation(
            "base64 `data` decodes to an empty payload".to_string(),
        ));
    }

    Ok(IncomingFile {
        filename: non_empty(body.filename)
            .unwrap_or_else(|| endpoint.default_filename(PayloadFormat::Base64Json)),
        bytes: Bytes::from(bytes),
        format: PayloadFormat::Base64Json,
    })
}

/// Decodes standard base64, tolerating line breaks and missing padding.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, AppError> {
    let compact: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    BASE64
        .decode(compact)
        .map_err(|e| AppError::Internal(anyhow!(e).context("Failed to decode base64 data")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::UploadRejected(e.body_text())
    }
}

fn bytes_rejection(e: BytesRejection) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Internal(anyhow!(e.body_text()).context("Failed to read request body"))
    }
}
