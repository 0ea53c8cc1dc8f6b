//! Browser-side transport: [`HttpRecordStore`] speaks the backend's JSON
//! protocol over fetch, [`CloudinaryUploader`] posts multipart image uploads.
//! Only compiled for wasm; native callers plug in their own stores.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, FormData};

use crate::api::{routes, AssetUploader, RecordStore, ReviewEnvelope, TopUserEnvelope, WriteAck};
use crate::config::{ClientConfig, UploadTarget};
use crate::error::{GatewayError, UploadError};
use crate::models::{FavoriteEntry, FavoritePayload, ImageFile, NewReview, Review, ReviewPatch};

/// [`RecordStore`] over the deployed HTTP backend.
pub struct HttpRecordStore {
    config: ClientConfig,
}

impl HttpRecordStore {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn url(&self, route: &str) -> String {
        self.config.endpoint(route)
    }
}

#[async_trait(?Send)]
impl RecordStore for HttpRecordStore {
    async fn list_reviews(&self, search: &str) -> Result<Vec<Review>, GatewayError> {
        let resp = Request::get(&self.url(&routes::reviews(search)))
            .send()
            .await
            .map_err(to_transport)?;
        strict_json(resp).await
    }

    async fn list_my_reviews(&self, email: &str) -> Result<Vec<Review>, GatewayError> {
        let resp = Request::get(&self.url(&routes::my_reviews(email)))
            .send()
            .await
            .map_err(to_transport)?;
        strict_json(resp).await
    }

    async fn fetch_review(&self, id: &str) -> Result<ReviewEnvelope, GatewayError> {
        let resp = Request::get(&self.url(&routes::review(id)))
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn create_review(&self, payload: &NewReview) -> Result<WriteAck, GatewayError> {
        let resp = Request::post(&self.url(&routes::create_review()))
            .json(payload)
            .map_err(to_transport)?
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<WriteAck, GatewayError> {
        let resp = Request::patch(&self.url(&routes::update_review(id)))
            .json(patch)
            .map_err(to_transport)?
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn delete_review(&self, id: &str) -> Result<WriteAck, GatewayError> {
        let resp = Request::delete(&self.url(&routes::delete_review(id)))
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn add_favorite(&self, payload: &FavoritePayload) -> Result<WriteAck, GatewayError> {
        let resp = Request::post(&self.url(&routes::add_favorite()))
            .json(payload)
            .map_err(to_transport)?
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn remove_favorite(&self, favorite_id: &str) -> Result<WriteAck, GatewayError> {
        let resp = Request::delete(&self.url(&routes::remove_favorite(favorite_id)))
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }

    async fn list_favorites(&self, email: &str) -> Result<Vec<FavoriteEntry>, GatewayError> {
        let resp = Request::get(&self.url(&routes::favorites(email)))
            .send()
            .await
            .map_err(to_transport)?;
        strict_json(resp).await
    }

    async fn top_user(&self) -> Result<TopUserEnvelope, GatewayError> {
        let resp = Request::get(&self.url(&routes::top_user()))
            .send()
            .await
            .map_err(to_transport)?;
        lenient_json(resp).await
    }
}

fn to_transport(err: gloo_net::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// List endpoints return bare JSON arrays; a non-OK status there is a
/// transport failure, full stop.
async fn strict_json<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    if !resp.ok() {
        return Err(GatewayError::Transport(format!("HTTP {}", resp.status())));
    }
    resp.json::<T>().await.map_err(to_transport)
}

/// Enveloped endpoints put `{ success, message }` in error bodies too, so a
/// rejection arriving with a 4xx status still surfaces its server message.
/// Only an unparseable body counts as transport failure.
async fn lenient_json<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let status = resp.status();
    match resp.json::<T>().await {
        Ok(parsed) => Ok(parsed),
        Err(err) if status < 400 => Err(to_transport(err)),
        Err(_) => Err(GatewayError::Transport(format!("HTTP {status}"))),
    }
}

/// What Cloudinary answers an unsigned upload with; only the hosted URL
/// matters here.
#[derive(Deserialize)]
struct UploadReceipt {
    secure_url: String,
}

/// [`AssetUploader`] posting to a Cloudinary unsigned upload preset.
pub struct CloudinaryUploader {
    target: UploadTarget,
}

impl CloudinaryUploader {
    pub fn new(target: UploadTarget) -> Self {
        Self { target }
    }
}

#[async_trait(?Send)]
impl AssetUploader for CloudinaryUploader {
    async fn upload(&self, image: &ImageFile) -> Result<String, UploadError> {
        let form = upload_form(image, &self.target.upload_preset).map_err(js_to_upload)?;
        let resp = Request::post(&self.target.upload_url())
            .body(form)
            .map_err(|err| UploadError(err.to_string()))?
            .send()
            .await
            .map_err(|err| UploadError(err.to_string()))?;
        if !resp.ok() {
            return Err(UploadError(format!("HTTP {}", resp.status())));
        }
        let receipt = resp
            .json::<UploadReceipt>()
            .await
            .map_err(|err| UploadError(err.to_string()))?;
        Ok(receipt.secure_url)
    }
}

fn upload_form(image: &ImageFile, preset: &str) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    let bytes = js_sys::Uint8Array::from(image.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(&image.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    form.append_with_blob_and_filename("file", &blob, &image.name)?;
    form.append_with_str("upload_preset", preset)?;
    Ok(form)
}

fn js_to_upload(err: JsValue) -> UploadError {
    UploadError(format!("{err:?}"))
}

/// Reads a picked `<input type="file">` value into an in-memory
/// [`ImageFile`] ready for the submission workflow.
pub async fn image_from_file(file: &File) -> Result<ImageFile, UploadError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(js_to_upload)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(ImageFile::new(file.name(), file.type_(), bytes))
}
