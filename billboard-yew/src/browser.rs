use billboard_lib::{error::{PredictError, ReadError}, media::FileHandle, EXAMPLE_IMAGE_MIME_TYPE, EXAMPLE_IMAGE_NAME, EXAMPLE_IMAGE_PATH, PREDICT_FIELD, PREDICT_PATH};
use gloo_net::http::{Request, Response};
use js_sys::Array;
use log::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Blob, File, FileList, FilePropertyBag, FormData, Url};

use crate::API_ROOT;

/// A file handed over by the picker, a drop, or the example fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile(pub File);

impl FileHandle for PickedFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    fn mime_type(&self) -> String {
        self.0.type_()
    }
}

pub fn picked_files(files: &FileList) -> Vec<PickedFile> {
    (0..files.length())
        .filter_map(|index| files.get(index))
        .map(PickedFile)
        .collect()
}

pub async fn read_data_url(file: &PickedFile) -> Result<String, ReadError> {
    let file_blob = gloo_file::File::from(file.0.clone());
    gloo_file::futures::read_as_data_url(&file_blob).await.map_err(|err| ReadError {
        name: file.0.name(),
        reason: err.to_string(),
    })
}

async fn response_blob(response: &Response) -> Result<Blob, String> {
    let blob_promise = response.as_raw().blob()
        .map_err(|err| format!("failed to get blob promise: {:?}", err))?;
    let blob = JsFuture::from(blob_promise).await
        .map_err(|err| format!("failed to get blob from blob promise: {:?}", err))?;
    blob.dyn_into::<Blob>()
        .map_err(|err| format!("response body is not a blob: {:?}", err))
}

/// Uploads `file` to the predict endpoint and returns an object URL for the
/// image that comes back.
pub async fn predict(file: &PickedFile) -> Result<String, PredictError> {
    let body = FormData::new()
        .map_err(|err| PredictError::Transport(format!("failed to create form data: {:?}", err)))?;
    body.append_with_blob_and_filename(PREDICT_FIELD, &file.0, &file.0.name())
        .map_err(|err| PredictError::Transport(format!("failed to append file to form data: {:?}", err)))?;

    let response = Request::post(&format!("{}{}", API_ROOT, PREDICT_PATH))
        .body(body)
        .send()
        .await
        .map_err(|err| PredictError::Transport(err.to_string()))?;
    if !response.ok() {
        return Err(PredictError::Status(response.status()));
    }

    let blob = response_blob(&response).await.map_err(PredictError::Body)?;
    Url::create_object_url_with_blob(&blob)
        .map_err(|err| PredictError::Body(format!("failed to create object url: {:?}", err)))
}

/// Downloads the bundled example image as if the user had picked it.
pub async fn fetch_example() -> Result<PickedFile, String> {
    let response = Request::get(&format!("{}{}", API_ROOT, EXAMPLE_IMAGE_PATH))
        .send()
        .await
        .map_err(|err| format!("failed to send example image request: {}", err))?;
    if !response.ok() {
        return Err(format!("bad response for example image: {}", response.status()));
    }

    let blob = response_blob(&response).await?;
    let mut options = FilePropertyBag::new();
    options.type_(EXAMPLE_IMAGE_MIME_TYPE);
    File::new_with_blob_sequence_and_options(&Array::of1(&blob), EXAMPLE_IMAGE_NAME, &options)
        .map(PickedFile)
        .map_err(|err| format!("failed to wrap example image as a file: {:?}", err))
}

pub fn revoke_object_url(url: &str) {
    if let Err(err) = Url::revoke_object_url(url) {
        warn!("Failed to revoke object url {}: {:?}", url, err);
    }
}

/// Blocking alert, the only user facing error channel.
pub fn notify(message: &str) {
    match window() {
        Some(window) => if let Err(err) = window.alert_with_message(message) {
            error!("Failed to show alert {:?}: {:?}", message, err);
        },
        None => error!("No window to show alert: {}", message),
    }
}
