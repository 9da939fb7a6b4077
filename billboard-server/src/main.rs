use std::path::{Path, PathBuf};

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{HttpServer, App, web, get, post, HttpResponse, http::header};
use billboard_lib::PREDICT_FIELD;
use billboard_server::{inference::InferenceClient, static_files::{resolve, content_type}};
use clap::Parser;
use futures_util::TryStreamExt;
use log::{error, info, warn};
use serde_json::json;
use tokio::{io::AsyncWriteExt, fs::File};
use tokio_util::io::ReaderStream;

#[derive(Debug, Clone)]
struct Config {
    dist_dir: PathBuf,
    static_dir: PathBuf,
}

async fn serve_file(root: &Path, request_path: &str) -> Result<HttpResponse, actix_web::Error> {
    let path = resolve(root, request_path).ok_or(actix_web::error::ErrorNotFound("file not found"))?;
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {},
        _ => return Err(actix_web::error::ErrorNotFound("file not found")),
    }
    let file = File::open(&path).await.map_err(|e| {
        warn!("Failed to open {}: {}", path.display(), e);
        actix_web::error::ErrorNotFound("file not found")
    })?;
    Ok(HttpResponse::Ok()
        .content_type(content_type(&path))
        .streaming(ReaderStream::new(file)))
}

#[get("/static/{path:.*}")]
async fn static_file(config: web::Data<Config>, path: web::Path<String>) -> Result<HttpResponse, actix_web::Error> {
    serve_file(&config.static_dir, &path).await
}

#[get("/{path:.*}")]
async fn dist_file(config: web::Data<Config>, path: web::Path<String>) -> Result<HttpResponse, actix_web::Error> {
    serve_file(&config.dist_dir, &path).await
}

/// `attachment; filename="processed_<name>"`, quoted by the typed header.
fn processed_disposition(filename: &str) -> header::ContentDisposition {
    header::ContentDisposition {
        disposition: header::DispositionType::Attachment,
        parameters: vec![header::DispositionParam::Filename(format!("processed_{}", filename))],
    }
}

#[post("/predict")]
async fn predict(inference: web::Data<InferenceClient>, mut multipart: Multipart) -> Result<HttpResponse, actix_web::Error> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(mut field) = multipart.try_next().await? {
        let is_file = upload.is_none() && field.content_disposition().get_name() == Some(PREDICT_FIELD);
        let filename = field.content_disposition().get_filename().unwrap_or_default().to_string();

        let mut field_bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if is_file {
                field_bytes.write_all(&chunk).await?;
            }
        }
        drop(field);

        if is_file {
            upload = Some((filename, field_bytes));
        }
    }

    let (filename, file_bytes) = match upload {
        Some(upload) => upload,
        None => return Ok(HttpResponse::BadRequest().json(json!({"error": "No file provided"}))),
    };
    if filename.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "No file selected"})));
    }

    info!("Relaying {} ({} bytes) to inference service", filename, file_bytes.len());
    match inference.predict(&filename, file_bytes).await {
        Ok(image) => Ok(HttpResponse::Ok()
            .content_type("image/jpeg")
            .insert_header(processed_disposition(&filename))
            .body(image)),
        Err(err) => {
            error!("Prediction for {} failed: {}", filename, err);
            Ok(HttpResponse::BadGateway().json(json!({"error": err.to_string()})))
        }
    }
}

#[derive(Parser)]
#[clap(version, about="Serves the billboard detection upload page and relays predictions")]
struct Args {
    #[clap(short, long, default_value = "127.0.0.1:5001")]
    address: String,

    /// Built frontend (trunk output)
    #[clap(long, default_value = "billboard-yew/dist")]
    dist_dir: String,

    /// Served under /static, holds imgs/exampleImg.jpg
    #[clap(long, default_value = "static")]
    static_dir: String,

    #[clap(long)]
    inference_url: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = Config {
        dist_dir: PathBuf::from(&args.dist_dir),
        static_dir: PathBuf::from(&args.static_dir),
    };
    let inference = InferenceClient::new(args.inference_url);
    info!("Serving {} on {}, predictions go to {}", args.dist_dir, args.address, inference.url());

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::default()
                .allow_any_origin()
                .allowed_methods(["GET", "POST"])
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(inference.clone()))
            .service(predict)
            .service(static_file)
            .service(dist_file)
    })
        .bind(args.address)?
        .run()
        .await
}
