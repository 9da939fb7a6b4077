use std::path::{Component, Path, PathBuf};

use billboard_lib::media::extension_of;

pub const INDEX_FILE: &'static str = "index.html";

/// Maps a request path onto a file below `root`. Anything that could climb
/// out of `root` resolves to `None`. An empty path means the index page.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let request_path = request_path.trim_start_matches('/');
    let relative = if request_path.is_empty() {
        Path::new(INDEX_FILE)
    } else {
        Path::new(request_path)
    };

    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {},
            _ => return None,
        }
    }
    Some(resolved)
}

pub fn content_type(path: &Path) -> &'static str {
    let name = match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name,
        None => return "application/octet-stream",
    };
    match extension_of(name).as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}
