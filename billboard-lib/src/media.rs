//! Accepted media types, the upload filter and size labels.

pub const IMAGE_EXTENSIONS: [&'static str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];
pub const VIDEO_EXTENSIONS: [&'static str; 2] = ["mov", "mp4"];

const SIZE_UNITS: [&'static str; 4] = ["Bytes", "KB", "MB", "GB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Detect the media kind from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Which preview element to build. Anything that isn't `image/*` plays as video.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }
}

/// What the filter needs to know about a platform file handle.
pub trait FileHandle {
    fn name(&self) -> String;
    fn size(&self) -> u64;
    fn mime_type(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile<F> {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub extension: String,
    pub handle: F,
}

impl<F: FileHandle> MediaFile<F> {
    /// Wraps `handle` if its name carries an accepted extension.
    pub fn accept(handle: F) -> Option<Self> {
        let name = handle.name();
        let extension = extension_of(&name)?;
        MediaKind::from_extension(&extension)?;
        Some(MediaFile {
            size: handle.size(),
            mime_type: handle.mime_type(),
            name,
            extension,
            handle,
        })
    }
}

impl<F> MediaFile<F> {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime_type(&self.mime_type)
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size)
    }
}

/// Lowercased text after the last `.`, `None` if there is no dot.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_lowercase())
}

pub fn is_accepted(name: &str) -> bool {
    match extension_of(name) {
        Some(ext) => MediaKind::from_extension(&ext).is_some(),
        None => false,
    }
}

/// Keeps the files with an accepted extension, in order. Everything else is
/// dropped without complaint.
pub fn accept_files<F: FileHandle, I: IntoIterator<Item = F>>(files: I) -> Vec<MediaFile<F>> {
    files.into_iter().filter_map(MediaFile::accept).collect()
}

/// Human readable size, e.g. `1536 -> "1.5 KB"`. Sizes of 1024 GB and up stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Bytes");
    }

    let mut index = 0;
    while index + 1 < SIZE_UNITS.len() && bytes >= 1024u64.pow(index as u32 + 1) {
        index += 1;
    }

    let value = bytes as f64 / 1024f64.powi(index as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[index])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct FakeFile {
        pub name: &'static str,
        pub size: u64,
        pub mime_type: &'static str,
    }

    impl FakeFile {
        pub(crate) fn new(name: &'static str, size: u64, mime_type: &'static str) -> Self {
            FakeFile { name, size, mime_type }
        }
    }

    impl FileHandle for FakeFile {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn size(&self) -> u64 {
            self.size
        }

        fn mime_type(&self) -> String {
            self.mime_type.to_string()
        }
    }

    #[test]
    fn accepts_known_extensions_in_any_case() {
        for name in [
            "a.jpg", "a.jpeg", "a.png", "a.bmp", "a.webp", "a.mov", "a.mp4",
            "A.JPG", "clip.MoV", "photo.PNG", "my.holiday.Webp",
        ] {
            assert!(is_accepted(name), "{} should be accepted", name);
        }
    }

    #[test]
    fn drops_unknown_or_missing_extensions() {
        for name in ["notes.txt", "archive.tar.gz", "jpg", "photo.", "", "image.jpg.exe", "movie.mkv"] {
            assert!(!is_accepted(name), "{} should be dropped", name);
        }
    }

    #[test]
    fn extension_is_after_last_dot() {
        assert_eq!(extension_of("a.b.C"), Some(String::from("c")));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), Some(String::from("hidden")));
    }

    #[test]
    fn accept_files_filters_and_keeps_order() {
        let accepted = accept_files(vec![
            FakeFile::new("b.mp4", 10, "video/mp4"),
            FakeFile::new("readme.md", 5, "text/markdown"),
            FakeFile::new("a.JPEG", 20, "image/jpeg"),
        ]);
        let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.mp4", "a.JPEG"]);
        assert_eq!(accepted[1].extension, "jpeg");
        assert_eq!(accepted[1].size, 20);
    }

    #[test]
    fn preview_kind_follows_mime_type() {
        assert_eq!(MediaKind::from_mime_type("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime_type("video/quicktime"), MediaKind::Video);
        // browsers leave the type empty when they can't tell
        assert_eq!(MediaKind::from_mime_type(""), MediaKind::Video);
        assert_eq!(MediaKind::from_extension("MP4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("gif"), None);
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1 MB");
        assert_eq!(format_file_size(1234567), "1.18 MB");
        assert_eq!(format_file_size(1024u64.pow(3)), "1 GB");
    }

    #[test]
    fn huge_sizes_clamp_to_gb() {
        assert_eq!(format_file_size(1024u64.pow(4)), "1024 GB");
        assert_eq!(format_file_size(2 * 1024u64.pow(4)), "2048 GB");
    }
}
