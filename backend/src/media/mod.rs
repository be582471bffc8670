//! Image and speech boundaries, and the directory their files land in.

use crate::error::MediaError;
use async_trait::async_trait;
use image::ImageFormat;
use log::info;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Parameters of one image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub count: u8,
}

impl ImageRequest {
    /// A square standard-quality image; a non-empty `style` is appended to the
    /// prompt as `", style: <style>."`.
    pub fn new(prompt: &str, style: &str) -> Self {
        let prompt = if style.trim().is_empty() {
            prompt.trim().to_string()
        } else {
            format!("{}, style: {}.", prompt.trim(), style.trim())
        };
        Self {
            prompt,
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            count: 1,
        }
    }
}

#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Generate one image and return its encoded bytes.
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, MediaError>;
}

#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// Text to mp3 audio.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, MediaError>;

    /// Audio to text. Fails with [`MediaError::Unrecognized`] when nothing
    /// could be recognized.
    async fn transcribe(
        &self,
        file_name: &str,
        audio: Vec<u8>,
        language: &str,
    ) -> Result<String, MediaError>;
}

/// The loose-file side of the resource library: generated images, audio and
/// exported PDFs, referenced from `resources.file_path`.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Decode `bytes` as any supported image format and store it as PNG.
    /// The file is named after the MD5 of the PNG data, so saving the same
    /// image twice reuses one file. The resource store refuses a second
    /// resource on the same file.
    pub fn save_image(&self, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        let img = image::load_from_memory(bytes)?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut hasher = md5::Context::new();
        hasher.consume(&png);

        self.ensure_dir()?;
        let path = self.dir.join(format!("img_{:x}.png", hasher.finalize()));
        fs::write(&path, &png)?;
        info!("Image stored at {}", path.display());
        Ok(path)
    }

    /// Store synthesized audio under a fresh `tts_*.mp3` name.
    pub fn save_audio(&self, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        self.ensure_dir()?;
        let mut file = tempfile::Builder::new()
            .prefix("tts_")
            .suffix(".mp3")
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        info!("Audio stored at {}", path.display());
        Ok(path)
    }

    /// Download name of an exported PDF for `title`.
    pub fn pdf_file_name(&self, title: &str) -> String {
        format!("{}.pdf", pdf_stem(title))
    }

    /// Where an exported PDF for `title` is written. Every export gets its own
    /// file, so a saved resource never sees its PDF replaced.
    pub fn pdf_path(&self, title: &str) -> PathBuf {
        let suffix = Uuid::new_v4().simple().to_string();
        self.dir.join(format!("{}_{}.pdf", pdf_stem(title), &suffix[..8]))
    }

    /// Path of a plain file name inside the library. Anything that is not a
    /// single normal path component is rejected.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.dir.join(file_name)),
            _ => None,
        }
    }

    /// Whether `path` points at an existing file inside the library.
    pub fn contains(&self, path: &Path) -> bool {
        match (fs::canonicalize(&self.dir), fs::canonicalize(path)) {
            (Ok(dir), Ok(file)) => file.starts_with(dir) && file.is_file(),
            _ => false,
        }
    }
}

fn pdf_stem(title: &str) -> String {
    let name: String = title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '.') {
        "course".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 10, 10]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn style_is_appended_to_prompt() {
        let req = ImageRequest::new("an astronaut on Mars", "卡通插画");
        assert_eq!(req.prompt, "an astronaut on Mars, style: 卡通插画.");
        assert_eq!(req.size, "1024x1024");
        assert_eq!(req.count, 1);
        assert_eq!(ImageRequest::new("plain", "  ").prompt, "plain");
    }

    #[test]
    fn images_are_stored_as_png_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path().join("media"));

        let first = library.save_image(&png_bytes()).unwrap();
        let second = library.save_image(&png_bytes()).unwrap();

        assert_eq!(first, second);
        assert!(first.exists());
        assert_eq!(first.extension().unwrap(), "png");
        assert!(library.contains(&first));
    }

    #[test]
    fn garbage_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        let err = library.save_image(b"not an image").unwrap_err();
        assert!(matches!(err, MediaError::Image(_)));
    }

    #[test]
    fn audio_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        let path = library.save_audio(b"ID3 fake mp3").unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(fs::read(&path).unwrap(), b"ID3 fake mp3");
    }

    #[test]
    fn resolve_rejects_traversal() {
        let library = MediaLibrary::new("/srv/media");
        assert_eq!(
            library.resolve("img_1.png"),
            Some(PathBuf::from("/srv/media/img_1.png"))
        );
        assert_eq!(library.resolve("../secret"), None);
        assert_eq!(library.resolve("a/b.png"), None);
        assert_eq!(library.resolve("/etc/passwd"), None);
    }

    #[test]
    fn files_outside_the_library_are_not_contained() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::NamedTempFile::new().unwrap();
        let library = MediaLibrary::new(dir.path());
        assert!(!library.contains(outside.path()));
    }

    #[test]
    fn pdf_names_are_sanitized() {
        let library = MediaLibrary::new("out");
        assert_eq!(
            library.pdf_file_name("Intro to Algebra/1"),
            "Intro_to_Algebra_1.pdf"
        );
        assert_eq!(library.pdf_file_name("  "), "course.pdf");

        let path = library.pdf_path("Intro to Algebra/1");
        assert_eq!(path.parent(), Some(Path::new("out")));
        let stored = path.file_name().unwrap().to_str().unwrap();
        assert!(stored.starts_with("Intro_to_Algebra_1_"));
        assert!(stored.ends_with(".pdf"));
    }

    #[test]
    fn each_export_gets_its_own_file() {
        let library = MediaLibrary::new("out");
        assert_ne!(library.pdf_path("Algebra"), library.pdf_path("Algebra"));
    }
}
