//! Per-exercise content parsing.
//!
//! An exercise directory holds one JSON content document plus optional
//! media. The document has a `title` and a `content` array of typed items;
//! items of type `section` carry a heading and either a plain string or a
//! `{type, items}` list. [`load_exercise`] turns one directory into a
//! [`ParsedExercise`] whose text fields are never null.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::entity::exercise::DEFAULT_DIFFICULTY;
use crate::error::ContentError;

/// Content documents looked up in each exercise directory, in order.
pub const CONTENT_FILES: [&str; 2] = ["content.json", "metadata.json"];

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
const ANIMATION_EXTENSION: &str = "gif";

/// Normalized fields extracted from one exercise directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedExercise {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub instructions: String,
    pub benefits: String,
    pub muscles_worked: String,
    pub variations: String,
    pub image_path: Option<String>,
    pub animation_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDocument {
    title: Option<String>,
    description: Option<String>,
    difficulty: Option<String>,
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type", default)]
    kind: String,
    title: Option<String>,
    content: Option<SectionBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SectionBody {
    Text(String),
    List {
        #[serde(rename = "type")]
        kind: Option<String>,
        items: Vec<String>,
    },
    // images and anything else we do not render
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Copy)]
enum Heading {
    Instructions,
    Benefits,
    MusclesWorked,
    Variations,
    FormAndVisual,
}

impl Heading {
    fn label(self) -> &'static str {
        match self {
            Self::Instructions => "Instructions",
            Self::Benefits => "Benefits",
            Self::MusclesWorked => "Muscles Worked",
            Self::Variations => "Variations & Alternatives",
            Self::FormAndVisual => "Form & Visual",
        }
    }
}

impl SectionBody {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::List { kind, items } if kind.as_deref() == Some("steps") => items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::List { items, .. } => items
                .iter()
                .map(|item| format!("• {}", item.trim()))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Other(_) => String::new(),
        }
    }
}

impl ContentDocument {
    /// Renders the first `section` whose title is `"<title> <heading>"` or
    /// the bare heading. Missing sections render as an empty string.
    fn section(&self, title: &str, heading: Heading) -> String {
        let label = heading.label();
        let prefixed = format!("{title} {label}");

        self.content
            .iter()
            .filter(|item| item.kind == "section")
            .find(|item| {
                item.title
                    .as_deref()
                    .is_some_and(|t| t == prefixed || t == label)
            })
            .and_then(|item| item.content.as_ref())
            .map(SectionBody::render)
            .unwrap_or_default()
    }
}

/// Parses one content document. Media paths are left empty.
///
/// `fallback_title` is used when the document has no `title`.
pub fn parse_document(json: &str, fallback_title: &str) -> serde_json::Result<ParsedExercise> {
    let doc: ContentDocument = serde_json::from_str(json)?;

    let title = doc
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback_title)
        .to_string();

    let mut description = doc.section(&title, Heading::FormAndVisual);
    if description.is_empty() {
        description = doc
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
    }

    let difficulty = doc
        .difficulty
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DIFFICULTY)
        .to_string();

    Ok(ParsedExercise {
        instructions: doc.section(&title, Heading::Instructions),
        benefits: doc.section(&title, Heading::Benefits),
        muscles_worked: doc.section(&title, Heading::MusclesWorked),
        variations: doc.section(&title, Heading::Variations),
        description,
        difficulty,
        title,
        image_path: None,
        animation_path: None,
    })
}

/// Picks the still image and the animation out of a directory listing.
///
/// The first name (in the given order) with an image extension wins; a
/// `.gif` becomes the animation. Either may be absent.
pub fn select_media(file_names: &[String]) -> (Option<&str>, Option<&str>) {
    let extension = |name: &str| {
        Path::new(name)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
    };

    let image = file_names
        .iter()
        .find(|name| {
            extension(name.as_str()).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        })
        .map(String::as_str);
    let animation = file_names
        .iter()
        .find(|name| extension(name.as_str()).as_deref() == Some(ANIMATION_EXTENSION))
        .map(String::as_str);

    (image, animation)
}

/// Public URL under which an exercise's media file is served.
///
/// Spaces in every segment become hyphens.
pub fn public_asset_path(category_dir: &str, exercise_dir: &str, file_name: &str) -> String {
    format!(
        "/assets/{}/{}/{}",
        category_dir.replace(' ', "-"),
        exercise_dir.replace(' ', "-"),
        file_name.replace(' ', "-")
    )
}

/// Loads and normalizes one exercise directory.
///
/// `category_dir` is the raw name of the parent directory, used for media
/// URLs. Any error is meant to skip this exercise only.
pub async fn load_exercise(
    category_dir: &str,
    exercise_dir: &Path,
) -> Result<ParsedExercise, ContentError> {
    let dir_name = exercise_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (content_path, json) = read_content_file(exercise_dir).await?;
    let mut parsed =
        parse_document(&json, &dir_name).map_err(|source| ContentError::Malformed {
            path: content_path,
            source,
        })?;

    let file_names = list_files(exercise_dir).await?;
    let (image, animation) = select_media(&file_names);
    parsed.image_path = image.map(|file| public_asset_path(category_dir, &dir_name, file));
    parsed.animation_path =
        animation.map(|file| public_asset_path(category_dir, &dir_name, file));

    Ok(parsed)
}

async fn read_content_file(exercise_dir: &Path) -> Result<(PathBuf, String), ContentError> {
    for name in CONTENT_FILES {
        let path = exercise_dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => return Ok((path, json)),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(source) => return Err(ContentError::Read { path, source }),
        }
    }
    Err(ContentError::MissingContent(exercise_dir.to_path_buf()))
}

/// Names of the regular files directly inside `dir`, sorted.
async fn list_files(dir: &Path) -> Result<Vec<String>, ContentError> {
    let read_err = |source| ContentError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if entry.file_type().await.map_err(read_err)?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
