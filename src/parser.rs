//! Defines the [`Parser`] and [`Error`] types: the logic for loading
//! [`Post`]s from markdown source files into memory. Only the frontmatter is
//! interpreted; post bodies are never rendered.

use std::{
    collections::BTreeSet,
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

use crate::post::{newest_first, Post};

const MARKDOWN_EXTENSION: &str = "md";
const BUNDLE_INDEX: &str = "index.md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}{post_id}.html`).
    /// It should end with a trailing slash.
    posts_url: &'a Url,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(posts_url: &'a Url) -> Parser<'a> {
        Parser { posts_url }
    }

    /// Parses a single [`Post`] from the file at `relative_path` (relative to
    /// `posts_source_directory`) and annotates any error with the path. The
    /// `id` is the path of the post relative to the `posts_source_directory`
    /// less the extension (e.g., the ID for a post whose source file is
    /// `{posts_source_directory}/foo/bar.md` is `foo/bar`). A bundle's ID is
    /// its directory.
    fn parse_post(
        &self,
        posts_source_directory: &Path,
        relative_path: &Path,
    ) -> Result<Post> {
        match self._parse_post(posts_source_directory, relative_path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", relative_path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(
        &self,
        posts_source_directory: &Path,
        relative_path: &Path,
    ) -> Result<Post> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(posts_source_directory.join(relative_path))?
            .read_to_string(&mut contents)?;

        let id = post_id(relative_path)?;
        let url = self.posts_url.join(&format!("{}.html", id))?;
        parse_frontmatter(&id, url, &contents)
    }

    /// Searches a provided `source_directory` (recursively) for post files
    /// (extension = `.md`) and returns a list of [`Post`] objects sorted by
    /// date (most recent first, undated posts last). Directories containing
    /// an `index.md` are bundles: the `index.md` is the post and nothing else
    /// in the directory is parsed. Hidden files and directories are skipped.
    /// Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with field `Title` and optionally `Date`, `Tags`,
    ///    `Author`, `Draft`, and `Description` (lowercase keys work too)
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Hello, world!
    /// Date: 2021-04-16
    /// Tags: [greet]
    /// Author: craig
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut entries = WalkDir::new(source_directory)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(result) = entries.next() {
            let entry = result?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            // strip_prefix() should never fail since the walk is rooted at
            // `source_directory`
            let relative_path = entry.path().strip_prefix(source_directory).unwrap();

            if entry.file_type().is_dir() {
                if hidden {
                    entries.skip_current_dir();
                } else if entry.path().join(BUNDLE_INDEX).is_file() {
                    posts.push(self.parse_post(
                        source_directory,
                        &relative_path.join(BUNDLE_INDEX),
                    )?);
                    entries.skip_current_dir();
                }
            } else if !hidden
                && entry.file_type().is_file()
                // a top-level index.md is the listing page, not a post
                && !(entry.depth() == 1 && entry.file_name() == BUNDLE_INDEX)
                && entry.path().extension().map_or(false, |e| e == MARKDOWN_EXTENSION)
            {
                posts.push(self.parse_post(source_directory, relative_path)?);
            }
        }

        posts.sort_by(newest_first);
        debug!(
            directory = %source_directory.display(),
            posts = posts.len(),
            drafts = posts.iter().filter(|p| p.draft).count(),
            "parsed posts"
        );
        Ok(posts)
    }
}

/// Derives a post ID from its path relative to the source directory: the path
/// less its extension, with `/` separators. Bundles (`{dir}/index.md`) take
/// the directory's path.
fn post_id(relative_path: &Path) -> Result<String> {
    let without_extension = if relative_path.ends_with(BUNDLE_INDEX) {
        relative_path
            .parent()
            .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?
            .to_owned()
    } else {
        relative_path.with_extension("")
    };

    let components = without_extension
        .iter()
        .map(|c| c.to_str())
        .collect::<Option<Vec<&str>>>()
        .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?;
    match components.is_empty() {
        true => Err(Error::InvalidFileName(relative_path.to_owned())),
        false => Ok(components.join("/")),
    }
}

/// Parses the frontmatter of `input` into a [`Post`] with the given `id` and
/// `url`.
pub fn parse_frontmatter(id: &str, url: Url, input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),          // yaml_start
                FENCE.len() + offset, // yaml_stop
            )),
        }
    }

    let (yaml_start, yaml_stop) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let date = match &frontmatter.date {
        None => None,
        Some(raw) => {
            let date = parse_date(raw);
            if date.is_none() {
                warn!(post = id, date = %raw, "unrecognized date; treating post as undated");
            }
            date
        }
    };

    Ok(Post {
        id: id.to_owned(),
        title: frontmatter.title,
        url,
        author: frontmatter.author.filter(|a| !a.trim().is_empty()),
        date,
        tags: frontmatter
            .tags
            .into_vec()
            .iter()
            .map(|t| slug::slugify(t))
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<String>>(),
        draft: frontmatter.draft,
        description: frontmatter.description,
    })
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (keeping only its date).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title", alias = "title")]
    pub title: String,

    /// The date of the post.
    #[serde(default, rename = "Date", alias = "date")]
    pub date: Option<String>,

    /// The tags associated with the post.
    #[serde(default, rename = "Tags", alias = "tags")]
    pub tags: OneOrMany,

    /// The author's key.
    #[serde(default, rename = "Author", alias = "author")]
    pub author: Option<String>,

    /// Whether the post is a draft.
    #[serde(default, rename = "Draft", alias = "draft")]
    pub draft: bool,

    /// A short description of the post.
    #[serde(default, rename = "Description", alias = "description")]
    pub description: Option<String>,
}

/// Tags may be written as a single string (`tags: music`) or a list.
#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(tag) => vec![tag],
            OneOrMany::Many(tags) => tags,
        }
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("Post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("Missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when there is a problem parsing URLs.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_testdata() -> Result<Vec<Post>> {
        let posts_url = Url::parse("https://example.com/posts/")?;
        Parser::new(&posts_url).parse_posts(Path::new("./testdata/posts/"))
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let posts = parse_testdata()?;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            vec![
                "alice/vinyl-haul",
                "bob/record-fair",
                "alice/reading-list",
                "bob/garden",
                "simple",
                "undated",
            ],
            ids
        );
        Ok(())
    }

    #[test]
    fn test_parse_post_fields() -> Result<()> {
        let posts = parse_testdata()?;
        let haul = posts
            .iter()
            .find(|p| p.id == "alice/vinyl-haul")
            .expect("vinyl-haul should be parsed");

        assert_eq!("Vinyl haul", haul.title);
        assert_eq!(Some("alice"), haul.author.as_deref());
        assert_eq!(NaiveDate::from_ymd_opt(2024, 6, 30), haul.date);
        assert_eq!(
            vec!["music", "posts", "vinyl"],
            haul.tags.iter().map(String::as_str).collect::<Vec<_>>()
        );
        assert_eq!(
            "https://example.com/posts/alice/vinyl-haul.html",
            haul.url.as_str()
        );
        assert_eq!(Some("Crate digging."), haul.description.as_deref());
        assert!(!haul.draft);
        Ok(())
    }

    #[test]
    fn test_parse_bundle_and_drafts() -> Result<()> {
        let posts = parse_testdata()?;

        // `bob/garden/notes.md` lives in a bundle and is not a post
        assert!(posts.iter().all(|p| !p.id.contains("notes")));
        let garden = posts.iter().find(|p| p.id == "bob/garden").unwrap();
        assert_eq!(
            "https://example.com/posts/bob/garden.html",
            garden.url.as_str()
        );

        let reading = posts.iter().find(|p| p.id == "alice/reading-list").unwrap();
        assert!(reading.draft);
        // a single string and mixed-case tags are accepted
        let fair = posts.iter().find(|p| p.id == "bob/record-fair").unwrap();
        assert!(fair.tags.contains("record-stores"));
        Ok(())
    }

    #[test]
    fn test_capitalized_frontmatter_and_bad_dates() -> Result<()> {
        let posts = parse_testdata()?;
        let simple = posts.iter().find(|p| p.id == "simple").unwrap();
        assert_eq!("Simple", simple.title);
        assert_eq!(NaiveDate::from_ymd_opt(2000, 1, 1), simple.date);
        assert_eq!(None, simple.author);

        let undated = posts.iter().find(|p| p.id == "undated").unwrap();
        assert_eq!(None, undated.date);
        Ok(())
    }

    fn url() -> Url {
        Url::parse("https://example.com/posts/x.html").unwrap()
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            parse_frontmatter("x", url(), "Title: nope\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            parse_frontmatter("x", url(), "---\nTitle: nope\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_parse_rfc3339_date() -> Result<()> {
        let post = parse_frontmatter(
            "x",
            url(),
            "---\ntitle: Timed\ndate: 2024-02-03T22:15:00+01:00\n---\nbody",
        )?;
        assert_eq!(NaiveDate::from_ymd_opt(2024, 2, 3), post.date);
        Ok(())
    }

    #[test]
    fn test_errors_are_annotated() {
        let posts_url = Url::parse("https://example.com/posts/").unwrap();
        let err = Parser::new(&posts_url)
            .parse_posts(Path::new("./testdata/bad/"))
            .unwrap_err();
        assert_eq!(
            "parsing post `no-fence.md`: Post must begin with `---`",
            err.to_string()
        );
    }
}
