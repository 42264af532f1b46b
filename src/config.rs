//! Loads the project configuration from a `kindred.yaml` file, searching the
//! given directory and then each of its ancestors.

use crate::score::Weights;
use crate::tag::TagFilter;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "kindred.yaml";

#[derive(Deserialize)]
struct Limit(usize);
impl Default for Limit {
    fn default() -> Self {
        Limit(3)
    }
}

#[derive(Deserialize)]
struct Project {
    pub site_root: Url,

    #[serde(default = "default_posts_directory")]
    pub posts_directory: PathBuf,

    #[serde(default)]
    pub exclude_tags: TagFilter,

    #[serde(default)]
    pub weights: Weights,

    #[serde(default)]
    pub default_limit: Limit,
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

/// The resolved project configuration.
#[derive(Debug)]
pub struct Config {
    /// The `kindred.yaml` this configuration was loaded from.
    pub project_file: PathBuf,

    /// The directory containing the markdown post sources.
    pub posts_source_directory: PathBuf,

    /// The base URL for posts (`{site_root}posts/`).
    pub posts_url: Url,

    /// The structural tags to ignore when comparing posts.
    pub tag_filter: TagFilter,

    /// The scoring weights.
    pub weights: Weights,

    /// The number of results to return when the caller doesn't ask for a
    /// specific number.
    pub default_limit: usize,
}

impl Config {
    /// Looks for `kindred.yaml` in `dir` and then in each parent directory,
    /// and loads the first one found. `dir` is made absolute first so that
    /// relative paths like `.` have parents to search.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Resolving project directory `{}`", dir.display()))?;
        Config::search(&dir)
    }

    fn search(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path).context("Loading configuration")
        } else {
            match dir.parent() {
                Some(parent) => Config::search(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the configuration from a specific project file. Relative paths
    /// in the file are resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)
            .with_context(|| format!("Parsing project file `{}`", path.display()))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                project_file: path.to_owned(),
                posts_source_directory: project_root.join(&project.posts_directory),
                posts_url: project.site_root.join("posts/")?,
                tag_filter: project.exclude_tags,
                weights: project.weights,
                default_limit: project.default_limit.0,
            }),
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}
