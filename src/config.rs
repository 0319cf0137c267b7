// src/config.rs
use crate::api::ListingContext;
use crate::constants::{MAX_ITEMS_CEILING, MAX_ITEMS_ENV_VAR, UNBOUNDED_MAX_ITEMS};
use crate::error::AppError;
use clap::Parser;
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// JSON fixture holding type definitions, objects and folder listings
    pub fixture: PathBuf,

    /// Folder path whose children are listed
    #[arg(short, long, default_value = "/")]
    pub folder: String,

    /// Retrieve the single object at this path instead of a listing
    #[arg(long, conflicts_with = "all")]
    pub object: Option<String>,

    /// Retrieve every child, following listing windows until exhausted
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Number of items to skip
    #[arg(long, default_value_t = 0)]
    pub skip: u32,

    /// Window size (0 = let the server decide)
    #[arg(short, long)]
    pub max: Option<u32>,

    /// Property id to sort by (e.g. "cmis:name")
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, default_value_t = false)]
    pub descending: bool,

    /// Only list children whose name contains this text
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Disable the type-definition cache (every conversion re-fetches types)
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// Pretty-print the JSON output
    #[arg(short, long, default_value_t = false)]
    pub pretty: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Settings for one repository session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// When false, resolved type definitions are never cached. Concurrent
    /// resolves are still coalesced.
    pub cache_enabled: bool,
    /// Window size used when a caller passes an unbounded listing.
    pub default_max_items: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            default_max_items: UNBOUNDED_MAX_ITEMS,
        }
    }
}

impl ClientConfig {
    /// Resolves the session settings from CLI input and the environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, std::env::var(MAX_ITEMS_ENV_VAR).ok())
    }

    /// Like [`resolve`](Self::resolve) with the environment value passed in.
    pub fn resolve_with(cli: &CommandLineInput, env_max_items: Option<String>) -> Result<Self, AppError> {
        let default_max_items = match env_max_items {
            Some(raw) => parse_max_items(raw.trim(), MAX_ITEMS_ENV_VAR)?,
            None => UNBOUNDED_MAX_ITEMS,
        };

        Ok(Self {
            cache_enabled: !cli.no_cache,
            default_max_items,
        })
    }
}

fn parse_max_items(raw: &str, origin: &str) -> Result<u32, AppError> {
    let value: u32 = raw.parse().map_err(|_| {
        AppError::MissingConfiguration(format!(
            "{} must be a non-negative integer, got {:?}",
            origin, raw
        ))
    })?;
    check_ceiling(value, origin)
}

fn check_ceiling(value: u32, origin: &str) -> Result<u32, AppError> {
    if value > MAX_ITEMS_CEILING {
        return Err(AppError::InvalidListing(format!(
            "{} of {} exceeds the limit of {}",
            origin, value, MAX_ITEMS_CEILING
        )));
    }
    Ok(value)
}

/// What the CLI was asked to retrieve.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Object(String),
    Children { folder: String, listing: ListingContext },
    AllChildren(String),
}

impl CommandLineInput {
    /// Builds the listing window from the flags.
    pub fn listing(&self) -> Result<ListingContext, AppError> {
        let max_items = match self.max {
            Some(max) => check_ceiling(max, "--max")?,
            None => UNBOUNDED_MAX_ITEMS,
        };

        let mut listing = ListingContext::default()
            .with_skip(self.skip)
            .with_max_items(max_items);
        if let Some(sort) = &self.sort {
            listing = listing.with_sort(sort.as_str());
        }
        if self.descending {
            listing = listing.descending();
        }
        if let Some(keyword) = &self.keyword {
            listing = listing.with_keyword(keyword.as_str());
        }
        Ok(listing)
    }

    pub fn target(&self) -> Result<Target, AppError> {
        if let Some(path) = &self.object {
            return Ok(Target::Object(path.clone()));
        }
        if self.all {
            return Ok(Target::AllChildren(self.folder.clone()));
        }
        Ok(Target::Children {
            folder: self.folder.clone(),
            listing: self.listing()?,
        })
    }
}
