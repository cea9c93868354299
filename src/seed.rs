use std::fs;
use std::path::PathBuf;

use log::{error, info};

use crate::error::Result;
use crate::models::Post;
use crate::repository::PostRepository;

const BUNDLED_POSTS: &str = include_str!("../data/posts.json");

/// Where the initial posts come from.
#[derive(Debug, Clone)]
pub enum SeedSource {
    Bundled,
    File(PathBuf),
}

impl SeedSource {
    fn describe(&self) -> String {
        match self {
            SeedSource::Bundled => "bundled data/posts.json".to_string(),
            SeedSource::File(path) => path.display().to_string(),
        }
    }

    fn load(&self) -> Result<Vec<Post>> {
        let posts: Vec<Post> = match self {
            SeedSource::Bundled => serde_json::from_str(BUNDLED_POSTS)?,
            SeedSource::File(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        };
        Ok(posts)
    }
}

/// Fills an empty store from `source`. Returns how many posts were inserted,
/// zero when the store already had rows.
pub fn seed_posts(repo: &dyn PostRepository, source: &SeedSource) -> Result<usize> {
    if repo.count()? != 0 {
        info!("Posts already present, skipping seed");
        return Ok(0);
    }

    info!("Loading posts into the database from JSON: {}", source.describe());
    let posts = source.load().map_err(|e| {
        error!("Failed to load posts: {}", e);
        e
    })?;
    let saved = repo.save_all(&posts)?;
    info!("Loaded {} posts", saved.len());
    Ok(saved.len())
}
