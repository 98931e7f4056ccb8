//! File-backed roster mirror
//!
//! Stands in for the shared tabular document: one tab-separated file per
//! tab, a marker file for the "update in progress" notice, and a
//! changelog file with the most recent lines at the top. Writes go
//! through a temp file and rename so readers never observe a half-written
//! tab.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use clan_core::error::DomainError;
use clan_core::traits::{PortResult, RosterMirror, RosterTab};

const MARKER_FILE: &str = "marker.txt";
const CHANGELOG_FILE: &str = "changelog.txt";

/// Local-directory implementation of [`RosterMirror`]
#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

fn io_err(e: std::io::Error) -> DomainError {
    DomainError::Persistence(e.to_string())
}

fn tab_file_name(tab: RosterTab) -> String {
    let slug = tab.title().to_lowercase().replace(' ', "_");
    format!("{slug}.tsv")
}

async fn write_atomic(path: &Path, contents: &str) -> PortResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

impl FileMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn tab_path(&self, tab: RosterTab) -> PathBuf {
        self.dir.join(tab_file_name(tab))
    }
}

#[async_trait]
impl RosterMirror for FileMirror {
    async fn ensure_connected(&self) -> PortResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)
    }

    #[instrument(skip(self, rows), fields(tab = tab.title(), rows = rows.len()))]
    async fn replace_tab(&self, tab: RosterTab, rows: Vec<Vec<String>>) -> PortResult<()> {
        let mut contents = String::new();
        for row in &rows {
            contents.push_str(&row.join("\t"));
            contents.push('\n');
        }
        write_atomic(&self.tab_path(tab), &contents).await?;
        debug!("Tab replaced");
        Ok(())
    }

    async fn publish_marker(&self, text: &str) -> PortResult<()> {
        write_atomic(&self.dir.join(MARKER_FILE), text).await
    }

    async fn clear_marker(&self) -> PortResult<()> {
        match tokio::fs::remove_file(self.dir.join(MARKER_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn insert_changelog(&self, lines: &[String]) -> PortResult<()> {
        let path = self.dir.join(CHANGELOG_FILE);
        let existing = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(io_err(e)),
        };
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        contents.push_str(&existing);
        write_atomic(&path, &contents).await
    }
}
