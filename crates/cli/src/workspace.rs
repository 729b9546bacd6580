// Local workspace: drafts and session cookie kept between invocations

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use miseventos_core::{DraftList, Event, RegistrationTracker, Schedule, Session, Speaker, User};

const DRAFTS_FILE: &str = "drafts.json";
const COOKIE_FILE: &str = "session";

/// Everything the forms would have held in memory
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Drafts {
    #[serde(default)]
    pub events: DraftList<Event>,
    #[serde(default)]
    pub speakers: DraftList<Speaker>,
    #[serde(default)]
    pub sessions: DraftList<Session>,
    #[serde(default)]
    pub schedules: DraftList<Schedule>,
    #[serde(default)]
    pub users: DraftList<User>,
    #[serde(default)]
    pub registrations: RegistrationTracker,
}

pub struct Workspace {
    dir: PathBuf,
    pub drafts: Drafts,
}

impl Workspace {
    /// Open the workspace, starting empty when it does not exist yet
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let path = dir.join(DRAFTS_FILE);
        let drafts = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Drafts::default()
        };
        tracing::debug!(dir = %dir.display(), "Workspace opened");
        Ok(Self { dir, drafts })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(DRAFTS_FILE);
        let content = serde_json::to_string_pretty(&self.drafts)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn cookies(&self) -> Option<String> {
        fs::read_to_string(self.dir.join(COOKIE_FILE))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn save_cookies(&self, header: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(COOKIE_FILE);
        fs::write(&path, header).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn clear_cookies(&self) -> Result<()> {
        let path = self.dir.join(COOKIE_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miseventos_core::Speaker;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("miseventos-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_drafts_survive_reopen() {
        let dir = temp_dir("drafts");
        let mut workspace = Workspace::open(&dir).unwrap();
        let key = workspace.drafts.speakers.add(Speaker::default());
        workspace
            .drafts
            .speakers
            .set_field(key, "full_name", "Ana")
            .unwrap();
        workspace.save().unwrap();

        let reopened = Workspace::open(&dir).unwrap();
        let record = reopened.drafts.speakers.get(key).unwrap();
        assert_eq!(record.value().full_name, "Ana");
        assert!(record.state().is_draft());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cookie_file() {
        let dir = temp_dir("cookies");
        let workspace = Workspace::open(&dir).unwrap();
        assert!(workspace.cookies().is_none());

        workspace.save_cookies("access_token=abc").unwrap();
        assert_eq!(workspace.cookies().as_deref(), Some("access_token=abc"));

        workspace.clear_cookies().unwrap();
        assert!(workspace.cookies().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }
}
