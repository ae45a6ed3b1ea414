//! JSON-based scan history.
//!
//! Each report is one pretty-printed `<id>.json` file. Files that cannot be
//! parsed are skipped when listing so one bad file never hides the rest.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::scanner::ScanReport;
use crate::types::ScanId;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Directory of saved scan reports.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store in the XDG data directory.
    pub fn new() -> StorageResult<Self> {
        Self::at(Paths::get()?.scans_dir())
    }

    /// Open a store rooted at `dir`, creating it if needed.
    pub fn at(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = dir.into();
        fs::create_dir_all(&scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { scans_dir })
    }

    pub fn save(&self, report: &ScanReport) -> StorageResult<()> {
        let file = self.scan_file(&report.id);
        let content = serde_json::to_string_pretty(report)?;
        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        debug!(id = %report.id, path = %file.display(), "saved scan");
        Ok(())
    }

    pub fn load(&self, id: &ScanId) -> StorageResult<ScanReport> {
        let file = self.scan_file(id);
        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a scan by full ID or a unique ID prefix.
    pub fn find(&self, id_or_prefix: &str) -> StorageResult<ScanReport> {
        if let Ok(id) = id_or_prefix.parse::<ScanId>() {
            return self.load(&id);
        }

        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(StorageError::ScanNotFound(id_or_prefix.to_string()));
        }

        let matches: Vec<ScanId> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(id_or_prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::AmbiguousPrefix {
                prefix,
                matches: matches.len(),
            }),
        }
    }

    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let entries = fs::read_dir(&self.scans_dir)
            .map_err(|e| StorageError::DirectoryError(e.to_string()))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::DirectoryError(e.to_string()))?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<ScanId>().ok())
                {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// All readable reports, most recent first.
    pub fn list(&self) -> StorageResult<Vec<ScanReport>> {
        let mut reports: Vec<ScanReport> = self
            .list_ids()?
            .iter()
            .filter_map(|id| match self.load(id) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(%id, error = %e, "skipping unreadable scan");
                    None
                }
            })
            .collect();

        reports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(reports)
    }

    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanReport>> {
        let mut reports = self.list()?;
        reports.truncate(count);
        Ok(reports)
    }

    pub fn delete(&self, id: &ScanId) -> StorageResult<()> {
        let file = self.scan_file(id);
        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }
        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete every stored scan. Returns how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let ids = self.list_ids()?;
        for id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    /// Delete scans started before `now - max_age`. Returns how many were removed.
    pub fn prune(&self, max_age: chrono::Duration) -> StorageResult<usize> {
        // An age reaching past chrono's earliest date can match nothing.
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return Ok(0);
        };
        let mut deleted = 0;
        for report in self.list()? {
            if report.started_at < cutoff {
                self.delete(&report.id)?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    fn scan_file(&self, id: &ScanId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ProbeResult, ProbeStatus, ScanConfig};
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn report(host: &str) -> ScanReport {
        let port = Port::new(80).unwrap();
        let target = ScanTarget::new(host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        ScanReport::begin(target, ScanConfig::new([port])).finalize(vec![ProbeResult::new(
            port,
            ProbeStatus::Open,
            Duration::from_millis(2),
        )])
    }

    fn store() -> (tempfile::TempDir, ScanStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path().join("scans")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = store();
        let saved = report("localhost");
        store.save(&saved).unwrap();

        let loaded = store.load(&saved.id).unwrap();
        assert_eq!(loaded.target, saved.target);
        assert_eq!(loaded.results, saved.results);
    }

    #[test]
    fn test_find_by_full_id_and_prefix() {
        let (_dir, store) = store();
        let saved = report("localhost");
        store.save(&saved).unwrap();

        assert_eq!(store.find(&saved.id.to_string()).unwrap().id, saved.id);
        assert_eq!(store.find(&saved.id.short()).unwrap().id, saved.id);
        assert!(matches!(
            store.find("zzzz"),
            Err(StorageError::ScanNotFound(_))
        ));
    }

    #[test]
    fn test_find_ambiguous_prefix() {
        let (_dir, store) = store();
        for id in [
            "aaaaaaaa-0000-4000-8000-000000000001",
            "aaaaaaaa-0000-4000-8000-000000000002",
        ] {
            let mut saved = report("localhost");
            saved.id = id.parse().unwrap();
            store.save(&saved).unwrap();
        }

        assert!(matches!(
            store.find("aaaa"),
            Err(StorageError::AmbiguousPrefix { matches: 2, .. })
        ));
        assert!(store.find("aaaaaaaa-0000-4000-8000-000000000002").is_ok());
    }

    #[test]
    fn test_list_most_recent_first() {
        let (_dir, store) = store();
        let mut older = report("older");
        older.started_at -= chrono::Duration::hours(1);
        let newer = report("newer");
        store.save(&older).unwrap();
        store.save(&newer).unwrap();

        let hosts: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.target.host)
            .collect();
        assert_eq!(hosts, vec!["newer", "older"]);
        assert_eq!(store.list_recent(1).unwrap().len(), 1);
    }

    #[test]
    fn test_list_skips_unreadable_files() {
        let (dir, store) = store();
        let scans = dir.path().join("scans");
        store.save(&report("good")).unwrap();
        fs::write(scans.join(format!("{}.json", ScanId::new())), "{ truncated").unwrap();
        fs::write(scans.join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list_ids().unwrap().len(), 2);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let (_dir, store) = store();
        let first = report("first");
        store.save(&first).unwrap();
        store.save(&report("second")).unwrap();

        store.delete(&first.id).unwrap();
        assert!(matches!(
            store.load(&first.id),
            Err(StorageError::ScanNotFound(_))
        ));
        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_prune_old_scans() {
        let (_dir, store) = store();
        let mut stale = report("stale");
        stale.started_at -= chrono::Duration::days(30);
        store.save(&stale).unwrap();
        store.save(&report("fresh")).unwrap();

        assert_eq!(store.prune(chrono::Duration::days(7)).unwrap(), 1);
        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].target.host, "fresh");
    }

    #[test]
    fn test_prune_with_huge_age_removes_nothing() {
        let (_dir, store) = store();
        let mut ancient = report("ancient");
        ancient.started_at -= chrono::Duration::days(365 * 50);
        store.save(&ancient).unwrap();

        assert_eq!(store.prune(chrono::Duration::days(i64::from(u32::MAX))).unwrap(), 0);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
