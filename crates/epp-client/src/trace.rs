//! On-disk mirror of exchanged documents.
//!
//! Layout under the trace directory:
//!
//! ```text
//! epp/<name>-<timestamp>-<seq>-send.xml      request as sent
//! epp/<name>-<timestamp>-<seq>-received.xml  reply to the request with the same seq
//! epp/<name>-dry-run.txt                     documents rendered in dry-run mode
//! queue/<name>-<timestamp>-<seq>.json        archived poll messages
//! ```
//!
//! `<name>` is the client name, so clients sharing a trace directory do not
//! overwrite each other. The sequence number is per mirror, so two documents
//! written within the same clock tick still get distinct files.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

const DRY_RUN_SEPARATOR: &str =
    "\n---------------------------------------------------------------------------------------------\n";

/// Writes trace files for one client.
#[derive(Debug)]
pub struct TraceMirror {
    root: PathBuf,
    name: String,
    seq: u64,
}

impl TraceMirror {
    /// Creates a mirror writing below `root`; `name` prefixes every file.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            seq: 0,
        }
    }

    /// Directory holding request and response documents.
    pub fn epp_dir(&self) -> PathBuf {
        self.root.join("epp")
    }

    /// Directory holding archived queue messages.
    pub fn queue_dir(&self) -> PathBuf {
        self.root.join("queue")
    }

    fn stamp(&self) -> String {
        format!(
            "{}-{}-{:06}",
            self.name,
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            self.seq
        )
    }

    /// Writes a request document and starts a new sequence number.
    pub fn sent(&mut self, xml: &str) -> io::Result<PathBuf> {
        self.seq += 1;
        let path = self.epp_dir().join(format!("{}-send.xml", self.stamp()));
        write_file(&path, xml.as_bytes())?;
        Ok(path)
    }

    /// Writes the reply to the last request.
    pub fn received(&mut self, xml: &str) -> io::Result<PathBuf> {
        let path = self.epp_dir().join(format!("{}-received.xml", self.stamp()));
        write_file(&path, xml.as_bytes())?;
        Ok(path)
    }

    /// Appends a document rendered in dry-run mode.
    pub fn dry_run(&mut self, xml: &str) -> io::Result<PathBuf> {
        let dir = self.epp_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}-dry-run.txt", self.name));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(xml.as_bytes())?;
        file.write_all(DRY_RUN_SEPARATOR.as_bytes())?;
        Ok(path)
    }

    /// Archives a poll message as JSON.
    pub fn archive<T: Serialize>(&mut self, value: &T) -> io::Result<PathBuf> {
        self.seq += 1;
        let json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        let path = self.queue_dir().join(format!("{}.json", self.stamp()));
        write_file(&path, &json)?;
        Ok(path)
    }
}

fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_reply_share_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = TraceMirror::new(dir.path(), "epp1");

        let sent = mirror.sent("<epp>req</epp>").unwrap();
        let received = mirror.received("<epp>resp</epp>").unwrap();

        let sent_name = sent.file_name().unwrap().to_string_lossy().to_string();
        let received_name = received.file_name().unwrap().to_string_lossy().to_string();
        assert!(sent_name.starts_with("epp1-"), "{sent_name}");
        assert!(sent_name.ends_with("-000001-send.xml"), "{sent_name}");
        assert!(received_name.ends_with("-000001-received.xml"), "{received_name}");
        assert_eq!(fs::read_to_string(&sent).unwrap(), "<epp>req</epp>");
        assert_eq!(fs::read_to_string(&received).unwrap(), "<epp>resp</epp>");
    }

    #[test]
    fn rapid_writes_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = TraceMirror::new(dir.path(), "epp1");
        let paths: Vec<_> = (0..20).map(|_| mirror.sent("<epp/>").unwrap()).collect();
        let files = fs::read_dir(mirror.epp_dir()).unwrap().count();
        assert_eq!(files, paths.len());
    }

    #[test]
    fn clients_sharing_a_directory_keep_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = TraceMirror::new(dir.path(), "epp1");
        let mut second = TraceMirror::new(dir.path(), "epp2");

        let a = first.sent("<epp>one</epp>").unwrap();
        let b = second.sent("<epp>two</epp>").unwrap();
        let qa = first.archive(&serde_json::json!({ "id": "1" })).unwrap();
        let qb = second.archive(&serde_json::json!({ "id": "2" })).unwrap();

        assert_ne!(a, b);
        assert_ne!(qa, qb);
        assert!(qb.file_name().unwrap().to_string_lossy().starts_with("epp2-"));
        assert_eq!(fs::read_dir(first.epp_dir()).unwrap().count(), 2);
        assert_eq!(fs::read_to_string(&a).unwrap(), "<epp>one</epp>");
        assert_eq!(fs::read_to_string(&b).unwrap(), "<epp>two</epp>");
    }

    #[test]
    fn dry_run_documents_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = TraceMirror::new(dir.path(), "epp1");
        mirror.dry_run("<first/>").unwrap();
        let path = mirror.dry_run("<second/>").unwrap();

        assert!(path.ends_with("epp/epp1-dry-run.txt"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("<first/>"));
        assert!(content.contains("<second/>"));
        assert_eq!(content.matches("-----\n").count(), 2);
    }

    #[test]
    fn archive_writes_json_in_queue_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = TraceMirror::new(dir.path(), "epp1");
        let path = mirror
            .archive(&serde_json::json!({ "id": "12345", "count": 1 }))
            .unwrap();
        assert!(path.starts_with(mirror.queue_dir()));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["id"], "12345");
    }
}
