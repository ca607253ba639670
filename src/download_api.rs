use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::header::CONTENT_DISPOSITION;

use crate::http_client::{ApiResult, HttpClient};

pub const DEFAULT_EXPORT_NAME: &str = "roster.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DownloadApi {
    http: HttpClient,
}

impl DownloadApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn fetch_export(&self, roster_id: &str) -> ApiResult<RosterExport> {
        let resp = self.http.get_bytes(&format!("/api/download/{roster_id}"))?;
        let filename = export_filename(resp.header(CONTENT_DISPOSITION.as_str()));
        Ok(RosterExport {
            filename,
            bytes: resp.body,
        })
    }
}

/// Writes the export under `dir`, replacing any file of the same name.
pub fn save_export(dir: &Path, export: &RosterExport) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(&export.filename);
    let tmp = path.with_extension("part");
    let written = fs::write(&tmp, &export.bytes)
        .context("write roster export")
        .and_then(|()| fs::rename(&tmp, &path).context("swap roster export"));
    if let Err(err) = written {
        // Never leave a half-written export next to the real ones.
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(path)
}

/// File name from `Content-Disposition: ...; filename="..."`, reduced to its
/// last path component. Anything missing or unusable gives `roster.json`.
pub fn export_filename(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(quoted_filename)
        .map(|name| {
            name.rsplit(['/', '\\'])
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string())
}

fn quoted_filename(header: &str) -> Option<&str> {
    let start = header.find("filename=\"")? + "filename=\"".len();
    let rest = &header[start..];
    let end = rest.rfind('"')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_swap_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("roster.json");
        fs::create_dir(&blocker).expect("blocker dir");
        fs::write(blocker.join("keep"), b"x").expect("blocker file");

        let export = RosterExport {
            filename: "roster.json".to_string(),
            bytes: b"{}".to_vec(),
        };
        assert!(save_export(dir.path(), &export).is_err());
        assert!(!dir.path().join("roster.part").exists());
        assert!(blocker.is_dir());
    }

    #[test]
    fn filename_from_content_disposition() {
        assert_eq!(
            export_filename(Some(r#"attachment; filename="Week 3 Roster.json""#)),
            "Week 3 Roster.json"
        );
    }

    #[test]
    fn filename_defaults_when_absent_or_unparseable() {
        assert_eq!(export_filename(None), DEFAULT_EXPORT_NAME);
        assert_eq!(export_filename(Some("attachment")), DEFAULT_EXPORT_NAME);
        assert_eq!(export_filename(Some(r#"attachment; filename="""#)), DEFAULT_EXPORT_NAME);
    }

    #[test]
    fn filename_strips_directories() {
        assert_eq!(
            export_filename(Some(r#"attachment; filename="../../etc/roster.json""#)),
            "roster.json"
        );
    }
}
