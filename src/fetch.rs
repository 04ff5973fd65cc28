use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use tracing::{info, warn};
use ureq::{Agent, AgentBuilder};

use crate::utils::download_bar;

const USER_AGENT: &str = "courses-dataset-builder";
const ATTEMPTS: u32 = 4;
const FIRST_BACKOFF: Duration = Duration::from_secs(2);

/// Downloads `url` to `dest` unless it is already there. Failed attempts
/// are retried with exponential backoff and never leave a partial file.
pub fn download(url: &str, dest: &Path, force: bool) -> Result<()> {
    if dest.exists() && !force {
        info!("using cached {}", dest.display());
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let agent = AgentBuilder::new()
        .user_agent(USER_AGENT)
        .timeout_connect(Duration::from_secs(30))
        .timeout_read(Duration::from_secs(600))
        .build();

    info!("downloading {url}");
    let mut backoff = FIRST_BACKOFF;
    let mut attempt = 1;
    loop {
        match fetch(&agent, url, dest) {
            Ok(bytes) => {
                info!("downloaded {} ({}MB)", dest.display(), bytes / 1024 / 1024);
                return Ok(());
            }
            Err(e) if attempt < ATTEMPTS => {
                warn!("attempt {attempt}/{ATTEMPTS} for {url} failed: {e:#}");
                thread::sleep(backoff);
                backoff *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e.context(format!("failed to download {url}"))),
        }
    }
}

fn fetch(agent: &Agent, url: &str, dest: &Path) -> Result<u64> {
    let mut partial = dest.as_os_str().to_owned();
    partial.push(".part");
    let partial = Path::new(&partial);

    let result = stream(agent, url, partial).and_then(|bytes| {
        fs::rename(partial, dest)?;
        Ok(bytes)
    });
    if result.is_err() {
        fs::remove_file(partial).ok();
    }
    result
}

fn stream(agent: &Agent, url: &str, path: &Path) -> Result<u64> {
    let response = agent.get(url).call()?;
    let len = response
        .header("Content-Length")
        .and_then(|x| x.parse().ok());

    let pb = download_bar(len);
    let mut reader = pb.wrap_read(response.into_reader());
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    );
    let bytes = io::copy(&mut reader, &mut file)?;
    file.flush()?;
    pb.finish_and_clear();
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gb-latest.osm.pbf");
        fs::write(&dest, b"cached").unwrap();

        // an unroutable url: any network access would fail
        download("http://127.0.0.1:9/gb-latest.osm.pbf", &dest, false).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"cached");
    }

    #[test]
    fn failed_fetch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.osm.pbf");
        let agent = AgentBuilder::new()
            .timeout_connect(Duration::from_millis(200))
            .build();

        assert!(fetch(&agent, "http://127.0.0.1:9/x.osm.pbf", &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
