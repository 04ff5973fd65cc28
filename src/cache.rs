//! Extracted candidates stored beside the extract they came from, so that a
//! rebuild with unchanged inputs skips the PBF parse.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use _model::CandidateRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{classify::Classifier, pipeline::Tally};

#[derive(Serialize, Deserialize)]
struct Extract {
    classifier: Classifier,
    region_meta: String,
    tally: Tally,
    records: Vec<CandidateRecord>,
}

/// `None` when there is no usable cache: missing, older than `source`, or
/// written under different classification settings.
pub fn load(
    path: &Path,
    source: &Path,
    classifier: &Classifier,
    region_meta: &str,
) -> Result<Option<(Vec<CandidateRecord>, Tally)>> {
    if !path.exists() {
        return Ok(None);
    }
    if source.exists() && fs::metadata(source)?.modified()? > fs::metadata(path)?.modified()? {
        debug!("{} is stale", path.display());
        return Ok(None);
    }

    let bytes = zstd::decode_all(File::open(path)?)
        .with_context(|| format!("failed to decompress {}", path.display()))?;
    let extract: Extract = postcard::from_bytes(&bytes)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    if extract.classifier != *classifier || extract.region_meta != region_meta {
        debug!("{} was built with other settings", path.display());
        return Ok(None);
    }
    Ok(Some((extract.records, extract.tally)))
}

pub fn save(
    path: &Path,
    classifier: &Classifier,
    region_meta: &str,
    records: &[CandidateRecord],
    tally: &Tally,
) -> Result<()> {
    let extract = Extract {
        classifier: classifier.clone(),
        region_meta: region_meta.to_string(),
        tally: tally.clone(),
        records: records.to_vec(),
    };
    let mut writer = zstd::Encoder::new(File::create(path)?, 0)?;
    let data = postcard::to_allocvec(&extract)?;
    writer.write_all(data.as_slice())?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use _model::Rank;

    use super::*;

    fn records() -> Vec<CandidateRecord> {
        vec![
            CandidateRecord::new("Royal Birkdale", 53.62, -3.03, Rank::Relation, 1.2e6, "")
                .unwrap(),
            CandidateRecord::new("Hoylake", 53.38, -3.19, Rank::Point, 0.0, "Wirral").unwrap(),
        ]
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gb.courses.zst");
        let source = dir.path().join("gb-latest.osm.pbf");
        let classifier = Classifier::default();
        let tally = Tally {
            accepted: 2,
            rejected: 5,
            ..Tally::default()
        };

        assert!(load(&path, &source, &classifier, "").unwrap().is_none());
        save(&path, &classifier, "", &records(), &tally).unwrap();

        let (loaded, loaded_tally) = load(&path, &source, &classifier, "").unwrap().unwrap();
        assert_eq!(loaded, records());
        assert_eq!(loaded_tally, tally);
    }

    #[test]
    fn other_settings_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gb.courses.zst");
        let source = dir.path().join("gb-latest.osm.pbf");
        save(&path, &Classifier::default(), "", &records(), &Tally::default()).unwrap();

        let loose = Classifier {
            min_weak_area_m2: 1.0,
        };
        assert!(load(&path, &source, &loose, "").unwrap().is_none());
        assert!(load(&path, &source, &Classifier::default(), "NJ")
            .unwrap()
            .is_none());
    }
}
