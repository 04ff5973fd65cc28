//! Region builds: download, extract, deduplicate, write.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use _model::{CandidateRecord, Region};
use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    cache,
    config::Config,
    fetch::download,
    output::{ensure_custom, read_records, write_records, write_us_index},
    pipeline::Extractor,
    sources::{overpass, pbf},
    utils::progress_bar,
};

pub const ATTRIBUTION: &str = "Data © OpenStreetMap contributors (ODbL)";

impl Config {
    fn extract_path(&self, region: &Region) -> PathBuf {
        self.cache_dir.join(region.extract_file())
    }

    fn cache_path(&self, region: &Region) -> PathBuf {
        let mut name = region.extract_file();
        name.push_str(".courses.zst");
        self.cache_dir.join(name)
    }
}

/// Builds every region; a region that fails is logged and skipped.
/// Returns the regions that were written.
pub fn build(config: &Config, regions: &[Region], force: bool) -> Result<Vec<Region>> {
    info!("{ATTRIBUTION}");

    let mut ready = Vec::new();
    for region in regions {
        match download(&region.url(), &config.extract_path(region), force) {
            Ok(()) => ready.push(*region),
            Err(e) => warn!("skipping {region}: {e:#}"),
        }
    }

    let pb = progress_bar(ready.len() as u64);
    let results: Vec<_> = ready
        .par_iter()
        .map(|region| {
            let result = build_region(config, region, force);
            pb.inc(1);
            (*region, result)
        })
        .collect();
    pb.finish_and_clear();

    let mut built = Vec::new();
    for (region, result) in results {
        match result {
            Ok(0) => info!("{region}: no courses, nothing written"),
            Ok(count) => {
                info!("{region}: {count} courses");
                built.push(region);
            }
            Err(e) => warn!("{region} failed: {e:#}"),
        }
    }

    if built.iter().any(|x| matches!(x, Region::UsState(_))) {
        write_us_index(&config.output_dir)?;
    }
    ensure_custom(&config.output_dir)?;
    Ok(built)
}

/// Builds one region from its downloaded extract and returns the number of
/// courses written.
pub fn build_region(config: &Config, region: &Region, force: bool) -> Result<usize> {
    let source = config.extract_path(region);
    let cache_path = config.cache_path(region);
    let meta = region.meta();

    let cached = if force {
        None
    } else {
        cache::load(&cache_path, &source, &config.classifier, meta).unwrap_or_else(|e| {
            warn!("ignoring cache for {region}: {e:#}");
            None
        })
    };
    let (records, tally) = match cached {
        Some(x) => {
            info!("{region}: using cached candidates");
            x
        }
        None => {
            let features = pbf::read(&source)?;
            let extractor = Extractor {
                classifier: &config.classifier,
                region_meta: meta,
            };
            let (records, tally) = extractor.extract(features);
            if let Err(e) = cache::save(&cache_path, &config.classifier, meta, &records, &tally) {
                warn!("failed to cache {region}: {e:#}");
            }
            (records, tally)
        }
    };
    info!("{region}: {tally}");

    let courses = config.dedup.run(records);
    if !courses.is_empty() {
        write_records(&config.output_dir.join(region.output_file()), &courses)?;
    }
    Ok(courses.len())
}

/// Builds one dataset from an Overpass JSON response.
pub fn build_overpass(config: &Config, input: &Path, output: &Path, meta: &str) -> Result<usize> {
    let json =
        read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let (features, malformed) = overpass::parse(&json)?;
    let extractor = Extractor {
        classifier: &config.classifier,
        region_meta: meta,
    };
    let (records, mut tally) = extractor.extract(features);
    tally.unresolved += malformed;
    info!("{}: {tally}", input.display());

    let courses = config.dedup.run(records);
    write_records(output, &courses)?;
    Ok(courses.len())
}

/// Deduplicates an existing output file again. Rows that are no longer
/// valid records are dropped and counted. Returns `(kept, dropped)`.
pub fn dedup_file(config: &Config, input: &Path, output: &Path) -> Result<(usize, usize)> {
    let rows = read_records(input)?;
    let before = rows.len();
    let records: Vec<_> = rows
        .iter()
        .filter_map(CandidateRecord::from_canonical)
        .collect();
    let dropped = before - records.len();
    if dropped > 0 {
        warn!("{}: dropped {dropped} invalid rows", input.display());
    }

    let courses = config.dedup.run(records);
    info!("{before} -> {} courses", courses.len());
    write_records(output, &courses)?;
    Ok((courses.len(), dropped))
}
