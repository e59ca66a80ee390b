use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::{ScanHit, CURRENCY};

/// One report entry: raw figures plus the formatted columns people read.
#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    #[serde(rename = "ROI")]
    pub roi_text: String,
    #[serde(rename = "Expected Value")]
    pub expected_value_text: String,
    #[serde(rename = "Cost")]
    pub cost_text: String,
    #[serde(rename = "Input Skins")]
    pub inputs: String,
    #[serde(rename = "Output Breakdown")]
    pub breakdown: String,
    #[serde(flatten)]
    pub hit: &'a ScanHit,
}

impl<'a> ReportEntry<'a> {
    pub fn new(hit: &'a ScanHit) -> Self {
        ReportEntry {
            roi_text: format!("{:.2}%", hit.roi * 100.0),
            expected_value_text: format!("{CURRENCY}{:.2}", hit.expected_value),
            cost_text: format!("{CURRENCY}{:.2}", hit.cost),
            inputs: hit.inputs_description(),
            breakdown: hit.breakdown_text(),
            hit,
        }
    }
}

/// Write hits as a JSON array, best ROI first whatever order they arrive in.
pub fn write_report(path: &Path, hits: &[ScanHit]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_entries(&mut out, hits)?;
    out.flush()?;
    Ok(())
}

pub fn write_entries<W: Write>(out: &mut W, hits: &[ScanHit]) -> Result<()> {
    let mut ranked: Vec<&ScanHit> = hits.iter().collect();
    ranked.sort_by(|a, b| b.roi.total_cmp(&a.roi));

    let entries: Vec<ReportEntry> = ranked.into_iter().map(ReportEntry::new).collect();
    serde_json::to_writer_pretty(&mut *out, &entries)?;
    writeln!(out)?;
    Ok(())
}
