use statrs::statistics::Statistics;
use crate::model::{Rarity, ScanHit};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    pub hits: usize,
    pub mean_roi: f64,
    pub std_dev_roi: f64,
    pub q10: f64,
    pub q50: f64,
    pub q90: f64,
    pub best_roi: f64,
    pub by_rarity: Vec<(Rarity, usize)>,
}

pub fn summarize(hits: &[ScanHit]) -> ScanSummary {
    if hits.is_empty() {
        return ScanSummary::default();
    }

    let mut rois: Vec<f64> = hits.iter().map(|h| h.roi).collect();
    rois.sort_by(|a, b| a.total_cmp(b));

    // statrs gives NaN for a single sample
    let std_dev_roi = if rois.len() > 1 { rois.iter().std_dev() } else { 0.0 };

    let by_rarity = Rarity::ALL
        .into_iter()
        .map(|r| (r, hits.iter().filter(|h| h.input.rarity == r).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    ScanSummary {
        hits: hits.len(),
        mean_roi: rois.iter().mean(),
        std_dev_roi,
        q10: quantile(&rois, 0.10),
        q50: quantile(&rois, 0.50),
        q90: quantile(&rois, 0.90),
        best_roi: rois[rois.len() - 1],
        by_rarity,
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}
