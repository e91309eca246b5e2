//! Statistics the map layer colors and annotates regions with.

use crate::region::Region;

/// Quantile levels used for choropleth bin edges.
pub const BIN_QUANTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Common English words left out of keyword summaries.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had",
    "has", "have", "he", "her", "here", "him", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "just", "me", "more", "most", "my", "no", "nor", "not", "of", "off", "on", "only",
    "or", "other", "our", "out", "over", "own", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "with", "would", "you", "your",
];

/// Linearly interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Choropleth bin edges: quantiles of the regions' mean scores at
/// [`BIN_QUANTILES`].
///
/// Non-finite scores are ignored; returns an empty vector when nothing is left.
pub fn score_bins(regions: &[Region]) -> Vec<f64> {
    let mut scores: Vec<f64> = regions
        .iter()
        .map(|r| r.mean_score)
        .filter(|s| s.is_finite())
        .collect();
    if scores.is_empty() {
        return Vec::new();
    }
    scores.sort_by(|a, b| a.total_cmp(b));
    BIN_QUANTILES.iter().map(|&q| quantile(&scores, q)).collect()
}

/// The `k` most frequent non-stopword keywords of a region.
pub fn keyword_summary(region: &Region, k: usize) -> Vec<(String, usize)> {
    region
        .keywords
        .without_stopwords(STOPWORDS)
        .top(k)
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::KeywordBag;
    use geo::MultiPolygon;
    use pretty_assertions::assert_eq;

    fn region(cluster_id: i64, mean_score: f64, keywords: &[&str]) -> Region {
        Region {
            cluster_id,
            size: 2,
            geometry: MultiPolygon::new(vec![]),
            mean_score,
            keywords: keywords.iter().copied().collect::<KeywordBag>(),
        }
    }

    #[test]
    fn bins_interpolate_linearly() {
        let regions: Vec<Region> = [4.0, 1.0, 3.0, 2.0, 5.0]
            .iter()
            .enumerate()
            .map(|(i, &s)| region(i as i64, s, &[]))
            .collect();
        assert_eq!(score_bins(&regions), vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let two = vec![region(0, 0.0, &[]), region(1, 1.0, &[])];
        assert_eq!(score_bins(&two), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn bins_of_nothing() {
        assert!(score_bins(&[]).is_empty());
        assert!(score_bins(&[region(0, f64::NAN, &[])]).is_empty());
        assert_eq!(score_bins(&[region(0, 0.7, &[])]), vec![0.7; 5]);
    }

    #[test]
    fn summary_skips_stopwords() {
        let r = region(0, 1.0, &["the", "museum", "The", "art", "museum", "and", "park"]);
        assert_eq!(
            keyword_summary(&r, 2),
            vec![("museum".to_string(), 2), ("art".to_string(), 1)]
        );
    }
}
