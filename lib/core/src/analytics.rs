//! Market analytics over the listings dataset
//!
//! Every function here produces plain data series (group means, counts,
//! five-number summaries, histograms, term frequencies). How they are drawn
//! is left to the client.

use crate::{Error, FeatureText, ListingRecord, Result};
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;

/// Room flag columns, in the order they are reported
pub const ROOM_TYPES: [&str; 5] = ["servant room", "study room", "pooja room", "store room", "others"];

/// Upper bound on histogram bins
pub const MAX_BINS: usize = 1000;

/// Words dropped from feature-term counts
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "to", "with",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub listings: usize,
    pub mean_price: f64,
    pub mean_price_per_sqft: f64,
    pub mean_built_up_area: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorScore {
    pub sector: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedroomCount {
    pub bedrooms: f64,
    pub count: usize,
}

/// Five-number summary of a price series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub bedrooms: f64,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Five-number summary of prices within one sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPriceSummary {
    pub sector: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// One point of the area against price scatter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPricePoint {
    pub sector: String,
    pub built_up_area: f64,
    pub price: f64,
    pub price_per_sqft: f64,
    pub bedrooms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistogram {
    /// `bins + 1` edges shared by every series
    pub bin_edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub property_type: String,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomCount {
    pub room: &'static str,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Read-only analytics over a listings snapshot
#[derive(Debug, Clone, Default)]
pub struct MarketAnalytics {
    listings: Vec<ListingRecord>,
    features: Vec<FeatureText>,
}

impl MarketAnalytics {
    pub fn new(listings: Vec<ListingRecord>, features: Vec<FeatureText>) -> Self {
        Self { listings, features }
    }

    pub fn listings(&self) -> &[ListingRecord] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Distinct sectors in the listings, sorted
    pub fn sectors(&self) -> Vec<String> {
        let mut sectors: Vec<String> = self.listings.iter().map(|l| l.sector.clone()).collect();
        sectors.sort();
        sectors.dedup();
        sectors
    }

    /// Per-sector means plus the first known coordinates, sorted by sector
    pub fn sector_summary(&self) -> Vec<SectorSummary> {
        let mut groups: BTreeMap<&str, Vec<&ListingRecord>> = BTreeMap::new();
        for listing in &self.listings {
            groups.entry(listing.sector.as_str()).or_default().push(listing);
        }

        groups
            .into_iter()
            .map(|(sector, rows)| SectorSummary {
                sector: sector.to_string(),
                listings: rows.len(),
                mean_price: mean(rows.iter().map(|r| r.price)),
                mean_price_per_sqft: mean(rows.iter().map(|r| r.price_per_sqft)),
                mean_built_up_area: mean(rows.iter().map(|r| r.built_up_area)),
                latitude: rows.iter().find_map(|r| r.latitude),
                longitude: rows.iter().find_map(|r| r.longitude),
            })
            .collect()
    }

    /// Sectors with the highest mean luxury score
    pub fn top_luxury_sectors(&self, limit: usize) -> Result<Vec<SectorScore>> {
        if limit == 0 {
            return Err(Error::InvalidArgument("limit must be at least 1".to_string()));
        }
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for listing in &self.listings {
            if let Some(score) = listing.luxury_score {
                groups.entry(listing.sector.as_str()).or_default().push(score);
            }
        }

        let mut scores: Vec<SectorScore> = groups
            .into_iter()
            .map(|(sector, values)| SectorScore {
                sector: sector.to_string(),
                score: mean(values.into_iter()),
            })
            .collect();
        // stable: equal means stay in sector order
        scores.sort_by_key(|s| std::cmp::Reverse(OrderedFloat(s.score)));
        scores.truncate(limit);
        Ok(scores)
    }

    /// Listing count per bedroom count, optionally within one sector
    pub fn bedroom_distribution(&self, sector: Option<&str>) -> Result<Vec<BedroomCount>> {
        let rows = self.in_sector(sector)?;
        let mut counts: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
        for row in rows {
            *counts.entry(OrderedFloat(row.bedrooms)).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(bedrooms, count)| BedroomCount {
                bedrooms: bedrooms.0,
                count,
            })
            .collect())
    }

    /// Price five-number summary per bedroom count, up to `max_bedrooms`
    pub fn price_by_bedroom(&self, max_bedrooms: f64) -> Vec<PriceSummary> {
        let mut groups: BTreeMap<OrderedFloat<f64>, Vec<f64>> = BTreeMap::new();
        for listing in self.listings.iter().filter(|l| l.bedrooms <= max_bedrooms) {
            groups.entry(OrderedFloat(listing.bedrooms)).or_default().push(listing.price);
        }

        groups
            .into_iter()
            .map(|(bedrooms, mut prices)| {
                prices.sort_by_key(|p| OrderedFloat(*p));
                PriceSummary {
                    bedrooms: bedrooms.0,
                    count: prices.len(),
                    min: prices[0],
                    q1: quantile(&prices, 0.25),
                    median: quantile(&prices, 0.5),
                    q3: quantile(&prices, 0.75),
                    max: prices[prices.len() - 1],
                }
            })
            .collect()
    }

    /// Price five-number summary per sector, sorted by sector
    pub fn price_by_sector(&self) -> Vec<SectorPriceSummary> {
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for listing in &self.listings {
            groups.entry(listing.sector.as_str()).or_default().push(listing.price);
        }

        groups
            .into_iter()
            .map(|(sector, mut prices)| {
                prices.sort_by_key(|p| OrderedFloat(*p));
                SectorPriceSummary {
                    sector: sector.to_string(),
                    count: prices.len(),
                    min: prices[0],
                    q1: quantile(&prices, 0.25),
                    median: quantile(&prices, 0.5),
                    q3: quantile(&prices, 0.75),
                    max: prices[prices.len() - 1],
                }
            })
            .collect()
    }

    /// Built-up area against price for every listing, optionally of one property type
    pub fn area_price_points(&self, property_type: Option<&str>) -> Result<Vec<AreaPricePoint>> {
        let points: Vec<AreaPricePoint> = self
            .listings
            .iter()
            .filter(|l| property_type.map_or(true, |kind| l.property_type == kind))
            .map(|l| AreaPricePoint {
                sector: l.sector.clone(),
                built_up_area: l.built_up_area,
                price: l.price,
                price_per_sqft: l.price_per_sqft,
                bedrooms: l.bedrooms,
            })
            .collect();
        match property_type {
            Some(kind) if points.is_empty() => Err(Error::NotFound {
                kind: "Property type",
                value: kind.to_string(),
            }),
            _ => Ok(points),
        }
    }

    /// Price histograms for each property type over shared bins
    pub fn price_by_property_type(&self, bins: usize) -> Result<PriceHistogram> {
        if bins == 0 || bins > MAX_BINS {
            return Err(Error::InvalidArgument(format!(
                "bins must be between 1 and {}",
                MAX_BINS
            )));
        }
        if self.listings.is_empty() {
            return Ok(PriceHistogram {
                bin_edges: Vec::new(),
                series: Vec::new(),
            });
        }

        let lo = self.listings.iter().map(|l| l.price).fold(f64::INFINITY, f64::min);
        let hi = self.listings.iter().map(|l| l.price).fold(f64::NEG_INFINITY, f64::max);
        let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
        let bin_edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut by_type: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for listing in &self.listings {
            let counts = by_type
                .entry(listing.property_type.as_str())
                .or_insert_with(|| vec![0; bins]);
            // the top edge belongs to the last bin
            let bin = (((listing.price - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Ok(PriceHistogram {
            bin_edges,
            series: by_type
                .into_iter()
                .map(|(property_type, counts)| HistogramSeries {
                    property_type: property_type.to_string(),
                    counts,
                })
                .collect(),
        })
    }

    /// How many listings have each extra room, optionally for one property type
    pub fn room_availability(&self, property_type: Option<&str>) -> Result<Vec<RoomCount>> {
        let rows: Vec<&ListingRecord> = match property_type {
            None => self.listings.iter().collect(),
            Some(kind) => {
                let rows: Vec<_> = self.listings.iter().filter(|l| l.property_type == kind).collect();
                if rows.is_empty() {
                    return Err(Error::NotFound {
                        kind: "Property type",
                        value: kind.to_string(),
                    });
                }
                rows
            }
        };

        let mut totals = [0.0f64; 5];
        for row in rows {
            let flags = [row.servant_room, row.study_room, row.pooja_room, row.store_room, row.others];
            for (total, flag) in totals.iter_mut().zip(flags) {
                *total += flag;
            }
        }
        Ok(ROOM_TYPES
            .into_iter()
            .zip(totals)
            .map(|(room, count)| RoomCount { room, count })
            .collect())
    }

    /// Most frequent feature terms, overall or for one sector
    pub fn feature_terms(&self, sector: Option<&str>, limit: usize) -> Result<Vec<TermCount>> {
        if limit == 0 {
            return Err(Error::InvalidArgument("limit must be at least 1".to_string()));
        }
        let texts: Vec<&FeatureText> = match sector {
            None => self.features.iter().collect(),
            Some(s) => {
                let texts: Vec<_> = self.features.iter().filter(|f| f.sector == s).collect();
                if texts.is_empty() {
                    return Err(Error::NotFound {
                        kind: "Sector",
                        value: s.to_string(),
                    });
                }
                texts
            }
        };

        let mut counts: AHashMap<String, usize> = AHashMap::new();
        for text in texts {
            for term in text
                .feature
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| t.len() > 1)
                .map(str::to_lowercase)
                .filter(|t| !STOPWORDS.contains(&t.as_str()))
            {
                *counts.entry(term).or_default() += 1;
            }
        }

        let mut terms: Vec<TermCount> = counts
            .into_iter()
            .map(|(term, count)| TermCount { term, count })
            .collect();
        terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        terms.truncate(limit);
        Ok(terms)
    }

    fn in_sector(&self, sector: Option<&str>) -> Result<Vec<&ListingRecord>> {
        match sector {
            None => Ok(self.listings.iter().collect()),
            Some(s) => {
                let rows: Vec<_> = self.listings.iter().filter(|l| l.sector == s).collect();
                if rows.is_empty() {
                    Err(Error::NotFound {
                        kind: "Sector",
                        value: s.to_string(),
                    })
                } else {
                    Ok(rows)
                }
            }
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Linear-interpolated quantile of sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(kind: &str, sector: &str, price: f64, bedrooms: f64, luxury: f64) -> ListingRecord {
        ListingRecord {
            property_type: kind.to_string(),
            sector: sector.to_string(),
            price,
            price_per_sqft: price * 1e7 / 1500.0,
            built_up_area: 1500.0,
            bedrooms,
            bathrooms: bedrooms,
            latitude: Some(28.4),
            longitude: Some(77.0),
            luxury_score: Some(luxury),
            furnishing_type: None,
            servant_room: 1.0,
            study_room: 0.0,
            pooja_room: 0.0,
            store_room: 1.0,
            others: 0.0,
        }
    }

    fn analytics() -> MarketAnalytics {
        let listings = vec![
            listing("flat", "sector 45", 1.0, 2.0, 50.0),
            listing("flat", "sector 45", 2.0, 3.0, 70.0),
            listing("house", "sector 12", 5.0, 4.0, 150.0),
            listing("flat", "sector 12", 1.5, 2.0, 30.0),
            listing("house", "sector 80", 9.0, 5.0, 10.0),
        ];
        let features = vec![
            FeatureText {
                sector: "sector 45".to_string(),
                feature: "Swimming Pool, Gym and Lift".to_string(),
            },
            FeatureText {
                sector: "sector 12".to_string(),
                feature: "Lift, Power Backup, Gym".to_string(),
            },
        ];
        MarketAnalytics::new(listings, features)
    }

    #[test]
    fn test_sector_summary() {
        let summary = analytics().sector_summary();
        let sectors: Vec<_> = summary.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(sectors, vec!["sector 12", "sector 45", "sector 80"]);
        assert_eq!(summary[1].listings, 2);
        assert!((summary[1].mean_price - 1.5).abs() < 1e-12);
        assert_eq!(summary[0].latitude, Some(28.4));
    }

    #[test]
    fn test_top_luxury_sectors() {
        let top = analytics().top_luxury_sectors(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].sector, "sector 12");
        assert!((top[0].score - 90.0).abs() < 1e-12);
        assert_eq!(top[1].sector, "sector 45");
        assert!(analytics().top_luxury_sectors(0).is_err());
    }

    #[test]
    fn test_bedroom_distribution() {
        let all = analytics().bedroom_distribution(None).unwrap();
        assert_eq!(all[0], BedroomCount { bedrooms: 2.0, count: 2 });
        let one = analytics().bedroom_distribution(Some("sector 45")).unwrap();
        assert_eq!(one.len(), 2);
        assert!(matches!(
            analytics().bedroom_distribution(Some("sector 999")),
            Err(Error::NotFound { kind: "Sector", .. })
        ));
    }

    #[test]
    fn test_price_by_bedroom_excludes_large() {
        let summaries = analytics().price_by_bedroom(4.0);
        assert!(summaries.iter().all(|s| s.bedrooms <= 4.0));
        let two = &summaries[0];
        assert_eq!(two.count, 2);
        assert_eq!(two.min, 1.0);
        assert_eq!(two.max, 1.5);
        assert!((two.median - 1.25).abs() < 1e-12);
        assert!((two.q1 - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_price_histogram() {
        let hist = analytics().price_by_property_type(4).unwrap();
        assert_eq!(hist.bin_edges.len(), 5);
        assert_eq!(hist.bin_edges[0], 1.0);
        assert_eq!(hist.bin_edges[4], 9.0);
        let total: usize = hist.series.iter().flat_map(|s| s.counts.iter()).sum();
        assert_eq!(total, 5);
        let house = hist.series.iter().find(|s| s.property_type == "house").unwrap();
        // 9.0 sits on the top edge and lands in the last bin
        assert_eq!(house.counts[3], 1);
    }

    #[test]
    fn test_price_histogram_rejects_huge_bins() {
        assert!(analytics().price_by_property_type(MAX_BINS).is_ok());
        for bins in [MAX_BINS + 1, usize::MAX] {
            assert!(matches!(
                analytics().price_by_property_type(bins),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_price_by_sector() {
        let summaries = analytics().price_by_sector();
        let sectors: Vec<_> = summaries.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(sectors, vec!["sector 12", "sector 45", "sector 80"]);
        let s12 = &summaries[0];
        assert_eq!(s12.count, 2);
        assert_eq!(s12.min, 1.5);
        assert_eq!(s12.max, 5.0);
        assert!((s12.median - 3.25).abs() < 1e-12);
        assert_eq!(summaries[2].q1, 9.0);
    }

    #[test]
    fn test_area_price_points() {
        let all = analytics().area_price_points(None).unwrap();
        assert_eq!(all.len(), 5);
        let houses = analytics().area_price_points(Some("house")).unwrap();
        assert_eq!(houses.len(), 2);
        assert_eq!(houses[0].sector, "sector 12");
        assert_eq!(houses[0].price, 5.0);
        assert_eq!(houses[0].built_up_area, 1500.0);
        assert!(matches!(
            analytics().area_price_points(Some("villa")),
            Err(Error::NotFound { kind: "Property type", .. })
        ));
    }

    #[test]
    fn test_room_availability() {
        let rooms = analytics().room_availability(Some("house")).unwrap();
        assert_eq!(rooms.len(), ROOM_TYPES.len());
        assert_eq!(rooms[0], RoomCount { room: "servant room", count: 2.0 });
        assert_eq!(rooms[1].count, 0.0);
        assert!(analytics().room_availability(Some("villa")).is_err());
    }

    #[test]
    fn test_feature_terms() {
        let overall = analytics().feature_terms(None, 3).unwrap();
        assert_eq!(overall[0], TermCount { term: "gym".to_string(), count: 2 });
        assert_eq!(overall[1], TermCount { term: "lift".to_string(), count: 2 });
        // "and" is a stopword
        let s45 = analytics().feature_terms(Some("sector 45"), 10).unwrap();
        assert!(s45.iter().all(|t| t.term != "and"));
        assert_eq!(s45.len(), 4);
    }

    #[test]
    fn test_quantile_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.0), 1.0);
        assert_eq!(quantile(&data, 1.0), 4.0);
        assert!((quantile(&data, 0.5) - 2.5).abs() < 1e-12);
    }
}
