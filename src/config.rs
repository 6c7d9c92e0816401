//! Decoder configuration: the tunable parameters of candidate generation,
//! scoring, and the matcher (spec.md §6), plus a simple textual persistence
//! format.

use std::fmt::Write as _;

use crate::model::Frc;
use crate::scoring::FowStandinMatrix;

/// Tunable parameters threaded through every decode call.
///
/// `Default` carries the same values as the original implementation's
/// configuration defaults (`SPEC_FULL.md` §9.3).
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Spatial-query radius per LRP, in meters; also the denominator in `S_geo`.
    pub search_radius: f64,
    /// Relative tolerance on segment length vs. expected DNP.
    pub max_dnp_deviation: f64,
    /// Additional absolute tolerance on segment length, in meters.
    pub tolerated_dnp_dev: f64,
    /// Candidates scoring below this are rejected.
    pub min_score: f64,
    /// Mapping from LFRCNP to the lowest allowed edge FRC on a segment.
    pub tolerated_lfrc: [Frc; 8],
    /// Junction-snap distance, in meters.
    pub candidate_threshold: f64,
    /// Pre-filter on bearing difference, in degrees.
    pub max_bear_deviation: f64,
    pub fow_weight: f64,
    pub frc_weight: f64,
    pub geo_weight: f64,
    pub bear_weight: f64,
    pub fow_standin_score: FowStandinMatrix,
    /// Span, in meters, along which a candidate's bearing is measured.
    pub bear_dist: f64,
    /// Switches the geo kernel between geographic and equal-area back-ends.
    pub equal_area: bool,
    /// Decode wall-clock budget, in seconds. `None` means unbounded.
    pub timeout: Option<f64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            search_radius: 100.0,
            max_dnp_deviation: 0.3,
            tolerated_dnp_dev: 30.0,
            min_score: 0.3,
            tolerated_lfrc: Frc::ALL,
            candidate_threshold: 20.0,
            max_bear_deviation: 90.0,
            fow_weight: 0.25,
            frc_weight: 0.25,
            geo_weight: 0.25,
            bear_weight: 0.25,
            fow_standin_score: FowStandinMatrix::default(),
            bear_dist: 20.0,
            equal_area: false,
            timeout: None,
        }
    }
}

impl DecoderConfig {
    /// Dumps the configuration as a simple `key=value` textual dictionary,
    /// one entry per line (spec.md §6: "Config persistence is a simple
    /// textual dictionary dump/load"). The `fow_standin_score` matrix and
    /// `tolerated_lfrc` table are each flattened onto a single
    /// comma-separated line.
    pub fn to_dict_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "search_radius={}", self.search_radius);
        let _ = writeln!(out, "max_dnp_deviation={}", self.max_dnp_deviation);
        let _ = writeln!(out, "tolerated_dnp_dev={}", self.tolerated_dnp_dev);
        let _ = writeln!(out, "min_score={}", self.min_score);
        let _ = writeln!(out, "candidate_threshold={}", self.candidate_threshold);
        let _ = writeln!(out, "max_bear_deviation={}", self.max_bear_deviation);
        let _ = writeln!(out, "fow_weight={}", self.fow_weight);
        let _ = writeln!(out, "frc_weight={}", self.frc_weight);
        let _ = writeln!(out, "geo_weight={}", self.geo_weight);
        let _ = writeln!(out, "bear_weight={}", self.bear_weight);
        let _ = writeln!(out, "bear_dist={}", self.bear_dist);
        let _ = writeln!(out, "equal_area={}", self.equal_area);
        let _ = writeln!(
            out,
            "timeout={}",
            self.timeout.map(|t| t.to_string()).unwrap_or_default()
        );
        let lfrc = self
            .tolerated_lfrc
            .iter()
            .map(|frc| (*frc as u8).to_string())
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "tolerated_lfrc={lfrc}");
        let standin = self
            .fow_standin_score
            .0
            .iter()
            .flatten()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "fow_standin_score={standin}");
        out
    }

    /// Parses a dictionary produced by [`Self::to_dict_string`], starting
    /// from [`Self::default`] and overwriting only the keys present.
    /// Unrecognized keys and malformed lines are ignored.
    pub fn from_dict_string(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "search_radius" => assign(&mut config.search_radius, value),
                "max_dnp_deviation" => assign(&mut config.max_dnp_deviation, value),
                "tolerated_dnp_dev" => assign(&mut config.tolerated_dnp_dev, value),
                "min_score" => assign(&mut config.min_score, value),
                "candidate_threshold" => assign(&mut config.candidate_threshold, value),
                "max_bear_deviation" => assign(&mut config.max_bear_deviation, value),
                "fow_weight" => assign(&mut config.fow_weight, value),
                "frc_weight" => assign(&mut config.frc_weight, value),
                "geo_weight" => assign(&mut config.geo_weight, value),
                "bear_weight" => assign(&mut config.bear_weight, value),
                "bear_dist" => assign(&mut config.bear_dist, value),
                "equal_area" => config.equal_area = value.parse().unwrap_or(config.equal_area),
                "timeout" => config.timeout = value.parse().ok(),
                "tolerated_lfrc" => {
                    for (slot, token) in config.tolerated_lfrc.iter_mut().zip(value.split(',')) {
                        if let Ok(index) = token.trim().parse::<u8>() {
                            if (index as usize) < Frc::ALL.len() {
                                *slot = Frc::ALL[index as usize];
                            }
                        }
                    }
                }
                "fow_standin_score" => {
                    let values: Vec<f64> =
                        value.split(',').filter_map(|t| t.trim().parse().ok()).collect();
                    for (slot, value) in config
                        .fow_standin_score
                        .0
                        .iter_mut()
                        .flatten()
                        .zip(values)
                    {
                        *slot = value;
                    }
                }
                _ => {}
            }
        }
        config
    }
}

fn assign(field: &mut f64, value: &str) {
    if let Ok(parsed) = value.parse() {
        *field = parsed;
    }
}
