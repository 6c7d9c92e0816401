//! Candidate scoring: four sub-scores combined as a configured weighted sum
//! (spec.md §4.5).

use crate::config::DecoderConfig;
use crate::model::{Bearing, Fow, Frc, Length};

/// The four sub-scores that make up a candidate's total score, each in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubScores {
    pub geo: f64,
    pub frc: f64,
    pub fow: f64,
    pub bear: f64,
}

impl SubScores {
    pub fn weighted_sum(&self, config: &DecoderConfig) -> f64 {
        config.geo_weight * self.geo
            + config.frc_weight * self.frc
            + config.fow_weight * self.fow
            + config.bear_weight * self.bear
    }
}

/// `S_geo`: linear falloff from 1 at zero distance to 0 at `search_radius`.
pub fn score_geo(distance: Length, search_radius: Length) -> f64 {
    if distance < search_radius {
        1.0 - distance.meters() / search_radius.meters()
    } else {
        0.0
    }
}

/// `S_frc`: linear falloff over the 8-level FRC ordinal distance.
pub fn score_frc(expected: Frc, actual: Frc) -> f64 {
    let diff = (expected as i32 - actual as i32).abs() as f64;
    1.0 - diff / 7.0
}

/// `S_fow`: lookup in the configured 8x8 stand-in matrix.
pub fn score_fow(expected: Fow, actual: Fow, standin: &FowStandinMatrix) -> f64 {
    standin.0[expected as usize][actual as usize]
}

/// The signed difference `a - b`, normalized to `[-180, 180]` degrees.
///
/// Shared by the bearing pre-filter (spec.md §4.4 step 6) and `S_bear`
/// below, matching the original implementation's single `angle_difference`
/// helper rather than inlining the formula twice.
pub fn angle_difference(a: Bearing, b: Bearing) -> f64 {
    a.difference(b)
}

/// `S_bear`: linear falloff over the bearing difference, out of 180 degrees.
pub fn score_bear(expected: Bearing, actual: Bearing) -> f64 {
    1.0 - angle_difference(expected, actual).abs() / 180.0
}

/// An 8x8 stand-in score matrix indexed `[lrp.fow][line.fow]`, used when the
/// two `Fow` values do not match exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FowStandinMatrix(pub [[f64; 8]; 8]);

impl Default for FowStandinMatrix {
    /// The default matrix favors exact matches and gives partial credit to
    /// closely related categories, zero to unrelated ones, matching the
    /// OpenLR Java reference implementation's defaults (reproduced in the
    /// original's `DEFAULT_FOW_STAND_IN_SCORE`).
    fn default() -> Self {
        use Fow::*;
        let order = [
            Undefined,
            Motorway,
            MultipleCarriageway,
            SingleCarriageway,
            Roundabout,
            TrafficSquare,
            SlipRoad,
            Other,
        ];
        let raw: [[f64; 8]; 8] = [
            [0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50],
            [0.50, 1.00, 0.75, 0.00, 0.00, 0.00, 0.00, 0.00],
            [0.50, 0.75, 1.00, 0.75, 0.50, 0.00, 0.00, 0.00],
            [0.50, 0.00, 0.75, 1.00, 0.50, 0.50, 0.00, 0.00],
            [0.50, 0.00, 0.50, 0.50, 1.00, 0.50, 0.00, 0.00],
            [0.50, 0.00, 0.00, 0.50, 0.50, 1.00, 0.00, 0.00],
            [0.50, 0.00, 0.00, 0.00, 0.00, 0.00, 1.00, 0.00],
            [0.50, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 1.00],
        ];

        let mut matrix = [[0.0; 8]; 8];
        for (i, row_fow) in order.iter().enumerate() {
            for (j, col_fow) in order.iter().enumerate() {
                matrix[*row_fow as usize][*col_fow as usize] = raw[i][j];
            }
        }
        Self(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_geo_falls_off_linearly() {
        let radius = Length::from_meters(100.0);
        assert_eq!(score_geo(Length::ZERO, radius), 1.0);
        assert_eq!(score_geo(Length::from_meters(50.0), radius), 0.5);
        assert_eq!(score_geo(Length::from_meters(100.0), radius), 0.0);
        assert_eq!(score_geo(Length::from_meters(150.0), radius), 0.0);
    }

    #[test]
    fn score_frc_is_one_for_exact_match() {
        assert_eq!(score_frc(Frc::Frc2, Frc::Frc2), 1.0);
    }

    #[test]
    fn score_frc_is_zero_at_maximum_distance() {
        assert_eq!(score_frc(Frc::Frc0, Frc::Frc7), 0.0);
    }

    #[test]
    fn fow_standin_matrix_is_one_on_the_diagonal_except_undefined() {
        let matrix = FowStandinMatrix::default();
        // `Undefined` means the FOW could not be determined at all, so even
        // an exact "match" of two unknowns only scores 0.5.
        assert_eq!(score_fow(Fow::Undefined, Fow::Undefined, &matrix), 0.5);
        for fow in [
            Fow::Motorway,
            Fow::MultipleCarriageway,
            Fow::SingleCarriageway,
            Fow::Roundabout,
            Fow::TrafficSquare,
            Fow::SlipRoad,
            Fow::Other,
        ] {
            assert_eq!(score_fow(fow, fow, &matrix), 1.0);
        }
    }

    #[test]
    fn fow_standin_matrix_scores_unrelated_categories_zero() {
        let matrix = FowStandinMatrix::default();
        assert_eq!(score_fow(Fow::Motorway, Fow::SingleCarriageway, &matrix), 0.0);
        assert_eq!(score_fow(Fow::Motorway, Fow::SlipRoad, &matrix), 0.0);
    }

    #[test]
    fn score_bear_is_one_for_identical_bearings() {
        let bearing = Bearing::from_degrees(90.0);
        assert_eq!(score_bear(bearing, bearing), 1.0);
    }

    #[test]
    fn score_bear_is_zero_at_180_degrees_off() {
        assert_eq!(
            score_bear(Bearing::from_degrees(0.0), Bearing::from_degrees(180.0)),
            0.0
        );
    }
}
