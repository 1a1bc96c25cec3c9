//! Divergence classification.
//!
//! Compares the dominant price level's buy/sell imbalance with the close
//! direction of the block's highest-volume bar. Pure and deterministic.

use blockvol_core::{CloseDirection, DivergenceLabel};

/// Classify divergence from a block's dominant-level volume imbalance and
/// the rank-1 bar's close direction.
///
/// Rules, in order:
/// 1. A flat close never diverges.
/// 2. Buyers dominated (`vol_diff > 0`) but price closed down.
/// 3. Sellers dominated (`vol_diff < 0`) but price closed up.
/// 4. Otherwise no signal, including a zero diff with a directional close.
pub fn classify(vol_diff: f64, close_direction: CloseDirection) -> Option<DivergenceLabel> {
    match close_direction {
        CloseDirection::Equal => None,
        CloseDirection::Down if vol_diff > 0.0 => {
            Some(DivergenceLabel::PositiveVolumeNegativeClose)
        }
        CloseDirection::Up if vol_diff < 0.0 => {
            Some(DivergenceLabel::NegativeVolumePositiveClose)
        }
        _ => None,
    }
}
