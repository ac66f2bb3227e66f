use crate::model::config::DropConfig;

/// Measurements used to turn a pointer offset into an insertion index.
///
/// Every card is assumed to be `card_height` tall. Cards with long
/// descriptions render taller, so drops near the bottom of a busy column can
/// land one slot off; the live drop indicator lets the user correct before
/// releasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropGeometry {
    pub card_height: f64,
    pub container_padding: f64,
}

impl Default for DropGeometry {
    fn default() -> Self {
        DropGeometry::from(&DropConfig::default())
    }
}

impl From<&DropConfig> for DropGeometry {
    fn from(config: &DropConfig) -> Self {
        DropGeometry {
            card_height: config.card_height,
            container_padding: config.container_padding,
        }
    }
}

impl DropGeometry {
    /// Insertion index for a pointer `offset_y` pixels below the top of a
    /// column's card list. Always within `0..=card_count`.
    pub fn drop_index(&self, offset_y: f64, card_count: usize) -> usize {
        let adjusted = offset_y - self.container_padding;
        if adjusted.is_nan() {
            return 0;
        }
        if !(self.card_height.is_finite() && self.card_height > 0.0) {
            return if adjusted > 0.0 { card_count } else { 0 };
        }

        let slot = (adjusted / self.card_height).floor();
        if slot <= 0.0 {
            0
        } else if slot >= card_count as f64 {
            card_count
        } else {
            slot as usize
        }
    }
}
