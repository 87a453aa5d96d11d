//! Sub-pixel sample placement for anti-aliasing.

/// Regular grid of sub-pixel offsets in [0, 1)², centered within
/// their grid cells. A side of 1 degenerates to a single centered
/// sample.
#[derive(Debug, Clone)]
pub struct RegularGridSampler {
    offsets: Vec<(f64, f64)>,
}

impl RegularGridSampler {
    pub fn new(side: usize) -> Self {
        let side = side.max(1);
        let step = 1.0 / side as f64;
        let half = step * 0.5;
        let mut offsets = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                offsets.push((half + x as f64 * step, half + y as f64 * step));
            }
        }
        Self { offsets }
    }

    /// Samples per pixel.
    pub fn amount(&self) -> usize {
        self.offsets.len()
    }

    pub fn offsets(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.offsets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_is_centered() {
        let sampler = RegularGridSampler::new(1);
        assert_eq!(sampler.offsets, vec![(0.5, 0.5)]);
    }

    #[test]
    fn test_two_by_two_grid() {
        let sampler = RegularGridSampler::new(2);
        assert_eq!(
            sampler.offsets,
            vec![(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)]
        );
        assert_eq!(sampler.amount(), 4);
    }

    #[test]
    fn test_zero_side_clamps_to_one() {
        assert_eq!(RegularGridSampler::new(0).amount(), 1);
    }
}
