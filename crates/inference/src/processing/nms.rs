use crate::processing::iou::iou;
use common::span;
use schema::Detection;

/// IoU at or above which a lower-scored box of the same class is dropped.
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.6;

/// Per-class greedy non-maximum suppression.
pub struct NmsEngine {
    pub iou_threshold: f32,
}

impl NmsEngine {
    pub fn new(iou_threshold: f32) -> Self {
        Self { iou_threshold }
    }

    /// Suppress overlapping candidates class by class.
    ///
    /// Output is grouped by class index ascending, each group in emission
    /// order (highest score first). Candidates with a class index outside
    /// `0..num_classes` are dropped.
    pub fn suppress(&self, candidates: Vec<Detection>, num_classes: usize) -> Vec<Detection> {
        let _s = span!("nms");

        let total = candidates.len();
        let mut per_class: Vec<Vec<Detection>> = vec![Vec::new(); num_classes];
        for candidate in candidates {
            match per_class.get_mut(candidate.class_id) {
                Some(bucket) => bucket.push(candidate),
                None => tracing::warn!(
                    class_id = candidate.class_id,
                    num_classes,
                    "Dropping candidate with unknown class"
                ),
            }
        }

        let mut kept = Vec::new();
        for mut remaining in per_class {
            self.suppress_class(&mut remaining, &mut kept);
        }

        tracing::trace!(candidates = total, kept = kept.len(), "NMS finished");
        kept
    }

    fn suppress_class(&self, remaining: &mut Vec<Detection>, kept: &mut Vec<Detection>) {
        while let Some(best_idx) = highest_score_index(remaining) {
            // Removed by position so a degenerate box (IoU 0 with itself)
            // still leaves the working set.
            let best = remaining.remove(best_idx);
            remaining.retain(|candidate| iou(&best.bbox, &candidate.bbox) < self.iou_threshold);
            kept.push(best);
        }
    }
}

impl Default for NmsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NMS_THRESHOLD)
    }
}

/// Index of the highest score; ties go to the earliest candidate.
fn highest_score_index(candidates: &[Detection]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match best {
            Some((_, score)) if !(candidate.score > score) => {}
            _ => best = Some((i, candidate.score)),
        }
    }
    best.map(|(i, _)| i)
}
