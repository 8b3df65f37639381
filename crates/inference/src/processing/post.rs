use crate::backend::RawOutput;
use crate::error::DetectorError;
use common::span;
use ndarray::{ArrayD, ArrayView1, ArrayView2, Axis, Ix2};
use schema::{BoundingBox, Detection};

const BOX_REGRESSION_LEN: usize = 4;

/// Turns raw per-anchor tensors into scored, labeled candidate boxes.
pub struct OutputDecoder {
    pub minimum_score: f32,
}

impl OutputDecoder {
    pub fn new(minimum_score: f32) -> Self {
        Self { minimum_score }
    }

    /// Decode one frame of engine output.
    ///
    /// Boxes are clamped to `[0, image_width - 1] x [0, image_height - 1]`.
    /// Output follows anchor order; overlapping boxes are left for NMS.
    pub fn decode(
        &self,
        output: &RawOutput,
        labels: &[String],
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<Detection>, DetectorError> {
        let _s = span!("decode_output");

        let boxes = anchor_matrix(&output.boxes, "box tensor rank")?;
        let scores = anchor_matrix(&output.scores, "score tensor rank")?;

        if boxes.ncols() != BOX_REGRESSION_LEN {
            return Err(DetectorError::mismatch(
                "box regression length",
                BOX_REGRESSION_LEN,
                boxes.ncols(),
            ));
        }
        if scores.nrows() != boxes.nrows() {
            return Err(DetectorError::mismatch(
                "score anchor count",
                boxes.nrows(),
                scores.nrows(),
            ));
        }
        if scores.ncols() != labels.len() {
            return Err(DetectorError::mismatch(
                "score vector length",
                labels.len(),
                scores.ncols(),
            ));
        }

        let max_x = image_width as f32 - 1.0;
        let max_y = image_height as f32 - 1.0;

        let mut detections = Vec::new();

        for (index, (regression, class_scores)) in
            boxes.outer_iter().zip(scores.outer_iter()).enumerate()
        {
            let Some((class_id, score)) = best_class(class_scores) else {
                continue;
            };

            // Equal to the threshold is discarded; NaN never passes.
            if !(score > self.minimum_score) {
                continue;
            }

            let bbox = BoundingBox::from_center(
                regression[0],
                regression[1],
                regression[2],
                regression[3],
            )
            .clamp_to(max_x, max_y);

            detections.push(Detection {
                id: index,
                class_id,
                class_name: labels[class_id].clone(),
                score,
                bbox,
            });
        }

        tracing::debug!(
            anchors = boxes.nrows(),
            candidates = detections.len(),
            "Decoded output"
        );

        Ok(detections)
    }
}

/// View a `[1, anchors, n]` or `[anchors, n]` tensor as a matrix.
fn anchor_matrix<'a>(
    tensor: &'a ArrayD<f32>,
    what: &'static str,
) -> Result<ArrayView2<'a, f32>, DetectorError> {
    let view = tensor.view();
    let view = match view.ndim() {
        3 if view.shape()[0] == 1 => view.index_axis_move(Axis(0), 0),
        3 => return Err(DetectorError::mismatch("batch size", 1, view.shape()[0])),
        2 => view,
        ndim => return Err(DetectorError::mismatch(what, 3, ndim)),
    };

    view.into_dimensionality::<Ix2>()
        .map_err(|e| DetectorError::InvalidModel(format!("{}: {}", what, e)))
}

/// Arg-max with strict `>`: equal scores keep the lowest class index.
fn best_class(scores: ArrayView1<f32>) -> Option<(usize, f32)> {
    let mut iter = scores.iter().copied().enumerate();
    let mut best = iter.next()?;
    for (class_id, score) in iter {
        if score > best.1 {
            best = (class_id, score);
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class{}", i)).collect()
    }

    /// Build a `[1, n, 4]` / `[1, n, num_classes]` output pair.
    /// `class_scores` gives (class index, score) per anchor; the rest stay at 0.
    fn create_raw_output(
        boxes_cxcywh: Vec<[f32; 4]>,
        class_scores: Vec<(usize, f32)>,
        num_classes: usize,
    ) -> RawOutput {
        let n = boxes_cxcywh.len();

        let mut box_data = Vec::with_capacity(n * 4);
        for coords in &boxes_cxcywh {
            box_data.extend_from_slice(coords);
        }
        let boxes = Array::from_shape_vec(IxDyn(&[1, n, 4]), box_data).unwrap();

        let mut score_data = vec![0.0f32; n * num_classes];
        for (i, (class_idx, score)) in class_scores.iter().enumerate() {
            score_data[i * num_classes + class_idx] = *score;
        }
        let scores = Array::from_shape_vec(IxDyn(&[1, n, num_classes]), score_data).unwrap();

        RawOutput::new(boxes, scores)
    }

    #[test]
    fn test_cxcywh_decoding() {
        let output = create_raw_output(vec![[100.0, 100.0, 40.0, 20.0]], vec![(2, 0.9)], 3);

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(3), 416, 416)
            .unwrap();

        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.id, 0);
        assert_eq!(det.class_id, 2);
        assert_eq!(det.class_name, "class2");
        assert_eq!(det.score, 0.9);
        assert_eq!(det.bbox, BoundingBox::new(80.0, 90.0, 120.0, 110.0));
    }

    /// Test score exactly at the threshold is discarded, just above is kept
    #[test]
    fn test_threshold_is_strict() {
        let minimum_score = 0.5f32;
        let just_above = f32::from_bits(minimum_score.to_bits() + 1);

        let output = create_raw_output(
            vec![[10.0, 10.0, 4.0, 4.0], [20.0, 20.0, 4.0, 4.0], [30.0, 30.0, 4.0, 4.0]],
            vec![(0, minimum_score), (0, just_above), (0, 0.3)],
            1,
        );

        let detections = OutputDecoder::new(minimum_score)
            .decode(&output, &labels(1), 416, 416)
            .unwrap();

        assert_eq!(detections.len(), 1, "Only the anchor above threshold");
        assert_eq!(detections[0].id, 1);
        assert_eq!(detections[0].score, just_above);
    }

    /// Test equal class scores keep the lowest class index
    #[test]
    fn test_class_tie_keeps_lowest_index() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 1, 4]), vec![50.0, 50.0, 10.0, 10.0]).unwrap();
        let scores =
            Array::from_shape_vec(IxDyn(&[1, 1, 4]), vec![0.1, 0.8, 0.3, 0.8]).unwrap();
        let output = RawOutput::new(boxes, scores);

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(4), 416, 416)
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_id, 1);
    }

    #[test]
    fn test_class_id_argmax() {
        let output = create_raw_output(
            vec![
                [10.0, 10.0, 4.0, 4.0],
                [20.0, 20.0, 4.0, 4.0],
                [30.0, 30.0, 4.0, 4.0],
            ],
            vec![(0, 0.9), (39, 0.9), (79, 0.9)],
            80,
        );

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(80), 416, 416)
            .unwrap();

        let class_ids: Vec<usize> = detections.iter().map(|d| d.class_id).collect();
        assert_eq!(class_ids, vec![0, 39, 79]);
        assert_eq!(detections[1].class_name, "class39");
    }

    /// Test that coordinates are clamped to image bounds
    #[test]
    fn test_coordinates_clamped_to_image_bounds() {
        let output = create_raw_output(
            vec![
                [5.0, 5.0, 40.0, 40.0],     // Negative top-left
                [410.0, 410.0, 40.0, 40.0], // Past bottom-right
                [200.0, 200.0, 40.0, 40.0], // Inside
            ],
            vec![(0, 0.9), (0, 0.9), (0, 0.9)],
            1,
        );

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(1), 416, 416)
            .unwrap();

        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].bbox.left, 0.0, "Negative left clamped to 0");
        assert_eq!(detections[0].bbox.top, 0.0, "Negative top clamped to 0");
        assert_eq!(detections[1].bbox.right, 415.0, "Right clamped to width - 1");
        assert_eq!(detections[1].bbox.bottom, 415.0, "Bottom clamped to height - 1");
        assert_eq!(
            detections[2].bbox,
            BoundingBox::new(180.0, 180.0, 220.0, 220.0)
        );
    }

    #[test]
    fn test_zero_detections_when_all_below_threshold() {
        let output = create_raw_output(
            vec![[10.0, 10.0, 4.0, 4.0], [20.0, 20.0, 4.0, 4.0]],
            vec![(0, 0.1), (1, 0.49)],
            2,
        );

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(2), 416, 416)
            .unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn test_nan_scores_discarded() {
        let output = create_raw_output(vec![[10.0, 10.0, 4.0, 4.0]], vec![(0, f32::NAN)], 1);

        let detections = OutputDecoder::new(0.0)
            .decode(&output, &labels(1), 416, 416)
            .unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let output = RawOutput::new(
            Array::from_shape_vec(IxDyn(&[1, 0, 4]), vec![]).unwrap(),
            Array::from_shape_vec(IxDyn(&[1, 0, 3]), vec![]).unwrap(),
        );

        let detections = OutputDecoder::new(0.5)
            .decode(&output, &labels(3), 416, 416)
            .unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn test_unbatched_tensors_accepted() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 4]), vec![50.0, 50.0, 10.0, 10.0]).unwrap();
        let scores = Array::from_shape_vec(IxDyn(&[1, 2]), vec![0.2, 0.7]).unwrap();

        let detections = OutputDecoder::new(0.5)
            .decode(&RawOutput::new(boxes, scores), &labels(2), 416, 416)
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_id, 1);
    }

    #[test]
    fn test_label_count_mismatch() {
        let output = create_raw_output(vec![[10.0, 10.0, 4.0, 4.0]], vec![(0, 0.9)], 91);

        let err = OutputDecoder::new(0.5)
            .decode(&output, &labels(80), 416, 416)
            .unwrap_err();

        match err {
            DetectorError::ModelMismatch {
                what,
                expected,
                actual,
            } => {
                assert_eq!(what, "score vector length");
                assert_eq!(expected, 80);
                assert_eq!(actual, 91);
            }
            other => panic!("expected ModelMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatches() {
        // Box regression of length 5
        let output = RawOutput::new(
            Array::zeros(IxDyn(&[1, 2, 5])),
            Array::zeros(IxDyn(&[1, 2, 3])),
        );
        assert!(matches!(
            OutputDecoder::new(0.5).decode(&output, &labels(3), 416, 416),
            Err(DetectorError::ModelMismatch { .. })
        ));

        // Anchor counts disagree
        let output = RawOutput::new(
            Array::zeros(IxDyn(&[1, 2, 4])),
            Array::zeros(IxDyn(&[1, 3, 3])),
        );
        assert!(matches!(
            OutputDecoder::new(0.5).decode(&output, &labels(3), 416, 416),
            Err(DetectorError::ModelMismatch { .. })
        ));

        // Batch of two is not supported
        let output = RawOutput::new(
            Array::zeros(IxDyn(&[2, 2, 4])),
            Array::zeros(IxDyn(&[2, 2, 3])),
        );
        assert!(matches!(
            OutputDecoder::new(0.5).decode(&output, &labels(3), 416, 416),
            Err(DetectorError::ModelMismatch { .. })
        ));
    }
}
