/// 預覽片段數量
pub const CLIP_COUNT: usize = 9;
/// 每個片段長度（秒）
pub const CLIP_LENGTH: f64 = 3.0;
/// 超過此長度（秒）才產生預覽
pub const MIN_PREVIEW_DURATION: f64 = 60.0;

/// 起點至少跳過的秒數，以及相對於總長的比例
const MIN_START_OFFSET: f64 = 2.0;
const START_OFFSET_RATIO: f64 = 0.05;

/// 計算預覽片段的起始時間點
///
/// 在 `[start, duration - clip_length]` 之間平均取 `count` 個點，
/// `start = max(2, 0.05 * duration)`；可用區間不為正時回傳 None
#[must_use]
pub fn clip_offsets(duration: f64, count: usize, clip_length: f64) -> Option<Vec<f64>> {
    if count == 0 || !duration.is_finite() {
        return None;
    }

    let start = MIN_START_OFFSET.max(START_OFFSET_RATIO * duration);
    let span = duration - start - clip_length;
    if span <= 0.0 {
        return None;
    }

    if count == 1 {
        return Some(vec![start]);
    }

    let step = span / (count - 1) as f64;
    Some((0..count).map(|i| start + step * i as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_for_long_video() {
        let offsets = clip_offsets(1800.0, CLIP_COUNT, CLIP_LENGTH).unwrap();
        assert_eq!(offsets.len(), 9);
        // start = 90, last = 1800 - 3
        assert!((offsets[0] - 90.0).abs() < 1e-9);
        assert!((offsets[8] - 1797.0).abs() < 1e-9);

        for pair in offsets.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_min_start_offset_applies_to_short_video() {
        let offsets = clip_offsets(20.0, CLIP_COUNT, CLIP_LENGTH).unwrap();
        assert!((offsets[0] - 2.0).abs() < 1e-9);
        assert!((offsets[8] - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_span_aborts() {
        assert!(clip_offsets(5.0, CLIP_COUNT, CLIP_LENGTH).is_none());
        assert!(clip_offsets(0.0, CLIP_COUNT, CLIP_LENGTH).is_none());
        assert!(clip_offsets(f64::NAN, CLIP_COUNT, CLIP_LENGTH).is_none());
    }

    #[test]
    fn test_every_clip_fits_inside_duration() {
        for duration in [61.0, 120.0, 3600.0, 7200.5] {
            let offsets = clip_offsets(duration, CLIP_COUNT, CLIP_LENGTH).unwrap();
            for t in offsets {
                assert!(t >= 2.0);
                assert!(t + CLIP_LENGTH <= duration + 1e-9);
            }
        }
    }
}
