/// Peak picking on a novelty curve.

/// Indices of strict local maxima. A flat top counts once, at its middle sample.
/// The first and last samples are never peaks.
pub fn local_maxima(curve: &[f32]) -> Vec<usize> {
  let mut peaks = Vec::new();
  if curve.len() < 3 {
    return peaks;
  }
  let last = curve.len() - 1;
  let mut i = 1;
  while i < last {
    if curve[i - 1] < curve[i] {
      let mut ahead = i + 1;
      while ahead < last && curve[ahead] == curve[i] {
        ahead += 1;
      }
      if curve[ahead] < curve[i] {
        peaks.push((i + ahead - 1) / 2);
        i = ahead;
        continue;
      }
    }
    i += 1;
  }
  peaks
}

/// Height of `peak` above the higher of its two bases.
///
/// Each base is the lowest sample reached walking outward from the peak until a
/// strictly higher sample or the edge of the curve.
pub fn prominence(curve: &[f32], peak: usize) -> f32 {
  let height = curve[peak];

  let mut left_min = height;
  for &v in curve[..=peak].iter().rev() {
    if v > height {
      break;
    }
    left_min = left_min.min(v);
  }

  let mut right_min = height;
  for &v in &curve[peak..] {
    if v > height {
      break;
    }
    right_min = right_min.min(v);
  }

  height - left_min.max(right_min)
}

/// Peaks with at least `min_prominence`, scanned left to right, each at least
/// `min_distance` frames after the previously accepted one.
pub fn pick_peaks(curve: &[f32], min_prominence: f32, min_distance: usize) -> Vec<(usize, f32)> {
  let mut accepted: Vec<(usize, f32)> = Vec::new();
  for peak in local_maxima(curve) {
    let prom = prominence(curve, peak);
    if prom < min_prominence {
      continue;
    }
    if let Some(&(prev, _)) = accepted.last() {
      if peak - prev < min_distance {
        continue;
      }
    }
    accepted.push((peak, prom));
  }
  accepted
}
