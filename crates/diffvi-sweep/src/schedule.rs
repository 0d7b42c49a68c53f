//! Log-spaced hyperparameter schedules.

/// `num` values spaced evenly on a log scale from `start` to `stop`,
/// both ends included.
///
/// The first and last entries are exactly `start` and `stop`. A single
/// value yields `[start]`; zero yields an empty schedule. Callers are
/// expected to pass finite, strictly positive bounds (see
/// [`ScheduleRange::validate`](crate::ScheduleRange::validate)).
pub fn geomspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let log_start = start.ln();
            let step = (stop.ln() - log_start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num)
                .map(|i| (log_start + step * i as f64).exp())
                .collect();
            values[0] = start;
            values[num - 1] = stop;
            values
        }
    }
}
