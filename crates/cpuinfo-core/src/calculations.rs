use crate::models::CpuUsage;

/// Decimal places used for every reported average.
pub const AVERAGE_DECIMALS: u32 = 2;

/// Round `value` to `decimal_places`, halves away from zero.
///
/// # Examples
///
/// ```
/// use cpuinfo_core::calculations::round_to;
///
/// assert_eq!(round_to(3.14159, 2), 3.14);
/// assert_eq!(round_to(2.5, 0), 3.0);
/// assert_eq!(round_to(-2.5, 0), -3.0);
/// ```
pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10_f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

// ── CpuAverager ───────────────────────────────────────────────────────────────

/// Stateless mean computation over CPU figures.
pub struct CpuAverager;

impl CpuAverager {
    /// Arithmetic mean of each CPU figure, rounded to [`AVERAGE_DECIMALS`].
    ///
    /// Returns the averages together with the number of samples. An empty
    /// input yields all-zero averages and a count of 0.
    pub fn mean<I>(samples: I) -> (CpuUsage, usize)
    where
        I: IntoIterator<Item = CpuUsage>,
    {
        let mut sum = CpuUsage::default();
        let mut count = 0usize;
        for cpu in samples {
            sum.total += cpu.total;
            sum.user += cpu.user;
            sum.kernel += cpu.kernel;
            count += 1;
        }

        if count == 0 {
            return (CpuUsage::default(), 0);
        }

        let n = count as f64;
        let averages = CpuUsage {
            total: round_to(sum.total / n, AVERAGE_DECIMALS),
            user: round_to(sum.user / n, AVERAGE_DECIMALS),
            kernel: round_to(sum.kernel / n, AVERAGE_DECIMALS),
        };
        (averages, count)
    }
}
