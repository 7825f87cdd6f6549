use sysinfo::System;

/// Raw utilization percentages, 0 to 100.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub cpu_percent: f64,
    pub ram_percent: f64,
}

/// Something that can measure CPU and RAM on demand.
pub trait TelemetrySource: Send + 'static {
    fn sample(&mut self) -> Reading;
}

/// Reads system-wide counters through `sysinfo`.
pub struct SysinfoSource {
    system: System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta; prime it so the first sample is meaningful.
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SysinfoSource {
    fn sample(&mut self) -> Reading {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        Reading {
            cpu_percent: f64::from(self.system.global_cpu_usage()),
            ram_percent: used_percent(self.system.total_memory(), self.system.available_memory()),
        }
    }
}

/// Share of `total` that is not `available`.
pub fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    100.0 * used as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_percent_of_total() {
        assert_eq!(used_percent(16_000, 4_000), 75.0);
        assert_eq!(used_percent(16_000, 16_000), 0.0);
        assert_eq!(used_percent(0, 0), 0.0);
        assert_eq!(used_percent(100, 200), 0.0);
    }

    #[test]
    fn sysinfo_reading_is_in_range() {
        let mut source = SysinfoSource::new();
        let reading = source.sample();
        assert!((0.0..=100.0).contains(&reading.ram_percent));
        assert!(reading.cpu_percent >= 0.0);
    }
}
