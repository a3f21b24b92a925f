use std::time::{Duration, Instant};

/// One reading taken when a report phase finishes.
#[derive(Debug, Clone)]
pub struct PhaseSample {
    pub phase: String,
    pub phase_time: Duration,
    pub total_time: Duration,
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
}

#[cfg(feature = "cli")]
struct ProcessProbe {
    system: sysinfo::System,
    pid: sysinfo::Pid,
}

#[cfg(feature = "cli")]
impl ProcessProbe {
    fn open() -> Option<Self> {
        match sysinfo::get_current_pid() {
            Ok(pid) => {
                let mut system = sysinfo::System::new();
                system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
                Some(Self { system, pid })
            }
            Err(e) => {
                tracing::warn!("⚠️ Process monitoring unavailable: {}", e);
                None
            }
        }
    }

    /// (CPU %, RSS MB)
    fn read(&mut self) -> Option<(f32, u64)> {
        self.system
            .refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        let process = self.system.process(self.pid)?;
        Some((process.cpu_usage(), process.memory() / 1024 / 1024))
    }
}

/// Times each ETL phase and, with the `cli` feature, samples the process.
pub struct SystemMonitor {
    enabled: bool,
    started: Instant,
    phase_started: Instant,
    peak_rss_mb: u64,
    samples: Vec<PhaseSample>,
    #[cfg(feature = "cli")]
    probe: Option<ProcessProbe>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            phase_started: now,
            peak_rss_mb: 0,
            samples: Vec::new(),
            #[cfg(feature = "cli")]
            probe: if enabled { ProcessProbe::open() } else { None },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn samples(&self) -> &[PhaseSample] {
        &self.samples
    }

    #[cfg(feature = "cli")]
    fn read_process(&mut self) -> (f32, u64) {
        self.probe
            .as_mut()
            .and_then(ProcessProbe::read)
            .unwrap_or((0.0, 0))
    }

    #[cfg(not(feature = "cli"))]
    fn read_process(&mut self) -> (f32, u64) {
        (0.0, 0)
    }

    /// 記錄一個階段結束時的狀態
    pub fn end_phase(&mut self, phase: &str) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let (cpu_percent, rss_mb) = self.read_process();
        self.peak_rss_mb = self.peak_rss_mb.max(rss_mb);

        let sample = PhaseSample {
            phase: phase.to_string(),
            phase_time: now - self.phase_started,
            total_time: now - self.started,
            cpu_percent,
            rss_mb,
            peak_rss_mb: self.peak_rss_mb,
        };
        self.phase_started = now;

        tracing::info!(
            "📊 {} - {:?} (CPU: {:.1}%, Memory: {}MB, Peak: {}MB)",
            sample.phase,
            sample.phase_time,
            sample.cpu_percent,
            sample.rss_mb,
            sample.peak_rss_mb
        );
        self.samples.push(sample);
    }

    pub fn log_summary(&self) {
        if !self.enabled {
            return;
        }
        let slowest = self.samples.iter().max_by_key(|s| s.phase_time);
        tracing::info!(
            "📊 Report finished in {:?}, peak memory {}MB{}",
            self.started.elapsed(),
            self.peak_rss_mb,
            slowest
                .map(|s| format!(", slowest phase: {}", s.phase))
                .unwrap_or_default()
        );
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let mut monitor = SystemMonitor::new(false);
        monitor.end_phase("Extract");
        assert!(!monitor.is_enabled());
        assert!(monitor.samples().is_empty());
    }

    #[test]
    fn test_enabled_monitor_records_phases() {
        let mut monitor = SystemMonitor::new(true);
        monitor.end_phase("Extract");
        monitor.end_phase("Transform");

        let phases: Vec<&str> = monitor.samples().iter().map(|s| s.phase.as_str()).collect();
        assert_eq!(phases, vec!["Extract", "Transform"]);
        assert!(monitor.samples()[1].total_time >= monitor.samples()[0].total_time);
    }
}
