//! Telemetry for triage sessions
//!
//! Collects wizard events in memory and prints a short summary at the end
//! of a session when running verbose.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    StepChanged {
        from: u8,
        to: u8,
        timestamp: Instant,
    },
    FormEdited {
        field: &'static str,
        timestamp: Instant,
    },
    AssessmentRequested {
        timestamp: Instant,
    },
    AssessmentCompleted {
        duration_ms: u64,
        success: bool,
        timestamp: Instant,
    },
    Restarted {
        timestamp: Instant,
    },
    Exited {
        reason: String,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub step_changes: usize,
    pub form_edits: usize,
    pub assessments_requested: usize,
    pub assessments_succeeded: usize,
    pub assessments_failed: usize,
    pub total_assessment_ms: u64,
    pub restarts: usize,
    pub exits: usize,
}

/// Most recent events kept; older ones are dropped, stats keep counting
pub const EVENT_BUFFER_CAPACITY: usize = 512;

/// Telemetry collector, cheap to clone and share with the wizard
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(EVENT_BUFFER_CAPACITY))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::StepChanged { .. } => stats.step_changes += 1,
                TelemetryEvent::FormEdited { .. } => stats.form_edits += 1,
                TelemetryEvent::AssessmentRequested { .. } => stats.assessments_requested += 1,
                TelemetryEvent::AssessmentCompleted {
                    success,
                    duration_ms,
                    ..
                } => {
                    if *success {
                        stats.assessments_succeeded += 1;
                    } else {
                        stats.assessments_failed += 1;
                    }
                    stats.total_assessment_ms += duration_ms;
                }
                TelemetryEvent::Restarted { .. } => stats.restarts += 1,
                TelemetryEvent::Exited { .. } => stats.exits += 1,
            }
        }

        let mut events = lock(&self.events);
        if events.len() == EVENT_BUFFER_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }

    /// Share of completed assessments that succeeded
    pub fn assessment_success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.assessments_succeeded + stats.assessments_failed;
        if total == 0 {
            1.0
        } else {
            stats.assessments_succeeded as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: crate::cli::Verbosity,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector, verbosity: crate::cli::Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.should_show_details() {
            return;
        }

        let stats = self.collector.get_stats();
        let completed = stats.assessments_succeeded + stats.assessments_failed;
        let avg_ms = if completed == 0 {
            0
        } else {
            stats.total_assessment_ms / completed as u64
        };

        println!("\nResumen de sesión");
        println!("─────────────────────────────────────");
        println!("Duración:            {:?}", self.collector.elapsed());
        println!("Cambios de paso:     {}", stats.step_changes);
        println!("Valoraciones:        {}", stats.assessments_requested);
        println!(
            "Tasa de éxito:       {:.1}%",
            self.collector.assessment_success_rate() * 100.0
        );
        println!("Tiempo medio:        {}ms", avg_ms);
        println!("Reinicios:           {}", stats.restarts);
        println!();
    }

    pub fn should_show_details(&self) -> bool {
        self.verbosity.show_events()
    }
}
