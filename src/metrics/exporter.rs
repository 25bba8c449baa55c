use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// Writes the text exposition format so the output can be scraped directly
/// or forwarded by a collector. Write failures are dropped; metrics never
/// affect cache behaviour.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "# TYPE {} {}", name, kind);
            let _ = writeln!(writer, "{} {}", name, value);
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheMetricsSnapshot) {
        let counters = [
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("insert_new_total", snapshot.insert_new),
            ("insert_updates_total", snapshot.insert_updates),
            ("evictions_total", snapshot.evictions),
            ("promotions_total", snapshot.promotions),
            ("aging_rescales_total", snapshot.aging_rescales),
            ("ghost_hits_total", snapshot.ghost_hits),
            ("clears_total", snapshot.clears),
        ];
        for (suffix, value) in counters {
            self.write_metric("counter", suffix, value);
        }
        self.write_metric("gauge", "cache_len", snapshot.cache_len as u64);
        self.write_metric("gauge", "capacity", snapshot.capacity as u64);
    }
}
