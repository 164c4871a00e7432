//! 血缘事件指标模块
//!
//! 通过 `metrics` facade 记录事件接收、转换与投递指标；
//! 未安装 recorder 时所有调用均为空操作。

use metrics::{counter, gauge, histogram};

/// 记录宿主事件接收
pub fn record_event_received(kind: &str) {
    counter!(
        "lineage_events_received_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录事件转换结果
///
/// `converted = false` 表示该事件类型没有对应的转换器。
pub fn record_event_converted(job: &str, converted: bool) {
    let status = if converted { "converted" } else { "unsupported" };
    counter!(
        "lineage_events_converted_total",
        "job" => job.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录被拒绝的事件 (校验失败或转换异常)
pub fn record_event_rejected(reason: &str) {
    counter!(
        "lineage_events_rejected_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// 记录单次投递尝试
pub fn record_delivery_attempt(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "lineage_delivery_attempts_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录入队到投递成功的延迟
pub fn record_delivery_latency_ms(sink_name: &str, latency_ms: f64) {
    histogram!(
        "lineage_delivery_latency_ms",
        "sink" => sink_name.to_string()
    )
    .record(latency_ms);
}

/// 记录队列满导致的丢弃
pub fn record_record_dropped(sink_name: &str, policy: &str) {
    counter!(
        "lineage_records_dropped_total",
        "sink" => sink_name.to_string(),
        "policy" => policy.to_string()
    )
    .increment(1);
}

/// 记录重试耗尽
pub fn record_record_exhausted(sink_name: &str) {
    counter!(
        "lineage_records_exhausted_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// 记录因关闭而放弃的记录
pub fn record_record_abandoned(sink_name: &str, count: u64) {
    counter!(
        "lineage_records_abandoned_total",
        "sink" => sink_name.to_string()
    )
    .increment(count);
}

/// 记录队列深度
pub fn record_queue_depth(sink_name: &str, depth: usize) {
    gauge!(
        "lineage_queue_depth",
        "sink" => sink_name.to_string()
    )
    .set(depth as f64);
}

/// 记录进行中的投递数
pub fn record_in_flight(sink_name: &str, in_flight: usize) {
    gauge!(
        "lineage_in_flight",
        "sink" => sink_name.to_string()
    )
    .set(in_flight as f64);
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        let summary = stats.summary();
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-10);
        assert!((summary.min - 1.0).abs() < 1e-10);
        assert!((summary.max - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(StatsSummary::default().to_string(), "N/A");

        let mut stats = RunningStats::default();
        stats.push(12.5);
        let output = stats.summary().to_string();
        assert!(output.contains("min=12.500"));
        assert!(output.contains("(n=1)"));
    }

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: calls are no-ops
        record_event_received("create_table");
        record_delivery_attempt("console", true);
        record_record_abandoned("console", 3);
    }
}
