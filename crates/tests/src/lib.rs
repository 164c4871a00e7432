//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 记录序列化约定
//! - 转换器端到端行为
//! - 投递管道的重试、并发与饱和属性
//! - 监听器完整会话

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use contracts::{
        ContractError, EntityFamily, EventKind, LifecycleEvent, LineageRecord, LineageSink,
        NameIdentifier, Operation,
    };

    /// Sink recording every delivered record
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub records: Arc<Mutex<Vec<LineageRecord>>>,
        pub attempts: Arc<AtomicU64>,
        /// Attempts failing before the sink recovers
        pub fail_first: u64,
        pub delay_ms: u64,
        pub active: Arc<AtomicUsize>,
        pub peak: Arc<AtomicUsize>,
    }

    impl RecordingSink {
        pub fn failing(fail_first: u64) -> Self {
            Self {
                fail_first,
                ..Self::default()
            }
        }

        pub fn slow(delay_ms: u64) -> Self {
            Self {
                delay_ms,
                ..Self::default()
            }
        }

        pub fn delivered(&self) -> Vec<LineageRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl LineageSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            if n <= self.fail_first {
                return Err(ContractError::sink_connection("recording", "collector down"));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn close(&self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    pub fn event(family: EntityFamily, operation: Operation, name: &str) -> LifecycleEvent {
        LifecycleEvent::new(
            EventKind::new(family, operation),
            NameIdentifier::new(["lake", "hive", "sales"], name),
            1_700_000_000_000,
        )
        .with_user("alice")
        .with_tenant(7, "acme")
    }

    pub fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    pub async fn wait_until_async(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{EntityFamily, Operation, Snapshot, UnitInfo};
    use converter::EventConverter;

    use crate::support::event;

    fn converter() -> EventConverter {
        EventConverter::new(contracts::SourceLabel::new("lake"), "urn:test")
    }

    #[test]
    fn test_record_json_has_no_null_placeholders() {
        let unit = UnitInfo {
            code: "m".into(),
            symbol: Some("m".into()),
            ..UnitInfo::default()
        };
        let record = converter()
            .convert(&event(EntityFamily::Unit, Operation::Create, "m").with_snapshot(Snapshot::Unit(unit)))
            .unwrap()
            .unwrap();

        let fields: Vec<_> = record.outputs[0]
            .facets
            .schema
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(fields, ["code", "symbol"]);

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("null"), "{json}");
    }

    #[test]
    fn test_record_json_uses_open_lineage_names() {
        let record = converter()
            .convert(&event(EntityFamily::Table, Operation::Drop, "orders"))
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["eventType"], "COMPLETE");
        assert!(json["run"]["runId"].is_string());
        assert!(json["schemaURL"].is_string());
        let facets = &json["outputs"][0]["facets"];
        assert_eq!(facets["lifecycleStateChange"]["lifecycleStateChange"], "DROP");
        assert!(facets["lifecycleStateChange"]["_producer"].is_string());
    }
}

#[cfg(test)]
mod conversion_tests {
    use contracts::{
        ChangeKind, ColumnPosition, EntityFamily, EventKind, LifecycleEvent, NameIdentifier,
        Operation, Snapshot, SourceLabel, TableChange, TableInfo,
    };
    use converter::EventConverter;

    use crate::support::event;

    fn converter() -> EventConverter {
        EventConverter::new(SourceLabel::new("lake"), "urn:test")
    }

    #[test]
    fn test_identifier_mapping_by_depth() {
        let cases: [(&[&str], &str, &str); 4] = [
            (&[], "lake", "orders"),
            (&["m1"], "root://m1", "orders"),
            (&["m1", "hive"], "root://m1/hive", "orders"),
            (&["m1", "hive", "sales"], "root://m1/hive", "sales.orders"),
        ];
        for (levels, namespace, name) in cases {
            let event = LifecycleEvent::new(
                EventKind::new(EntityFamily::Table, Operation::Drop),
                NameIdentifier::new(levels.iter().copied(), "orders"),
                0,
            )
            .with_tenant(1, "t1");
            let record = converter().convert(&event).unwrap().unwrap();
            assert_eq!(record.outputs[0].namespace, namespace, "{levels:?}");
            assert_eq!(record.outputs[0].name, name, "{levels:?}");
        }
    }

    #[test]
    fn test_alter_table_changes_in_order() {
        let changes = vec![
            TableChange::UpdateComment {
                new_comment: "orders".into(),
            },
            TableChange::RenameColumn {
                field_name: vec!["amt".into()],
                new_name: "amount".into(),
            },
            TableChange::UpdateColumnType {
                field_name: vec!["amount".into()],
                new_data_type: "decimal(10,2)".into(),
            },
            TableChange::UpdateColumnPosition {
                field_name: vec!["amount".into()],
                position: ColumnPosition::First,
            },
            TableChange::RemoveProperty {
                property: "owner".into(),
            },
            TableChange::DeleteColumn {
                field_name: vec!["legacy".into()],
                if_exists: true,
            },
        ];
        let event = event(EntityFamily::Table, Operation::Alter, "orders").with_snapshot(
            Snapshot::TableAlteration {
                updated: Some(TableInfo::new("orders")),
                changes,
            },
        );

        let record = converter().convert(&event).unwrap().unwrap();
        let facet = record.outputs[0].facets.catalog.as_ref().unwrap();
        let kinds: Vec<_> = facet.changes.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            [
                ChangeKind::UpdateComment,
                ChangeKind::RenameColumn,
                ChangeKind::UpdateColumnType,
                ChangeKind::UpdateColumnPosition,
                ChangeKind::RemoveProperty,
                ChangeKind::DeleteColumn,
            ]
        );
        assert_eq!(facet.changes[3].position.as_deref(), Some("FIRST"));
        assert_eq!(facet.tenant_id, Some(7));
    }

    #[test]
    fn test_load_produces_input_dataset() {
        let record = converter()
            .convert(&event(EntityFamily::Schema, Operation::Load, "sales"))
            .unwrap()
            .unwrap();
        assert!(record.outputs.is_empty());
        assert_eq!(record.inputs.len(), 1);
        assert_eq!(record.job_name(), "lake.load_schema");
    }

    #[test]
    fn test_list_operations_are_unsupported() {
        for family in [EntityFamily::Table, EntityFamily::Schema, EntityFamily::Catalog] {
            let event = event(family, Operation::List, "x");
            assert!(converter().convert(&event).unwrap().is_none());
        }
    }
}

#[cfg(test)]
mod delivery_tests {
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    use contracts::{DropPolicy, EntityFamily, Operation, SourceLabel};
    use converter::EventConverter;
    use emitter::{EmissionPipeline, PipelineSettings, RetryPolicy, SubmitOutcome};

    use crate::support::{event, wait_until_async, RecordingSink};

    fn record(name: &str) -> contracts::LineageRecord {
        EventConverter::new(SourceLabel::new("lake"), "urn:test")
            .convert(&event(EntityFamily::Table, Operation::Drop, name))
            .unwrap()
            .unwrap()
    }

    fn settings(workers: usize, permits: usize, retry: RetryPolicy) -> PipelineSettings {
        PipelineSettings {
            queue_capacity: 128,
            workers,
            max_concurrent: permits,
            drop_policy: DropPolicy::DropOldest,
            retry,
        }
    }

    #[tokio::test]
    async fn test_flaky_sink_delivers_once_after_backoff() {
        let retry = RetryPolicy::new(5, 0.01);
        let sink = RecordingSink::failing(3);
        let observer = sink.clone();
        let pipeline = EmissionPipeline::spawn(sink, settings(1, 1, retry));

        let started = Instant::now();
        assert_eq!(pipeline.submit(record("orders")), SubmitOutcome::Enqueued);
        wait_until_async(|| pipeline.snapshot().delivered == 1).await;

        assert!(started.elapsed() >= retry.total_backoff(3));
        assert_eq!(observer.attempts.load(Ordering::SeqCst), 4);
        assert_eq!(observer.delivered().len(), 1);

        let snapshot = pipeline.shutdown(Duration::from_secs(1)).await;
        assert_eq!(snapshot.failed_attempts, 3);
        assert_eq!(snapshot.exhausted, 0);
    }

    #[tokio::test]
    async fn test_dead_sink_gets_exactly_total_attempts() {
        let sink = RecordingSink::failing(u64::MAX);
        let observer = sink.clone();
        let pipeline = EmissionPipeline::spawn(sink, settings(2, 2, RetryPolicy::new(4, 0.0)));

        pipeline.submit(record("a"));
        pipeline.submit(record("b"));
        wait_until_async(|| pipeline.snapshot().exhausted == 2).await;

        let snapshot = pipeline.shutdown(Duration::from_secs(1)).await;
        assert_eq!(observer.attempts.load(Ordering::SeqCst), 8);
        assert_eq!(snapshot.failed_attempts, 8);
        assert!(observer.delivered().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_never_exceeds_permits() {
        let sink = RecordingSink::slow(15);
        let observer = sink.clone();
        let pipeline = EmissionPipeline::spawn(sink, settings(16, 3, RetryPolicy::new(1, 0.0)));

        for i in 0..30 {
            pipeline.submit(record(&format!("t{i}")));
        }
        wait_until_async(|| pipeline.snapshot().delivered == 30).await;

        let snapshot = pipeline.shutdown(Duration::from_secs(1)).await;
        assert!(observer.peak.load(Ordering::SeqCst) <= 3);
        assert!(snapshot.max_in_flight <= 3);
    }
}

#[cfg(test)]
mod listener_tests {
    use std::collections::{BTreeSet, HashMap};

    use contracts::{
        ChangeKind, DropPolicy, EntityFamily, ListenerConfig, Operation, Snapshot, TableChange,
        TableInfo,
    };
    use lineage_listener::{LineageListener, ListenerState};
    use tempfile::tempdir;

    use crate::support::{event, wait_until, RecordingSink};

    #[test]
    fn test_full_session() {
        let sink = RecordingSink::default();
        let observer = sink.clone();
        let mut config = ListenerConfig::default();
        config.namespace = contracts::SourceLabel::new("lakehouse");
        config.transport.max_concurrent_requests = 4;

        let mut listener = LineageListener::with_sink(config, sink).unwrap();
        listener.start().unwrap();

        let alter = event(EntityFamily::Table, Operation::Alter, "orders").with_snapshot(
            Snapshot::TableAlteration {
                updated: Some(TableInfo::new("orders")),
                changes: vec![
                    TableChange::SetProperty {
                        property: "owner".into(),
                        value: "bi".into(),
                    },
                    TableChange::RenameTable {
                        new_name: "orders_v2".into(),
                    },
                ],
            },
        );
        let mut untenanted = event(EntityFamily::Metric, Operation::Register, "gmv");
        untenanted.tenant = None;

        listener.on_post_event(&event(EntityFamily::Table, Operation::Create, "orders"));
        listener.on_post_event(&alter);
        listener.on_post_event(&event(EntityFamily::Table, Operation::Drop, "orders"));
        listener.on_post_event(&event(EntityFamily::Unit, Operation::Create, "m"));
        listener.on_post_event(&event(EntityFamily::Fileset, Operation::Create, "raw"));
        listener.on_post_event(&untenanted);

        wait_until(|| listener.stats().pipeline.delivered == 4);
        let stats = listener.stop().unwrap();
        assert_eq!(listener.state(), ListenerState::Stopped);

        assert_eq!(stats.ingress.received, 6);
        assert_eq!(stats.ingress.converted, 4);
        assert_eq!(stats.ingress.unsupported, 1);
        assert_eq!(stats.ingress.rejected, 1);
        assert_eq!(stats.pipeline.submitted, 4);

        let records = observer.delivered();
        let jobs: BTreeSet<_> = records.iter().map(|r| r.job_name().to_string()).collect();
        let expected: BTreeSet<_> = [
            "lakehouse.create_table",
            "lakehouse.alter_table",
            "lakehouse.drop_table",
            "lakehouse.create_unit",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(jobs, expected);

        let alter = records
            .iter()
            .find(|r| r.job_name() == "lakehouse.alter_table")
            .unwrap();
        let kinds: Vec<_> = alter.outputs[0]
            .facets
            .catalog
            .as_ref()
            .unwrap()
            .changes
            .iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(kinds, [ChangeKind::SetProperty, ChangeKind::RenameTable]);
    }

    #[test]
    fn test_saturated_queue_drops_newest() {
        let sink = RecordingSink::slow(200);
        let mut config = ListenerConfig::default();
        config.transport.max_queue_size = 2;
        config.transport.max_concurrent_requests = 1;
        config.transport.queue.drop_policy = DropPolicy::DropNewest;
        config.shutdown.grace_millis = 2000;

        let mut listener = LineageListener::with_sink(config, sink).unwrap();
        listener.start().unwrap();
        for i in 0..10 {
            listener.on_post_event(&event(EntityFamily::Table, Operation::Drop, &format!("t{i}")));
        }

        let stats = listener.stop().unwrap();
        assert_eq!(stats.ingress.converted, 10);
        assert!(stats.pipeline.dropped >= 1);
        assert_eq!(stats.pipeline.submitted + stats.pipeline.dropped, 10);
        assert_eq!(
            stats.pipeline.delivered + stats.pipeline.abandoned,
            stats.pipeline.submitted
        );
    }

    #[test]
    fn test_file_transport_from_properties() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("lineage.jsonl");
        let props: HashMap<String, String> = [
            ("namespace", "gravitino"),
            ("transport.type", "file"),
            ("transport.file.path", path.to_str().unwrap()),
            ("transport.maxQueueSize", "not-a-number"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut listener = LineageListener::new();
        listener.init(&props).unwrap();
        assert_eq!(listener.config().unwrap().transport.max_queue_size, 10_000);
        listener.start().unwrap();

        listener.on_post_event(&event(EntityFamily::Schema, Operation::Create, "sales"));
        listener.on_post_event(&event(EntityFamily::Catalog, Operation::Drop, "hive"));
        wait_until(|| listener.stats().pipeline.delivered == 2);
        listener.stop().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let jobs: BTreeSet<String> = content
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
            .map(|v| v["job"]["name"].as_str().unwrap().to_string())
            .collect();
        assert!(jobs.contains("gravitino.create_schema"));
        assert!(jobs.contains("gravitino.drop_catalog"));
    }
}
