use std::time::Duration;

use bedrock_registrar::{
    Namespace, RegisterOptions, Registrar, RegistrarConfig, ReplicationConfig, ReplicationWorker,
    RuntimeId,
};
use registrar_testkit::{init_tracing, sample_block};

const WAIT: Duration = Duration::from_secs(5);

fn registrar() -> Registrar {
    init_tracing();
    let config = RegistrarConfig {
        replication: ReplicationConfig {
            queue_capacity: 4,
            worker_name: "replication-test".to_string(),
        },
        ..RegistrarConfig::default()
    };
    Registrar::new(config)
}

#[test]
fn batch_applies_in_registration_order() {
    let mut reg = registrar();
    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();
    reg.register_block(sample_block(1002, "Vase", 11), RegisterOptions::new())
        .unwrap();
    // Same namespace as the first lamp; the later record must win on the replica.
    reg.register_block(
        sample_block(1003, "Lamp Mk2", 12),
        RegisterOptions::new().namespace("minecraft:lamp"),
    )
    .unwrap();
    assert_eq!(reg.pending_replication(), 3);

    let worker = reg.spawn_replication_worker().unwrap();
    assert_eq!(worker.name(), "replication-test");

    let handle = reg.start_replication(&worker);
    assert_eq!(handle.records(), 3);
    assert_eq!(reg.pending_replication(), 0);

    let report = handle.wait_timeout(WAIT).unwrap();
    assert_eq!(report.applied, 3);
    assert!(report.is_complete());

    let lamp = Namespace::derive("Lamp");
    assert_eq!(worker.lookup(&lamp).unwrap(), Some(RuntimeId(12)));
    assert_eq!(reg.block_runtime_id(&lamp), Some(RuntimeId(12)));

    let stats = worker.stats().unwrap();
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.namespaces, 2);
    assert_eq!(stats.tasks, 1);
}

#[test]
fn empty_task_completes_immediately() {
    let mut reg = registrar();
    let worker = reg.spawn_replication_worker().unwrap();
    let report = reg.start_replication(&worker).wait_timeout(WAIT).unwrap();
    assert_eq!(report.applied, 0);
    assert!(report.is_complete());
}

#[test]
fn fire_and_forget_still_applies() {
    let mut reg = registrar();
    let worker = reg.spawn_replication_worker().unwrap();

    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();
    drop(reg.start_replication(&worker));

    reg.register_block(sample_block(1002, "Vase", 11), RegisterOptions::new())
        .unwrap();
    // Tasks run in submission order, so waiting on the second covers the first.
    reg.start_replication(&worker).wait_timeout(WAIT).unwrap();

    assert_eq!(
        worker.lookup(&Namespace::derive("Lamp")).unwrap(),
        Some(RuntimeId(10))
    );
    assert_eq!(worker.stats().unwrap().tasks, 2);
}

#[test]
fn workers_keep_independent_caches() {
    let mut reg = registrar();
    let first = reg.spawn_replication_worker().unwrap();
    let second = ReplicationWorker::spawn("replication-idle", 1).unwrap();

    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();
    reg.start_replication(&first).wait_timeout(WAIT).unwrap();

    let lamp = Namespace::derive("Lamp");
    assert_eq!(first.lookup(&lamp).unwrap(), Some(RuntimeId(10)));
    assert_eq!(second.lookup(&lamp).unwrap(), None);
    second.shutdown();
}

#[test]
fn handle_outlives_worker_shutdown() {
    let mut reg = registrar();
    let worker = reg.spawn_replication_worker().unwrap();
    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();

    let handle = reg.start_replication(&worker);
    // Shutdown drains the queue before joining.
    worker.shutdown();
    assert_eq!(handle.wait().unwrap().applied, 1);
}

#[test]
fn forced_overwrite_replicates_both_records() {
    let mut reg = registrar();
    let worker = reg.spawn_replication_worker().unwrap();
    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();
    reg.register_block(sample_block(1001, "Lamp", 20), RegisterOptions::new().force())
        .unwrap();

    let report = reg.start_replication(&worker).wait_timeout(WAIT).unwrap();
    assert_eq!(report.applied, 2);

    let stats = worker.stats().unwrap();
    assert_eq!(stats.blocks, 1);
    assert_eq!(
        worker.lookup(&Namespace::derive("Lamp")).unwrap(),
        Some(RuntimeId(20))
    );
}

#[test]
fn forced_rename_matches_between_registrar_and_replica() {
    let mut reg = registrar();
    let worker = reg.spawn_replication_worker().unwrap();
    reg.register_block(sample_block(1001, "Lamp", 10), RegisterOptions::new())
        .unwrap();
    reg.register_block(sample_block(1001, "Lantern", 20), RegisterOptions::new().force())
        .unwrap();
    reg.start_replication(&worker).wait_timeout(WAIT).unwrap();

    for name in ["Lamp", "Lantern"] {
        let ns = Namespace::derive(name);
        assert_eq!(worker.lookup(&ns).unwrap(), reg.block_runtime_id(&ns), "{ns}");
    }
    assert_eq!(worker.lookup(&Namespace::derive("Lamp")).unwrap(), None);

    let stats = worker.stats().unwrap();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.namespaces, 1);
}
