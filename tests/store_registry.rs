// tests/store_registry.rs

use std::collections::HashSet;
use std::time::{Duration, Instant};

use distcalc::config::Timings;
use distcalc::dag::{ExpressionRegistry, TaskGraph, TaskStore};
use distcalc::errors::CalcError;
use distcalc::parser::{PlanOperand, TaskSpec, build_plan};
use distcalc::types::{ExpressionStatus, Operand, Operation, TaskOutcome, TaskStatus};

fn steps(input: &str) -> Vec<TaskSpec> {
    build_plan(input, &Timings::uniform(0)).unwrap().steps().to_vec()
}

fn store() -> TaskStore {
    TaskStore::new(Duration::from_secs(60))
}

#[test]
fn ids_are_unique_across_expressions() {
    let store = store();
    let a = store.insert(1, &steps("1+2*3")).unwrap();
    let b = store.insert(2, &steps("4-5/6")).unwrap();

    let a_ids: HashSet<u64> = a.tasks().collect();
    let b_ids: HashSet<u64> = b.tasks().collect();
    assert_eq!(a_ids.len(), 2);
    assert_eq!(b_ids.len(), 2);
    assert!(a_ids.is_disjoint(&b_ids));
    assert_eq!(store.all().len(), 4);
}

#[test]
fn references_are_rewritten_to_store_ids() {
    let store = store();
    store.insert(1, &steps("1+1")).unwrap();
    let graph = store.insert(2, &steps("2*3+4")).unwrap();

    let root = store.get(graph.root()).unwrap();
    assert_eq!(root.operation, Operation::Add);
    assert_eq!(root.status, TaskStatus::Blocked);
    let child = root.arg1.reference().unwrap();
    assert_eq!(store.get(child).unwrap().expression_id, 2);
    assert_eq!(root.arg2, Operand::Literal(4.0));
    assert_eq!(graph.dependencies_of(root.id), vec![child]);
    assert_eq!(graph.dependents_of(child), vec![root.id]);
}

#[test]
fn ready_queue_is_fifo_across_expressions() {
    let store = store();
    store.insert(1, &steps("1+1")).unwrap();
    store.insert(2, &steps("2+2")).unwrap();
    store.insert(3, &steps("3+3")).unwrap();

    let now = Instant::now();
    let order: Vec<f64> = std::iter::from_fn(|| store.next_ready(now))
        .map(|t| t.arg1)
        .collect();
    assert_eq!(order, vec![1.0, 2.0, 3.0]);
    assert_eq!(store.in_progress_len(), 3);
    assert_eq!(store.ready_len(), 0);
}

#[test]
fn dispatched_operands_are_resolved_values() {
    let store = store();
    store.insert(1, &steps("(1+2)*10")).unwrap();

    let now = Instant::now();
    let leaf = store.next_ready(now).unwrap();
    let resolution = store.record_result(leaf.id, TaskOutcome::Value(3.0)).unwrap();
    assert_eq!(resolution.status, TaskStatus::Done);
    assert_eq!(resolution.newly_ready.len(), 1);

    let root = store.next_ready(now).unwrap();
    assert_eq!(root.id, resolution.newly_ready[0]);
    assert_eq!((root.arg1, root.arg2), (3.0, 10.0));
}

#[test]
fn task_shared_inputs_wait_for_both_operands() {
    let store = store();
    store.insert(1, &steps("(1+1)-(2+2)")).unwrap();

    let now = Instant::now();
    let a = store.next_ready(now).unwrap();
    let b = store.next_ready(now).unwrap();

    let first = store.record_result(b.id, TaskOutcome::Value(4.0)).unwrap();
    assert!(first.newly_ready.is_empty());
    let second = store.record_result(a.id, TaskOutcome::Value(2.0)).unwrap();
    assert_eq!(second.newly_ready.len(), 1);
}

#[test]
fn failed_result_releases_nothing() {
    let store = store();
    store.insert(1, &steps("1/0*2")).unwrap();

    let now = Instant::now();
    let div = store.next_ready(now).unwrap();
    let resolution = store
        .record_result(div.id, TaskOutcome::Failed("division by zero".into()))
        .unwrap();
    assert_eq!(resolution.status, TaskStatus::Error);
    assert!(resolution.newly_ready.is_empty());
    assert_eq!(store.get(div.id).unwrap().error.as_deref(), Some("division by zero"));

    let failed = store.fail_downstream(div.id, "division by zero");
    assert_eq!(failed.len(), 1);
    assert!(store.next_ready(now).is_none());

    // Second call finds nothing left to fail.
    assert!(store.fail_downstream(div.id, "division by zero").is_empty());
}

#[test]
fn failure_withdraws_queued_work_of_the_same_expression_only() {
    let store = store();
    let first = store.insert(1, &steps("1/0+2*3")).unwrap();
    let second = store.insert(2, &steps("4-1")).unwrap();

    let now = Instant::now();
    let div = store.next_ready(now).unwrap();
    store
        .record_result(div.id, TaskOutcome::Failed("division by zero".into()))
        .unwrap();

    let failed: HashSet<u64> = store
        .fail_downstream(div.id, "division by zero")
        .into_iter()
        .collect();
    let expected: HashSet<u64> = first.tasks().filter(|id| *id != div.id).collect();
    assert_eq!(failed, expected);

    for id in &failed {
        let task = store.get(*id).unwrap();
        assert_eq!(task.status, TaskStatus::Error);
        assert!(task.error.unwrap().contains("division by zero"));
    }

    let next = store.next_ready(now).unwrap();
    assert_eq!(next.id, second.root());
    assert!(store.next_ready(now).is_none());
}

#[test]
fn unknown_and_finished_tasks_cannot_be_reported() {
    let store = store();
    assert!(matches!(
        store.record_result(9, TaskOutcome::Value(0.0)),
        Err(CalcError::UnknownTask(9))
    ));

    store.insert(1, &steps("1+1")).unwrap();
    let task = store.next_ready(Instant::now()).unwrap();
    store.record_result(task.id, TaskOutcome::Value(2.0)).unwrap();
    assert!(matches!(
        store.record_result(task.id, TaskOutcome::Value(2.0)),
        Err(CalcError::TaskNotInProgress { .. })
    ));
}

#[test]
fn requeue_only_touches_expired_leases() {
    let store = TaskStore::new(Duration::from_millis(100));
    store.insert(1, &steps("1+1")).unwrap();
    store.insert(2, &steps("2+2")).unwrap();

    let t0 = Instant::now();
    let early = store.next_ready(t0).unwrap();
    let late = store.next_ready(t0 + Duration::from_millis(80)).unwrap();

    let requeued = store.requeue_expired(t0 + Duration::from_millis(120));
    assert_eq!(requeued, vec![early.id]);
    assert_eq!(store.get(late.id).unwrap().status, TaskStatus::InProgress);
    assert_eq!(store.ready_len(), 1);
    assert_eq!(store.in_progress_len(), 1);
}

#[test]
fn empty_plan_is_not_a_graph() {
    assert!(matches!(
        TaskGraph::from_steps(&[], 1),
        Err(CalcError::InvalidGraph(_))
    ));
}

#[test]
fn forward_reference_is_rejected() {
    let bad = vec![
        TaskSpec {
            operation: Operation::Add,
            arg1: PlanOperand::Step(1),
            arg2: PlanOperand::Literal(1.0),
            operation_time: 0,
        },
        TaskSpec {
            operation: Operation::Add,
            arg1: PlanOperand::Literal(1.0),
            arg2: PlanOperand::Literal(1.0),
            operation_time: 0,
        },
    ];
    let store = store();
    assert!(matches!(store.insert(1, &bad), Err(CalcError::InvalidGraph(_))));
    // Nothing was inserted.
    assert!(store.all().is_empty());
    assert_eq!(store.ready_len(), 0);
}

#[test]
fn registry_ids_increase_from_one() {
    let registry = ExpressionRegistry::new();
    let a = registry.create("1+1");
    let b = registry.create_failed("2+", "unexpected end of input at position 2");
    let c = registry.create_completed("3", 3.0);

    assert_eq!((a, b, c), (1, 2, 3));
    let statuses: Vec<ExpressionStatus> = registry.list().iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            ExpressionStatus::Processing,
            ExpressionStatus::Error,
            ExpressionStatus::Completed
        ]
    );
}

#[test]
fn registry_transitions_are_single_shot() {
    let registry = ExpressionRegistry::new();
    let id = registry.create("1/0");

    assert!(registry.mark_error(id, "division by zero"));
    assert!(!registry.mark_completed(id, 1.0));
    assert!(!registry.mark_error(id, "something else"));

    let expr = registry.get(id).unwrap();
    assert_eq!(expr.status, ExpressionStatus::Error);
    assert_eq!(expr.result, None);
    assert_eq!(expr.error_detail.as_deref(), Some("division by zero"));

    assert!(!registry.mark_completed(999, 1.0));
    assert!(registry.get(999).is_none());
}

#[test]
fn expression_json_uses_wire_field_names() {
    let registry = ExpressionRegistry::new();
    let id = registry.create("2+2");
    registry.mark_completed(id, 4.0);

    let json = serde_json::to_value(registry.get(id).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "expression": "2+2",
            "status": "completed",
            "result": 4.0
        })
    );
}
