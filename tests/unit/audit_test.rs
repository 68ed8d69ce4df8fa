//! Tests for audit sink

use std::sync::Arc;

use parking_lot::Mutex;
use procsched::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    sink.record(build_audit_event(0, Some(100), AuditAction::Launch, Some(1)));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].job, 0);
    assert_eq!(events[0].pid, Some(100));
    assert_eq!(events[0].action, AuditAction::Launch);
    assert_eq!(events[0].worker, Some(1));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    sink.record(build_audit_event(0, None, AuditAction::Reject, None));
    sink.record(build_audit_event(1, Some(7), AuditAction::Launch, None));
    sink.record(build_audit_event(1, Some(7), AuditAction::Exit, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job, 1);
    assert!(sink.actions_for(0).is_empty());
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(0, None, AuditAction::Cancel, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_shared_handle_records_into_inner_sink() {
    let shared = Arc::new(Mutex::new(InMemoryAuditSink::new(8)));
    let mut handle: Box<dyn AuditSink> = Box::new(Arc::clone(&shared));
    handle.record(build_audit_event(3, Some(9), AuditAction::Suspend, Some(0)));
    handle.record(build_audit_event(3, Some(9), AuditAction::Resume, Some(1)));
    assert_eq!(
        shared.lock().actions_for(3),
        vec![AuditAction::Suspend, AuditAction::Resume]
    );
}

#[test]
fn test_action_display() {
    assert_eq!(AuditAction::LaunchFailed.to_string(), "launch_failed");
    assert_eq!(AuditAction::Suspend.to_string(), "suspend");
}
