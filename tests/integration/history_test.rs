use vitalstat::core::telemetry::{HistoryBuffer, MetricsHistory, DEFAULT_HISTORY_SIZE};

#[test]
fn test_default_capacity_is_sixty() {
    let buffer: HistoryBuffer<f32> = HistoryBuffer::new();
    assert_eq!(buffer.capacity(), 60);
    assert_eq!(DEFAULT_HISTORY_SIZE, 60);
}

#[test]
fn test_never_exceeds_capacity_and_evicts_oldest() {
    let mut buffer = HistoryBuffer::new();
    for i in 0..1000u32 {
        buffer.push(i);
        assert!(buffer.len() <= DEFAULT_HISTORY_SIZE);
    }
    let values: Vec<u32> = buffer.iter().copied().collect();
    assert_eq!(values.len(), 60);
    assert_eq!(values.first(), Some(&940));
    assert_eq!(values.last(), Some(&999));
    assert!(values.windows(2).all(|w| w[0] + 1 == w[1]));
}

#[test]
fn test_metrics_history_domains_are_independent() {
    let mut history = MetricsHistory::new();
    for i in 0..70 {
        history.push_cpu(i as f32);
    }
    history.push_memory(40.0);
    history.push_gpu(12.0);

    assert_eq!(history.cpu_usage.len(), 60);
    assert_eq!(history.memory_usage.len(), 1);
    assert_eq!(history.gpu_usage.latest(), Some(&12.0));
    assert!(history.network_in.is_empty());
}
