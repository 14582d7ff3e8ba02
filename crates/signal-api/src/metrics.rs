//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 팬아웃/생성기 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # Errors
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 팬아웃 메트릭 헬퍼 함수
// ============================================================================

/// WebSocket 연결 수 설정.
pub fn set_websocket_connections(count: usize) {
    gauge!("websocket_connections_active").set(count as f64);
}

/// 브로드캐스트 결과 기록.
pub fn record_broadcast(event_type: &'static str, delivered: usize, evicted: usize, dropped: usize) {
    counter!("broadcast_delivered_total", "event" => event_type).increment(delivered as u64);
    if evicted > 0 {
        counter!("broadcast_evicted_total").increment(evicted as u64);
    }
    if dropped > 0 {
        counter!("broadcast_dropped_total", "event" => event_type).increment(dropped as u64);
    }
}

/// 생성된 신호 카운터 증가.
pub fn record_signal_produced(strategy: &str) {
    counter!("signals_produced_total", "strategy" => strategy.to_string()).increment(1);
}

/// 주기 작업 실패 카운터 증가.
pub fn record_cycle_failure(task: &'static str) {
    counter!("background_cycle_failures_total", "task" => task).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 숫자 ID 세그먼트를 정규화합니다.
///
/// 예: `/api/signals/42/result` → `/api/signals/{id}/result`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
