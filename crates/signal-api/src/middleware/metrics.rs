//! HTTP 요청 metrics middleware.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 메트릭 수집에서 제외되는 경로 (스크레이프 자체와 WebSocket 업그레이드).
const UNTRACKED_PATHS: [&str; 2] = ["/metrics", "/ws"];

/// 요청 수, 응답 상태, 처리 시간을 기록하는 미들웨어.
///
/// 숫자 ID 경로 세그먼트는 `{id}`로 정규화되어 라벨 수가 늘어나지 않습니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    if UNTRACKED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = normalize_path(request.uri().path());
    record_http_request(&method, &path);

    let response = next.run(request).await;

    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, started.elapsed().as_secs_f64());
    response
}
