//! 지원 플랫폼 목록.

use serde::{Deserialize, Serialize};

/// 플랫폼 연결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStatus {
    /// 연결됨
    Connected,
    /// 연결 가능
    Ready,
}

/// 지원 플랫폼 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// 플랫폼 식별자
    pub platform: String,
    /// 상태
    pub status: PlatformStatus,
    /// 지원 기능
    pub features: Vec<String>,
}

const SUPPORTED_PLATFORMS: &[(&str, PlatformStatus, &[&str])] = &[
    ("quotex", PlatformStatus::Connected, &["binary_options", "5s_to_5m"]),
    ("zerodha", PlatformStatus::Ready, &["intraday", "1m_to_1D"]),
    ("binomo", PlatformStatus::Ready, &["binary_options", "5s_to_1h"]),
    ("bybit", PlatformStatus::Ready, &["crypto", "1m_to_1W"]),
    ("metatrader", PlatformStatus::Ready, &["forex", "1m_to_1M"]),
];

/// 식별자로 지원 플랫폼을 찾습니다. 대소문자를 구분하지 않습니다.
pub fn lookup_platform(name: &str) -> Option<PlatformInfo> {
    let name = name.trim().to_lowercase();
    SUPPORTED_PLATFORMS
        .iter()
        .find(|(id, _, _)| *id == name)
        .map(|(id, status, features)| PlatformInfo {
            platform: (*id).to_string(),
            status: *status,
            features: features.iter().map(|f| (*f).to_string()).collect(),
        })
}

/// 지원 플랫폼 식별자 목록.
pub fn supported_platforms() -> Vec<&'static str> {
    SUPPORTED_PLATFORMS.iter().map(|(id, _, _)| *id).collect()
}
