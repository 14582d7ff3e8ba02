//! 시스템 메트릭 싱글톤과 부분 갱신.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// 봇 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotStatus {
    /// 신호 생성 중
    #[default]
    Active,
    /// 중지됨
    Stopped,
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotStatus::Active => write!(f, "ACTIVE"),
            BotStatus::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl std::str::FromStr for BotStatus {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(BotStatus::Active),
            "STOPPED" => Ok(BotStatus::Stopped),
            _ => Err(HubError::Validation(format!("unknown bot status: {}", s))),
        }
    }
}

/// 시스템 전체 메트릭.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    /// 누적 손익
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit: Decimal,
    /// 누적 신호 수
    pub total_signals: u64,
    /// 당일 승률 (%)
    pub win_rate: f64,
    /// 봇 상태
    pub bot_status: BotStatus,
    /// 연결된 플랫폼 식별자
    pub platform: String,
    /// 마지막 갱신 시각
    pub last_updated: DateTime<Utc>,
}

impl SystemMetrics {
    /// 초기 메트릭을 생성합니다.
    pub fn new(platform: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            total_profit: Decimal::ZERO,
            total_signals: 0,
            win_rate: 0.0,
            bot_status: BotStatus::Active,
            platform: platform.into(),
            last_updated: now,
        }
    }

    /// 부분 갱신을 필드 단위 last-write-wins로 적용하고 갱신 시각을 바꿉니다.
    pub fn apply(&mut self, patch: &MetricsPatch, now: DateTime<Utc>) {
        if let Some(total_profit) = patch.total_profit {
            self.total_profit = total_profit;
        }
        if let Some(total_signals) = patch.total_signals {
            self.total_signals = total_signals;
        }
        if let Some(win_rate) = patch.win_rate {
            self.win_rate = win_rate;
        }
        if let Some(bot_status) = patch.bot_status {
            self.bot_status = bot_status;
        }
        if let Some(platform) = &patch.platform {
            self.platform = platform.clone();
        }
        self.last_updated = now;
    }
}

/// `SystemMetrics` 부분 갱신.
///
/// 설정된 필드만 덮어씁니다. 같은 패치를 여러 번 적용해도 결과는 같습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricsPatch {
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_profit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_signals: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_status: Option<BotStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl MetricsPatch {
    /// 봇 상태만 바꾸는 패치.
    pub fn bot_status(status: BotStatus) -> Self {
        Self {
            bot_status: Some(status),
            ..Default::default()
        }
    }

    /// 플랫폼만 바꾸는 패치.
    pub fn platform(platform: impl Into<String>) -> Self {
        Self {
            platform: Some(platform.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_apply_is_idempotent() {
        let now = Utc::now();
        let mut metrics = SystemMetrics::new("quotex", now);
        let patch = MetricsPatch {
            total_signals: Some(5),
            ..Default::default()
        };

        metrics.apply(&patch, now);
        metrics.apply(&patch, now);
        assert_eq!(metrics.total_signals, 5);
    }

    #[test]
    fn test_apply_only_touches_set_fields() {
        let start = Utc::now();
        let mut metrics = SystemMetrics::new("quotex", start);
        metrics.total_profit = dec!(100.5);

        let later = start + Duration::seconds(10);
        metrics.apply(&MetricsPatch::bot_status(BotStatus::Stopped), later);

        assert_eq!(metrics.bot_status, BotStatus::Stopped);
        assert_eq!(metrics.total_profit, dec!(100.5));
        assert_eq!(metrics.platform, "quotex");
        assert_eq!(metrics.last_updated, later);
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: MetricsPatch = serde_json::from_str(r#"{"botStatus":"STOPPED"}"#).unwrap();
        assert_eq!(patch, MetricsPatch::bot_status(BotStatus::Stopped));
        assert_eq!(MetricsPatch::default(), serde_json::from_str("{}").unwrap());
    }

    #[test]
    fn test_wire_format() {
        let metrics = SystemMetrics::new("quotex", Utc::now());
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["botStatus"], "ACTIVE");
        assert_eq!(json["totalProfit"], 0.0);
        assert!(json.get("lastUpdated").is_some());
    }
}
