//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수 순서로 덮어씁니다.
//! 환경 변수는 `SIGNAL_HUB__<섹션>__<키>` 형식입니다
//! (예: `SIGNAL_HUB__SERVER__PORT=8080`).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{HubError, HubResult};

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "SIGNAL_HUB";

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 신호 생성기 설정
    pub producer: ProducerConfig,
    /// 연결 생존 확인 설정
    pub liveness: LivenessConfig,
    /// 브로드캐스트 설정
    pub broadcast: BroadcastConfig,
    /// 상태 저장소 설정
    pub store: StoreConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `HubError::Config`를 반환합니다.
    pub fn socket_addr(&self) -> HubResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| HubError::Config(format!("invalid server address: {}", e)))
    }
}

/// 신호 생성기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// 생성기 활성화 여부
    pub enabled: bool,
    /// 생성 주기 (초)
    pub interval_secs: u64,
    /// 봇이 STOPPED일 때 생성 주기를 건너뛸지 여부
    pub pause_when_stopped: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            pause_when_stopped: true,
        }
    }
}

impl ProducerConfig {
    /// 생성 주기.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 연결 생존 확인 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// 핑 주기 (초)
    pub interval_secs: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl LivenessConfig {
    /// 핑 주기.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 브로드캐스트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// 연결별 송신 대기열 크기. 가득 차면 해당 연결의 메시지만 버립니다.
    pub mailbox_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
        }
    }
}

/// 상태 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 데모용 샘플 신호와 누적 메트릭을 미리 채울지 여부
    pub seed_demo_data: bool,
    /// 초기 연결 플랫폼
    pub default_platform: String,
    /// 신호 목록 조회 기본 개수
    pub default_signal_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            default_platform: "quotex".to_string(),
            default_signal_limit: 50,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "signal_api=info,signal_store=info,tower_http=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl HubConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> HubResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: HubConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> HubResult<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// 설정값 검증.
    pub fn validate(&self) -> HubResult<()> {
        if self.producer.interval_secs == 0 {
            return Err(HubError::Config(
                "producer.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.liveness.interval_secs == 0 {
            return Err(HubError::Config(
                "liveness.interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.broadcast.mailbox_capacity == 0 {
            return Err(HubError::Config(
                "broadcast.mailbox_capacity must be greater than 0".to_string(),
            ));
        }
        if self.store.default_signal_limit == 0 {
            return Err(HubError::Config(
                "store.default_signal_limit must be greater than 0".to_string(),
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HubConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.producer.interval(), Duration::from_secs(30));
        assert!(config.producer.pause_when_stopped);
        assert_eq!(config.liveness.interval(), Duration::from_secs(30));
        assert_eq!(config.store.default_signal_limit, 50);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = HubConfig::default();
        config.producer.interval_secs = 0;
        assert!(matches!(config.validate(), Err(HubError::Config(_))));
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut config = HubConfig::default();
        config.server.host = "not a host".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = HubConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 5000);
        assert!(config.producer.enabled);
    }
}
