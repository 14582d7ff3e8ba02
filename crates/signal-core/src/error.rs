//! 시그널 허브의 에러 타입.
//!
//! 코어 전반에서 사용되는 에러 분류를 정의합니다. 런타임 중 프로세스를
//! 종료시키는 에러는 없으며, 각 변형은 처리되는 위치가 정해져 있습니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum HubError {
    /// 잘못된 입력 (요청 계층으로 전달)
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 이미 결과가 확정된 신호
    #[error("이미 결과가 확정된 신호: {0}")]
    AlreadyResolved(u64),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 연결 전송 실패 (해당 연결만 제거되며 브로드캐스트 호출자에게 전파되지 않음)
    #[error("전송 에러: {0}")]
    Transport(String),

    /// 주기 작업 실패 (다음 주기는 정상 진행)
    #[error("주기 작업 에러: {0}")]
    Cycle(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 코어 작업을 위한 Result 타입.
pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    /// 호출자 입력 때문에 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HubError::Validation(_) | HubError::AlreadyResolved(_) | HubError::NotFound(_)
        )
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for HubError {
    fn from(err: config::ConfigError) -> Self {
        HubError::Config(err.to_string())
    }
}
