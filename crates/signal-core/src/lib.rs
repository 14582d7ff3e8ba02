//! # Signal Core
//!
//! 시그널 허브의 핵심 도메인 모델 및 공용 인프라를 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 트레이딩 신호, 전략, 시스템 메트릭 엔티티
//! - 에러 분류 체계
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
