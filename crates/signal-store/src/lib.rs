//! # Signal Store
//!
//! 시그널 허브의 상태 저장소를 제공합니다.
//!
//! - `SignalStore` - 원자적 읽기/갱신 연산을 정의하는 저장소 trait
//! - `MemoryStore` - 단일 잠금 기반 인메모리 구현
//! - `aggregator` - 승률, 손익, 전략 통계 재계산
//! - `catalog` - 전략 카탈로그와 데모 시드 데이터

pub mod aggregator;
pub mod catalog;
pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{OutcomeUpdate, Resolution, SignalStore};
