//! Ledger Error Taxonomy
//!
//! 도메인 에러와 저장소(전송) 에러를 구분.
//! 모든 에러는 커맨드 단위로 종료되며 엔진은 재시도하지 않음.

use thiserror::Error;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// 입력 형식/길이 오류
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 자기 자신에게 부탁, 다른 debt의 알림 사용 등
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 같은 (debtor, creditor) 쌍의 pending 요청 중복
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    /// 현재 상태에서 허용되지 않는 커맨드
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 저장소 읽기/쓰기 실패 (도메인 에러 아님)
    #[error("Store error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        LedgerError::Store(format!("{:#}", err))
    }
}
