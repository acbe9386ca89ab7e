//! Common Types Module
//!
//! 입력 검증을 거친 값 타입 정의

/// 부탁/상환 설명 최소 길이 (문자 수)
pub const MIN_DESCRIPTION_CHARS: usize = 10;
/// 부탁/상환 설명 최대 길이 (문자 수)
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Actor 식별자 (opaque, 공백 불가)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: &str) -> Result<Self, String> {
        let id = id.trim();
        if id.is_empty() {
            Err("Actor id must not be empty".to_string())
        } else {
            Ok(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 길이 검증된 설명 텍스트
///
/// 앞뒤 공백 제거 후 10~500자 (경계 포함).
/// 바이트가 아닌 문자 단위로 계산.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    pub fn new(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let len = text.chars().count();
        if (MIN_DESCRIPTION_CHARS..=MAX_DESCRIPTION_CHARS).contains(&len) {
            Ok(Self(text.to_string()))
        } else {
            Err(format!(
                "Description must be between {} and {} characters (got {})",
                MIN_DESCRIPTION_CHARS, MAX_DESCRIPTION_CHARS, len
            ))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_valid() {
        let id = ActorId::new("  assassin-7 ").unwrap();
        assert_eq!(id.as_str(), "assassin-7");
    }

    #[test]
    fn test_actor_id_blank() {
        assert!(ActorId::new("   ").is_err());
    }

    #[test]
    fn test_description_boundaries() {
        assert!(Description::new(&"a".repeat(9)).is_err());
        assert!(Description::new(&"a".repeat(10)).is_ok());
        assert!(Description::new(&"a".repeat(500)).is_ok());
        assert!(Description::new(&"a".repeat(501)).is_err());
    }

    #[test]
    fn test_description_counts_chars_not_bytes() {
        // 한글 10자 = 30 bytes
        let text = "가".repeat(10);
        assert!(Description::new(&text).is_ok());
        assert!(Description::new(&"가".repeat(501)).is_err());
    }

    #[test]
    fn test_description_is_trimmed() {
        let desc = Description::new("   short    ").unwrap_err();
        assert!(desc.contains("got 5"));
    }
}
