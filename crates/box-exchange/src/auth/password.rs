//! 密码处理
//!
//! 提供密码哈希和验证功能

use bcrypt::{hash, verify};

use crate::error::ExchangeError;

/// 对密码进行哈希处理
///
/// 使用 bcrypt 算法生成密码哈希，`cost` 来自 `security.bcrypt_cost`
pub fn hash_password(password: &str, cost: u32) -> Result<String, ExchangeError> {
    hash(password, cost).map_err(|e| ExchangeError::Credential(format!("密码哈希失败: {}", e)))
}

/// 是否为 bcrypt 哈希（`$2a$`、`$2b$`、`$2x$`、`$2y$` 前缀）
pub fn is_password_hash(value: &str) -> bool {
    matches!(value.get(..4), Some("$2a$" | "$2b$" | "$2x$" | "$2y$"))
}

/// 验证密码
///
/// 比较明文密码与存储的哈希值
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ExchangeError> {
    verify(password, hash).map_err(|e| ExchangeError::Credential(format!("密码验证失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "test_password_123";
        let hashed = hash_password(password, 4).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_is_password_hash() {
        assert!(is_password_hash(&hash_password("abcd", 4).unwrap()));
        assert!(is_password_hash("$2y$10$abcdefghijklmnopqrstuu"));
        assert!(!is_password_hash("xh1314521.."));
        assert!(!is_password_hash("$2"));
    }

    #[test]
    fn test_malformed_hash_is_credential_error() {
        let err = verify_password("1234", "not-a-hash").unwrap_err();
        assert_eq!(err.error_code(), "CREDENTIAL_ERROR");
    }
}
