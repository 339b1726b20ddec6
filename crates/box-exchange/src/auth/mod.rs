//! 认证模块
//!
//! 账号与密码的格式校验，以及基于 bcrypt 的凭据哈希

mod password;

pub use password::{hash_password, is_password_hash, verify_password};

use crate::error::ValidationError;

/// 账号长度
pub const ACCOUNT_ID_LEN: usize = 7;

/// 密码最小长度（按字符计）
pub const MIN_PASSWORD_LEN: usize = 4;

/// 校验账号：恰好 7 位 ASCII 数字
pub fn validate_account_id(account: &str) -> Result<(), ValidationError> {
    if account.len() == ACCOUNT_ID_LEN && account.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAccountId)
    }
}

/// 校验密码长度
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort)
    }
}

/// 过滤账号输入：只保留数字并截断到 7 位
pub fn sanitize_account_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(ACCOUNT_ID_LEN)
        .collect()
}
