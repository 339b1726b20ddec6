//! 会话服务
//!
//! 注册与登录。凭据以 bcrypt 哈希保存，登录时对未知账号和错误密码返回同一错误。

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use crate::auth::{self, hash_password, verify_password};
use crate::error::{ExchangeError, Result, ValidationError};
use crate::models::{ExchangeState, User, UserRoster};
use crate::repository::StateRepository;

/// 会话服务
#[derive(Clone)]
pub struct SessionService {
    repo: StateRepository,
    bcrypt_cost: u32,
}

impl SessionService {
    pub fn new(repo: StateRepository, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// 注册新用户
    ///
    /// 校验顺序：账号格式 -> 密码长度 -> 两次密码一致 -> 账号不存在。
    /// 新用户积分为 0，非管理员。
    #[instrument(skip(self, state, password, confirm))]
    pub async fn register(
        &self,
        state: &mut ExchangeState,
        account: &str,
        password: &str,
        confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let account = account.trim();
        let password = password.trim();
        let confirm = confirm.trim();

        auth::validate_account_id(account)?;
        auth::validate_password(password)?;
        if password != confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if state.users.contains(account) {
            return Err(ValidationError::AccountExists.into());
        }

        let user = User::new(account, hash_password(password, self.bcrypt_cost)?, now);
        let previous = state.users.clone();
        state.users.insert(user.clone());

        if let Err(e) = self.repo.save_users(&state.users).await {
            error!(user_id = %account, error = %e, "保存用户失败，撤销注册");
            state.users = previous;
            return Err(e.into());
        }

        info!(user_id = %account, "用户注册成功");
        Ok(user)
    }

    /// 把导入名册中的明文密码替换为哈希，返回处理的账号数
    pub fn hash_plaintext_passwords(&self, users: &mut UserRoster) -> Result<usize> {
        let mut hashed = 0;
        for user in users.iter_mut() {
            if auth::is_password_hash(&user.password_hash) {
                continue;
            }
            user.password_hash = hash_password(&user.password_hash, self.bcrypt_cost)?;
            hashed += 1;
        }
        if hashed > 0 {
            info!(hashed, "导入数据中的明文密码已哈希");
        }
        Ok(hashed)
    }

    /// 登录
    #[instrument(skip(self, state, password))]
    pub fn login(&self, state: &ExchangeState, account: &str, password: &str) -> Result<User> {
        let account = account.trim();
        let password = password.trim();

        auth::validate_account_id(account)?;
        auth::validate_password(password)?;

        let Some(user) = state.users.find(account) else {
            warn!(user_id = %account, "登录失败：账号不存在");
            return Err(ExchangeError::Authentication);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %account, "登录失败：密码错误");
            return Err(ExchangeError::Authentication);
        }

        info!(user_id = %account, is_admin = user.is_admin, "用户登录成功");
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use exchange_shared::storage::MemoryStore;

    use crate::models::{BoxInventory, ExchangeLog, SystemSettings, UserRoster};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 6, 0, 0).unwrap()
    }

    fn setup() -> (SessionService, ExchangeState) {
        let repo = StateRepository::new(Arc::new(MemoryStore::new()));
        let state = ExchangeState {
            users: UserRoster::default(),
            boxes: BoxInventory::default(),
            history: ExchangeLog::default(),
            system: SystemSettings::new(now(), now()),
        };
        (SessionService::new(repo, 4), state)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, mut state) = setup();

        let user = service
            .register(&mut state, " 1234567 ", "abcd", "abcd", now())
            .await
            .unwrap();
        assert_eq!(user.id, "1234567");
        assert_eq!(user.points, 0);
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "abcd");

        assert!(service.login(&state, "1234567", "abcd").is_ok());
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let (service, mut state) = setup();

        let err = service
            .register(&mut state, "12345", "ab", "cd", now())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ACCOUNT_ID");

        let err = service
            .register(&mut state, "1234567", "ab", "cd", now())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PASSWORD_TOO_SHORT");

        let err = service
            .register(&mut state, "1234567", "abcd", "abce", now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "两次输入的密码不一致");
        assert!(state.users.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_account() {
        let (service, mut state) = setup();
        service
            .register(&mut state, "1234567", "abcd", "abcd", now())
            .await
            .unwrap();

        let err = service
            .register(&mut state, "1234567", "other", "other", now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "账号已存在，请直接登录");
        assert_eq!(state.users.len(), 1);
    }

    #[tokio::test]
    async fn test_login_failures_share_message() {
        let (service, mut state) = setup();
        service
            .register(&mut state, "1234567", "abcd", "abcd", now())
            .await
            .unwrap();

        let wrong_password = service.login(&state, "1234567", "abce").unwrap_err();
        let unknown = service.login(&state, "7654321", "abcd").unwrap_err();
        assert_eq!(wrong_password.to_string(), "账号或密码错误");
        assert_eq!(unknown.to_string(), wrong_password.to_string());
    }

    #[test]
    fn test_plaintext_passwords_are_hashed_once() {
        let (service, _) = setup();
        let hashed = hash_password("kept", 4).unwrap();
        let mut users = UserRoster::new(vec![
            User::new("1234567", "legacy-pass", now()),
            User::new("7654321", hashed.clone(), now()),
        ]);

        assert_eq!(service.hash_plaintext_passwords(&mut users).unwrap(), 1);
        let legacy = users.find("1234567").unwrap();
        assert!(verify_password("legacy-pass", &legacy.password_hash).unwrap());
        assert_eq!(users.find("7654321").unwrap().password_hash, hashed);

        assert_eq!(service.hash_plaintext_passwords(&mut users).unwrap(), 0);
    }
}
