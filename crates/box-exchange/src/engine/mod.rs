//! 兑换规则引擎
//!
//! 资格校验（`evaluate`）与提交（`apply`）分离：校验是纯函数，
//! 可先用于生成确认文案，用户确认后再提交变更。

mod eligibility;
mod redemption;
mod rejection;

pub use eligibility::{ExchangeQuote, cooldown_until, evaluate, exchange_cooldown};
pub use redemption::apply;
pub use rejection::Rejection;
