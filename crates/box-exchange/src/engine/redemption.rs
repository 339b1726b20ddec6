//! 兑换提交
//!
//! 仅在资格校验通过且用户确认后调用，对内存状态一次性完成全部变更

use chrono::{DateTime, NaiveDate, Utc};

use super::eligibility::ExchangeQuote;
use crate::models::{BoxSpec, ExchangeLog, ExchangeRecord, User};

/// 应用一次兑换
///
/// - 扣除积分
/// - 库存减一
/// - 在日志头部插入一条已完成记录
/// - 更新每周兑换时间，至尊宝箱额外更新至尊兑换时间
pub fn apply(
    user: &mut User,
    spec: &mut BoxSpec,
    history: &mut ExchangeLog,
    quote: &ExchangeQuote,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> ExchangeRecord {
    debug_assert!(user.points >= quote.cost);
    debug_assert!(spec.remaining > 0);

    user.points = user.points.saturating_sub(quote.cost);
    spec.remaining = spec.remaining.saturating_sub(1);

    user.last_weekly_exchange = Some(now);
    if quote.box_type.is_premium() {
        user.last_premium_exchange = Some(now);
    }

    let record = ExchangeRecord::completed(user.id.clone(), quote.box_type, quote.cost, today);
    history.prepend(record.clone());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::models::{BoxInventory, BoxType, ExchangeStatus, SystemSettings};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_apply_regular() {
        let mut user = User::new("7654321", "hash", now()).with_points(6000);
        let mut boxes = BoxInventory::default();
        let mut history = ExchangeLog::default();
        let system = SystemSettings::new(now(), now() - Duration::hours(1));

        let quote = evaluate(&user, BoxType::Regular, &boxes, &system, now()).unwrap();
        let record = apply(
            &mut user,
            boxes.get_mut(BoxType::Regular),
            &mut history,
            &quote,
            now(),
            now().date_naive(),
        );

        assert_eq!(user.points, 0);
        assert_eq!(boxes.regular.remaining, 17);
        assert_eq!(boxes.premium.remaining, 5);
        assert_eq!(user.last_weekly_exchange, Some(now()));
        assert_eq!(user.last_premium_exchange, None);
        assert_eq!(record.status, ExchangeStatus::Completed);
        assert_eq!(history.latest(), Some(&record));
    }

    #[test]
    fn test_apply_premium_sets_both_stamps() {
        let mut user = User::new("7654321", "hash", now()).with_points(25_000);
        let mut boxes = BoxInventory::default();
        let mut history = ExchangeLog::default();
        let system = SystemSettings::new(now(), now());

        let quote = evaluate(&user, BoxType::Premium, &boxes, &system, now()).unwrap();
        apply(
            &mut user,
            boxes.get_mut(BoxType::Premium),
            &mut history,
            &quote,
            now(),
            now().date_naive(),
        );

        assert_eq!(user.points, 5000);
        assert_eq!(boxes.premium.remaining, 4);
        assert_eq!(user.last_weekly_exchange, Some(now()));
        assert_eq!(user.last_premium_exchange, Some(now()));
    }

    #[test]
    fn test_newest_record_first() {
        let mut history = ExchangeLog::default();
        let mut boxes = BoxInventory::default();
        let quote = ExchangeQuote {
            user_id: "1111111".to_string(),
            box_type: BoxType::Regular,
            box_name: "战功宝箱".to_string(),
            cost: 6000,
        };

        let mut first = User::new("1111111", "hash", now()).with_points(6000);
        apply(
            &mut first,
            boxes.get_mut(BoxType::Regular),
            &mut history,
            &quote,
            now(),
            now().date_naive(),
        );

        let mut second = User::new("2222222", "hash", now()).with_points(6000);
        apply(
            &mut second,
            boxes.get_mut(BoxType::Regular),
            &mut history,
            &quote,
            now(),
            now().date_naive(),
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|r| r.user_id.as_str()), Some("2222222"));
        assert_eq!(boxes.regular.remaining, 16);
    }
}
