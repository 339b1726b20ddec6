//! 至尊宝箱开启时间
//!
//! 开启时间固定为本地时间每周一 10:00。存储值过期后不依赖定时器推进，
//! 而是在每次观察（刷新、倒计时）时惰性补齐到未来的周一。
//!
//! 所有计算都在本地日历上进行，再换算为 UTC 保存，保证跨夏令时切换后仍落在 10:00。

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};

/// 开启时刻（本地时间）
pub const PREMIUM_OPEN_HOUR: u32 = 10;

fn open_time() -> NaiveTime {
    NaiveTime::from_hms_opt(PREMIUM_OPEN_HOUR, 0, 0).unwrap_or_default()
}

/// 将本地时间换算为 UTC
///
/// 回拨造成的重复时刻取较早者，拨快造成的空缺时刻顺延到第一个存在的本地时刻
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = naive;
    // 夏令时空缺最多数小时，按 15 分钟步进查找
    for _ in 0..16 {
        if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
            return instant.with_timezone(&Utc);
        }
        candidate += Duration::minutes(15);
    }
    Utc.from_utc_datetime(&naive)
}

/// 计算严格晚于 `now` 的下一个周一 10:00（本地时间）
///
/// 周日距下周一 1 天，其余按 `8 - 星期序号`（周一 = 1）计算，
/// 因此周一当天（即使尚未到 10:00）得到的是下周一。
/// 若结果不晚于 `now`，再顺延 7 天。
pub fn next_premium_open<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let local = now.with_timezone(tz);
    let days_ahead = match local.weekday() {
        Weekday::Sun => 1,
        weekday => 8 - i64::from(weekday.number_from_monday()),
    };

    let date = local.date_naive() + Duration::days(days_ahead);
    let candidate = resolve_local(tz, date.and_time(open_time()));

    if candidate <= now {
        advance_one_week(candidate, tz)
    } else {
        candidate
    }
}

/// 在本地日历上顺延一周
pub fn advance_one_week<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let local = instant.with_timezone(tz).naive_local();
    resolve_local(tz, local + Duration::days(7))
}

/// 惰性补齐开启时间
///
/// `now` 未到达存储值时不做任何变更；否则按整周推进，直到存储值晚于 `now`。
/// 返回推进后的时间与推进的周数（0 表示无需保存）。
pub fn catch_up<Tz: TimeZone>(
    next_open: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> (DateTime<Utc>, u32) {
    let mut next = next_open;
    let mut weeks = 0u32;

    while next <= now {
        let advanced = advance_one_week(next, tz);
        if advanced <= next {
            break;
        }
        next = advanced;
        weeks += 1;
    }

    (next, weeks)
}

/// 距开启时间的倒计时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// 已到开启时间
    Open,
    /// 剩余时长
    Remaining { hours: i64, minutes: i64, seconds: i64 },
}

impl Countdown {
    pub fn until(next_open: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff = (next_open - now).num_milliseconds();
        if diff <= 0 {
            return Self::Open;
        }

        Self::Remaining {
            hours: diff / 3_600_000,
            minutes: (diff % 3_600_000) / 60_000,
            seconds: (diff % 60_000) / 1000,
        }
    }

    /// `HH:MM:SS`（小时不按 24 截断）或 `已开启`
    pub fn label(&self) -> String {
        match self {
            Self::Open => "已开启".to_string(),
            Self::Remaining {
                hours,
                minutes,
                seconds,
            } => format!("{:02}:{:02}:{:02}", hours, minutes, seconds),
        }
    }
}
