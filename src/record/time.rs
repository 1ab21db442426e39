use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::ParseError;

/// 把站点上的"更新时间"换算成具体日期。
///
/// 支持三种写法（按空格切分后的个数区分）：
/// - 3 段 `"<N> <单位> trước"`，单位为 giây/phút/giờ/ngày，结果为 `now - N*单位`
/// - 2 段 `"<任意> DD/MM"`，取最后一段，年份为 `now` 的年份
/// - 1 段 `"DD/MM/YY"`：去掉末尾 3 个字符得到日月，末尾 2 位作为 `20YY`。
///   只有一个 `/` 的 `"DD/MM"` 视为今年；末尾是 4 位年份时原样使用
pub fn normalize(raw: &str, now: NaiveDateTime) -> Result<NaiveDate, ParseError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    match tokens.as_slice() {
        [amount, unit, _] => relative(raw, amount, unit, now),
        [_, day_month] => day_month_in_year(raw, day_month, now.year()),
        [token] => single_token(raw, token, now.year()),
        _ => Err(ParseError::InvalidTimestamp {
            token: raw.trim().to_string(),
            input: raw.to_string(),
        }),
    }
}

fn relative(raw: &str, amount: &str, unit: &str, now: NaiveDateTime) -> Result<NaiveDate, ParseError> {
    // 只接受纯数字，"-5"、"+5" 都算格式错误
    let n: i64 = Some(amount)
        .filter(|a| a.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|a| a.parse::<u32>().ok())
        .map(i64::from)
        .ok_or_else(|| ParseError::InvalidTimestamp {
            token: amount.to_string(),
            input: raw.to_string(),
        })?;

    let diff = match unit {
        "giây" => Duration::try_seconds(n),
        "phút" => Duration::try_minutes(n),
        "giờ" => Duration::try_hours(n),
        "ngày" => Duration::try_days(n),
        other => return Err(ParseError::UnknownTimeUnit { unit: other.to_string() }),
    };

    diff.and_then(|d| now.checked_sub_signed(d))
        .map(|t| t.date())
        .ok_or_else(|| ParseError::InvalidTimestamp {
            token: amount.to_string(),
            input: raw.to_string(),
        })
}

fn single_token(raw: &str, token: &str, current_year: i32) -> Result<NaiveDate, ParseError> {
    if token.matches('/').count() < 2 {
        return day_month_in_year(raw, token, current_year);
    }

    let invalid = || ParseError::InvalidTimestamp {
        token: token.to_string(),
        input: raw.to_string(),
    };

    // "12/08/2022"
    if let Some((day_month, year)) = token.rsplit_once('/') {
        if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            return day_month_in_year(raw, day_month, year);
        }
    }

    // "12/08/22"：[:-3] 为日月，[-2:] 为年份后两位
    if !token.is_ascii() || token.len() < 4 {
        return Err(invalid());
    }
    let (head, yy) = token.split_at(token.len() - 2);
    if !head.ends_with('/') || !yy.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let day_month = &head[..head.len() - 1];
    let year: i32 = format!("20{}", yy).parse().map_err(|_| invalid())?;
    day_month_in_year(raw, day_month, year)
}

fn day_month_in_year(raw: &str, day_month: &str, year: i32) -> Result<NaiveDate, ParseError> {
    let full = format!("{}/{}", day_month, year);
    NaiveDate::parse_from_str(&full, "%d/%m/%Y").map_err(|_| ParseError::InvalidTimestamp {
        token: day_month.to_string(),
        input: raw.to_string(),
    })
}
