use anyhow::{Context, anyhow};
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

pub fn parse_timezone(raw: &str) -> anyhow::Result<Tz> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("timezone name cannot be empty"));
    }
    trimmed
        .parse::<Tz>()
        .map_err(|err| anyhow!("invalid timezone id {trimmed}: {err}"))
}

/// The calendar-day reference frame for one rendering pass: today and
/// tomorrow in the configured timezone, derived once from an explicit
/// `now`. Every urgency check and due label in a pass shares one frame so
/// two fields cannot disagree about "today" near midnight.
#[derive(Debug, Clone, Copy)]
pub struct LocalDay {
    tz: Tz,
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl LocalDay {
    pub fn from_instant(now: DateTime<Utc>, tz: Tz) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        let tomorrow = today.succ_opt().unwrap_or(today);
        Self {
            tz,
            today,
            tomorrow,
        }
    }

    /// The calendar date an instant falls on in this frame's timezone.
    #[must_use]
    pub fn project(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }
}

/// Parse a due-date expression into the UTC instant of local midnight on
/// the named day. Supported: today, tomorrow, yesterday, weekday names
/// (next occurrence), +Nd/-Nd, +Nw/-Nw, YYYY-MM-DD.
pub fn parse_due_expr(input: &str, now: DateTime<Utc>, tz: Tz) -> anyhow::Result<DateTime<Utc>> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();
    let today = now.with_timezone(&tz).date_naive();

    match lower.as_str() {
        "today" => return local_midnight(today, tz),
        "tomorrow" => {
            let date = today
                .succ_opt()
                .ok_or_else(|| anyhow!("date out of range: day after {today}"))?;
            return local_midnight(date, tz);
        }
        "yesterday" => {
            let date = today
                .pred_opt()
                .ok_or_else(|| anyhow!("date out of range: day before {today}"))?;
            return local_midnight(date, tz);
        }
        _ => {}
    }

    if let Some(target) = parse_weekday_name(&lower) {
        return local_midnight(next_weekday_date(today, target), tz);
    }

    let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dw])$")
        .map_err(|err| anyhow!("internal regex compile failure: {err}"))?;
    if let Some(caps) = rel_re.captures(&lower) {
        let num: i64 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative amount")?;
        let days = match caps.name("unit").map(|m| m.as_str()) {
            Some("d") => num,
            Some("w") => num * 7,
            other => return Err(anyhow!("unknown relative unit: {other:?}")),
        };
        let signed = if caps.name("sign").map(|m| m.as_str()) == Some("-") {
            -days
        } else {
            days
        };
        let date = today
            .checked_add_signed(Duration::days(signed))
            .ok_or_else(|| anyhow!("date out of range: {signed} days from {today}"))?;
        return local_midnight(date, tz);
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return local_midnight(date, tz);
    }

    Err(anyhow!("unrecognized due date expression: {input}")).with_context(|| {
        "supported forms: today, tomorrow, yesterday, weekday names (e.g. friday), \
         +Nd/-Nd, +Nw/-Nw, YYYY-MM-DD"
    })
}

fn local_midnight(date: NaiveDate, tz: Tz) -> anyhow::Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("failed to construct midnight for {date}"))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => {
            warn!(%date, %first, %second, "ambiguous local midnight; using earliest");
            Ok(first.min(second).with_timezone(&Utc))
        }
        LocalResult::None => Err(anyhow!(
            "midnight of {date} does not exist in timezone {tz}"
        )),
    }
}

fn parse_weekday_name(token: &str) -> Option<Weekday> {
    match token.trim() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_weekday_date(from: NaiveDate, target: Weekday) -> NaiveDate {
    let from_idx = from.weekday().num_days_from_monday() as i64;
    let target_idx = target.num_days_from_monday() as i64;
    let mut delta = (7 + target_idx - from_idx) % 7;
    if delta == 0 {
        delta = 7;
    }
    from.checked_add_signed(Duration::days(delta)).unwrap_or(from)
}
