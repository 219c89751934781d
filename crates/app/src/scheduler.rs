//! Weekly summary schedule.

use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveDateTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use engine::Engine;

/// When and where the weekly summary runs.
#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    pub timezone: Tz,
    pub weekday: Weekday,
    pub hour: u32,
}

impl Schedule {
    /// The first run strictly after `now`.
    pub fn next_run(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let local = now.with_timezone(&self.timezone);
        // Eight days covers "same weekday, hour already passed".
        (0..=7).find_map(|offset| {
            let date = local.date_naive().checked_add_days(Days::new(offset))?;
            if date.weekday() != self.weekday {
                return None;
            }
            let naive = date.and_hms_opt(self.hour, 0, 0)?;
            let at = self.resolve(naive)?;
            (at > local).then_some(at)
        })
    }

    /// Maps a wall-clock time to an instant. A time skipped by a
    /// spring-forward gap moves to the first whole hour after the gap.
    fn resolve(&self, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
        (0..=3).find_map(|shift| {
            let shifted = naive.checked_add_signed(TimeDelta::hours(shift))?;
            self.timezone.from_local_datetime(&shifted).earliest()
        })
    }
}

const RETRY_AFTER: Duration = Duration::from_secs(60 * 60);

/// Sleep until each scheduled run and mail the summaries. Never returns.
pub async fn run(engine: Engine, schedule: Schedule) {
    tracing::info!(
        timezone = %schedule.timezone,
        weekday = %schedule.weekday,
        hour = schedule.hour,
        "weekly summary scheduled"
    );
    loop {
        let now = Utc::now();
        let Some(at) = schedule.next_run(now) else {
            tracing::error!("no upcoming weekly summary run, retrying in an hour");
            tokio::time::sleep(RETRY_AFTER).await;
            continue;
        };
        let wait = (at.with_timezone(&Utc) - now).to_std().unwrap_or_default();
        tracing::debug!(%at, "next weekly summary");
        tokio::time::sleep(wait).await;

        let today = at.date_naive();
        match engine.send_weekly_summaries(today).await {
            Ok(count) => tracing::info!(%today, count, "weekly summaries queued"),
            Err(err) => tracing::error!("weekly summary failed: {err}"),
        }
    }
}
