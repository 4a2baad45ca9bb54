//! In-memory filtering over the wholesale leads load.
//!
//! The admin console loads every lead and narrows the list locally; these
//! functions keep that logic in one place. Filters intersect: a lead must
//! pass every active criterion.

use chrono::{DateTime, Duration, Months, Utc};

use crate::features::leads::dtos::{DatePeriod, LeadCountsDto, LeadListQuery};
use crate::features::leads::models::Lead;

/// Apply the view filters to a full leads load
pub fn apply(leads: &[Lead], query: &LeadListQuery, now: DateTime<Utc>) -> Vec<Lead> {
    let tz_offset_minutes = query.tz_offset_minutes.unwrap_or(0);

    leads
        .iter()
        .filter(|lead| {
            query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .is_none_or(|term| matches_text(lead, term))
        })
        .filter(|lead| {
            query
                .lead_type
                .is_none_or(|t| lead.lead_type == t.as_str())
        })
        .filter(|lead| {
            query
                .period
                .is_none_or(|p| in_period(lead.created_at, p, tz_offset_minutes, now))
        })
        .cloned()
        .collect()
}

/// Aggregate counters over the full load plus the filtered subset size
pub fn counts(all: &[Lead], filtered: usize) -> LeadCountsDto {
    let sent = all.iter().filter(|l| l.sent).count() as i64;

    LeadCountsDto {
        total: all.len() as i64,
        sent,
        pending: all.len() as i64 - sent,
        filtered: filtered as i64,
    }
}

/// Case-insensitive match over name, email and company
fn matches_text(lead: &Lead, term: &str) -> bool {
    let needle = term.to_lowercase();

    let haystacks = [
        lead.name.as_deref(),
        Some(lead.email.as_str()),
        lead.company_name.as_deref(),
    ];

    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Whether a creation timestamp falls into the requested bucket.
///
/// "today" compares calendar days on the viewer's clock (shifted by the
/// supplied UTC offset); "week" and "month" are rolling windows.
fn in_period(
    created_at: DateTime<Utc>,
    period: DatePeriod,
    tz_offset_minutes: i32,
    now: DateTime<Utc>,
) -> bool {
    match period {
        DatePeriod::Today => {
            let offset = Duration::minutes(tz_offset_minutes as i64);
            (created_at + offset).date_naive() == (now + offset).date_naive()
        }
        DatePeriod::Week => created_at >= now - Duration::days(7),
        DatePeriod::Month => {
            let cutoff = now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30));
            created_at >= cutoff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn lead(
        name: &str,
        email: &str,
        company: Option<&str>,
        lead_type: &str,
        created_at: DateTime<Utc>,
    ) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: Some(name.to_string()),
            phone: None,
            company_name: company.map(String::from),
            message: Some("Bonjour".to_string()),
            lead_type: lead_type.to_string(),
            product_id: None,
            sent: false,
            created_at,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn today_bucket_matches_same_calendar_day() {
        let now = at(2025, 3, 15, 14);
        let leads = vec![
            lead("a", "a@x.fr", None, "fiche", at(2025, 3, 15, 1)),
            lead("b", "b@x.fr", None, "fiche", at(2025, 3, 14, 23)),
        ];

        let query = LeadListQuery {
            period: Some(DatePeriod::Today),
            ..Default::default()
        };

        let filtered = apply(&leads, &query, now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].email, "a@x.fr");
    }

    #[test]
    fn today_bucket_respects_viewer_offset() {
        // 23:30 UTC on the 14th is already the 15th at UTC+2
        let now = at(2025, 3, 15, 8);
        let leads = vec![lead("a", "a@x.fr", None, "fiche", at(2025, 3, 14, 23))];

        let utc_query = LeadListQuery {
            period: Some(DatePeriod::Today),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &utc_query, now).len(), 0);

        let paris_query = LeadListQuery {
            period: Some(DatePeriod::Today),
            tz_offset_minutes: Some(120),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &paris_query, now).len(), 1);
    }

    #[test]
    fn week_bucket_is_a_rolling_seven_days() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![
            lead("recent", "r@x.fr", None, "devis", at(2025, 3, 10, 12)),
            lead("old", "o@x.fr", None, "devis", at(2025, 3, 1, 12)),
        ];

        let query = LeadListQuery {
            period: Some(DatePeriod::Week),
            ..Default::default()
        };

        let filtered = apply(&leads, &query, now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].email, "r@x.fr");
    }

    #[test]
    fn month_bucket_is_a_rolling_month() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![
            lead("recent", "r@x.fr", None, "devis", at(2025, 2, 20, 12)),
            lead("old", "o@x.fr", None, "devis", at(2025, 1, 20, 12)),
        ];

        let query = LeadListQuery {
            period: Some(DatePeriod::Month),
            ..Default::default()
        };

        assert_eq!(apply(&leads, &query, now).len(), 1);
    }

    #[test]
    fn type_filter_matches_exact_tag() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![
            lead("a", "a@x.fr", None, "fiche", now),
            lead("b", "b@x.fr", None, "devis", now),
            lead("c", "c@x.fr", None, "demande", now),
        ];

        let query = LeadListQuery {
            lead_type: Some(crate::features::leads::models::LeadType::Fiche),
            ..Default::default()
        };

        let filtered = apply(&leads, &query, now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].lead_type, "fiche");
    }

    #[test]
    fn text_filter_covers_name_email_and_company() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![
            lead("Jean Dupont", "jean@btp.fr", Some("BTP Services"), "devis", now),
            lead("Marie Curie", "marie@labo.fr", None, "devis", now),
        ];

        let by_name = LeadListQuery {
            search: Some("dupont".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &by_name, now).len(), 1);

        let by_email = LeadListQuery {
            search: Some("LABO".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &by_email, now).len(), 1);

        let by_company = LeadListQuery {
            search: Some("btp serv".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &by_company, now).len(), 1);

        let no_match = LeadListQuery {
            search: Some("takeuchi".to_string()),
            ..Default::default()
        };
        assert!(apply(&leads, &no_match, now).is_empty());
    }

    #[test]
    fn combined_filters_intersect() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![
            lead("a", "a@x.fr", None, "fiche", at(2025, 3, 15, 9)),
            lead("b", "b@x.fr", None, "fiche", at(2025, 3, 10, 9)),
            lead("c", "c@x.fr", None, "devis", at(2025, 3, 15, 9)),
        ];

        let query = LeadListQuery {
            lead_type: Some(crate::features::leads::models::LeadType::Fiche),
            period: Some(DatePeriod::Today),
            ..Default::default()
        };

        let filtered = apply(&leads, &query, now);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].email, "a@x.fr");
    }

    #[test]
    fn counts_track_sent_and_pending() {
        let now = at(2025, 3, 15, 12);
        let mut leads = vec![
            lead("a", "a@x.fr", None, "fiche", now),
            lead("b", "b@x.fr", None, "fiche", now),
            lead("c", "c@x.fr", None, "devis", now),
        ];
        leads[0].sent = true;

        let c = counts(&leads, 2);
        assert_eq!(c.total, 3);
        assert_eq!(c.sent, 1);
        assert_eq!(c.pending, 2);
        assert_eq!(c.filtered, 2);
    }

    #[test]
    fn blank_search_is_ignored() {
        let now = at(2025, 3, 15, 12);
        let leads = vec![lead("a", "a@x.fr", None, "fiche", now)];

        let query = LeadListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(apply(&leads, &query, now).len(), 1);
    }
}
