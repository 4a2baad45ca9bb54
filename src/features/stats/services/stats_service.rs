use chrono::{DateTime, Duration, Months, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::leads::models::{Lead, LeadType};
use crate::features::products::models::Product;
use crate::features::stats::dtos::StatsDto;

/// Service deriving dashboard statistics from the two wholesale loads
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_stats(&self) -> Result<StatsDto> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, email, name, phone, company_name, message, type, product_id, sent, created_at
            FROM leads
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load leads for stats: {:?}", e);
            AppError::Database(e)
        })?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, description, price_label, image_url, datasheet_url,
                   available, accessories, category_id,
                   weight_class, engine_power, operating_weight, bucket_capacity,
                   max_digging_depth, max_dumping_height, transport_width,
                   fuel_tank_capacity, hydraulic_flow,
                   created_at, updated_at
            FROM products
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load products for stats: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(compute_stats(&leads, &products, Utc::now()))
    }
}

/// Derive every dashboard counter from the full table loads
pub fn compute_stats(leads: &[Lead], products: &[Product], now: DateTime<Utc>) -> StatsDto {
    let week_cutoff = now - Duration::days(7);
    let month_cutoff = now
        .checked_sub_months(Months::new(1))
        .unwrap_or(now - Duration::days(30));

    let emails_sent = leads.iter().filter(|l| l.sent).count() as i64;
    let accessories = products.iter().filter(|p| p.accessories).count() as i64;

    StatsDto {
        total_leads: leads.len() as i64,
        leads_this_week: leads
            .iter()
            .filter(|l| l.created_at >= week_cutoff)
            .count() as i64,
        leads_this_month: leads
            .iter()
            .filter(|l| l.created_at >= month_cutoff)
            .count() as i64,
        emails_sent,
        emails_pending: leads.len() as i64 - emails_sent,
        fiche_requests: leads
            .iter()
            .filter(|l| l.lead_type == LeadType::Fiche.as_str())
            .count() as i64,
        devis_requests: leads
            .iter()
            .filter(|l| l.lead_type == LeadType::Devis.as_str())
            .count() as i64,
        total_products: products.len() as i64,
        available_products: products.iter().filter(|p| p.available).count() as i64,
        accessories,
        machines: products.len() as i64 - accessories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn lead(lead_type: &str, sent: bool, created_at: DateTime<Utc>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            email: "x@y.fr".to_string(),
            name: None,
            phone: None,
            company_name: None,
            message: None,
            lead_type: lead_type.to_string(),
            product_id: None,
            sent,
            created_at,
        }
    }

    fn product(accessories: bool, available: bool) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "p".to_string(),
            brand: None,
            description: None,
            price_label: None,
            image_url: None,
            datasheet_url: None,
            available,
            accessories,
            category_id: None,
            weight_class: None,
            engine_power: None,
            operating_weight: None,
            bucket_capacity: None,
            max_digging_depth: None,
            max_dumping_height: None,
            transport_width: None,
            fuel_tank_capacity: None,
            hydraulic_flow: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn derives_all_counters() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let leads = vec![
            lead("fiche", true, now - Duration::days(1)),
            lead("fiche", false, now - Duration::days(10)),
            lead("devis", false, now - Duration::days(40)),
        ];
        let products = vec![
            product(false, true),
            product(false, false),
            product(true, true),
        ];

        let stats = compute_stats(&leads, &products, now);

        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.leads_this_week, 1);
        assert_eq!(stats.leads_this_month, 2);
        assert_eq!(stats.emails_sent, 1);
        assert_eq!(stats.emails_pending, 2);
        assert_eq!(stats.fiche_requests, 2);
        assert_eq!(stats.devis_requests, 1);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.available_products, 2);
        assert_eq!(stats.accessories, 1);
        assert_eq!(stats.machines, 2);
    }

    #[test]
    fn empty_tables_yield_zeroes() {
        let stats = compute_stats(&[], &[], Utc::now());
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.emails_pending, 0);
        assert_eq!(stats.machines, 0);
    }
}
