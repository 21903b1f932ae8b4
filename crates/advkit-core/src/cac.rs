use crate::checks;
use crate::config::CacConfig;
use crate::error::Result;
use crate::render::{fmt_opt2, round2, text_table, Report};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub channel: String,
    pub spend: f64,
    pub new_customers: u64,
    /// Monthly revenue per customer.
    pub monthly_revenue: f64,
    pub gross_margin: f64,
    pub monthly_churn: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Marginal,
    Unprofitable,
    Unknown,
}

impl Health {
    pub fn as_str(self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Marginal => "marginal",
            Health::Unprofitable => "unprofitable",
            Health::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelEconomics {
    #[serde(flatten)]
    pub channel: Channel,
    pub cac: Option<f64>,
    pub ltv: Option<f64>,
    pub ltv_cac_ratio: Option<f64>,
    pub payback_months: Option<f64>,
    pub health: Health,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacReport {
    pub total_spend: f64,
    pub total_customers: u64,
    pub blended_cac: Option<f64>,
    pub best_channel: Option<String>,
    pub items: Vec<ChannelEconomics>,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

pub fn economics(channel: Channel, cfg: &CacConfig) -> ChannelEconomics {
    let cac = ratio(channel.spend, channel.new_customers as f64);
    if cac.is_none() {
        tracing::warn!(channel = %channel.channel, "no new customers; CAC undefined");
    }
    let margin_revenue = channel.monthly_revenue * channel.gross_margin;
    let ltv = ratio(margin_revenue, channel.monthly_churn);
    let ltv_cac_ratio = match (ltv, cac) {
        (Some(l), Some(c)) => ratio(l, c),
        _ => None,
    };
    let payback_months = cac.and_then(|c| ratio(c, margin_revenue));

    let health = match ltv_cac_ratio {
        None => Health::Unknown,
        Some(r)
            if r >= cfg.healthy_ratio
                && payback_months.is_some_and(|p| p <= cfg.payback_target_months) =>
        {
            Health::Healthy
        }
        Some(r) if r >= 1.0 => Health::Marginal,
        Some(_) => Health::Unprofitable,
    };

    ChannelEconomics {
        channel,
        cac: cac.map(round2),
        ltv: ltv.map(round2),
        ltv_cac_ratio: ltv_cac_ratio.map(round2),
        payback_months: payback_months.map(round2),
        health,
    }
}

pub fn analyze(mut channels: Vec<Channel>, cfg: &CacConfig) -> Result<CacReport> {
    for c in channels.iter_mut() {
        let id = c.channel.clone();
        checks::require_id(&id)?;
        checks::require_non_negative(&id, "spend", c.spend)?;
        checks::require_non_negative(&id, "monthly_revenue", c.monthly_revenue)?;
        c.gross_margin = checks::normalize_fraction(&id, "gross_margin", c.gross_margin)?;
        c.monthly_churn = checks::normalize_fraction(&id, "monthly_churn", c.monthly_churn)?;
    }
    checks::warn_duplicate_ids(channels.iter().map(|c| c.channel.as_str()));

    let total_spend: f64 = channels.iter().map(|c| c.spend).sum();
    let total_customers: u64 = channels.iter().map(|c| c.new_customers).sum();

    let mut items: Vec<ChannelEconomics> =
        channels.into_iter().map(|c| economics(c, cfg)).collect();
    // Best ratio first; channels without a ratio last.
    items.sort_by(|a, b| {
        let by_ratio = match (a.ltv_cac_ratio, b.ltv_cac_ratio) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_ratio.then_with(|| a.channel.channel.cmp(&b.channel.channel))
    });

    Ok(CacReport {
        total_spend: round2(total_spend),
        total_customers,
        blended_cac: ratio(total_spend, total_customers as f64).map(round2),
        best_channel: items
            .first()
            .filter(|e| e.ltv_cac_ratio.is_some())
            .map(|e| e.channel.channel.clone()),
        items,
    })
}

impl Report for CacReport {
    fn render_text(&self) -> String {
        let mut out = String::from("CUSTOMER ACQUISITION ECONOMICS\n\n");
        let rows: Vec<Vec<String>> = self
            .items
            .iter()
            .map(|e| {
                vec![
                    e.channel.channel.clone(),
                    format!("{:.2}", e.channel.spend),
                    e.channel.new_customers.to_string(),
                    fmt_opt2(e.cac),
                    fmt_opt2(e.ltv),
                    fmt_opt2(e.ltv_cac_ratio),
                    fmt_opt2(e.payback_months),
                    e.health.as_str().to_string(),
                ]
            })
            .collect();
        out.push_str(&text_table(
            &["channel", "spend", "customers", "cac", "ltv", "ltv:cac", "payback", "health"],
            &rows,
        ));
        out.push_str(&format!(
            "\nTotal spend: {:.2} | Customers: {} | Blended CAC: {}\n",
            self.total_spend,
            self.total_customers,
            fmt_opt2(self.blended_cac)
        ));
        if let Some(best) = &self.best_channel {
            out.push_str(&format!("Best channel: {best}\n"));
        }
        out
    }

    fn csv_header(&self) -> Vec<&'static str> {
        vec![
            "channel",
            "spend",
            "new_customers",
            "cac",
            "ltv",
            "ltv_cac_ratio",
            "payback_months",
            "health",
        ]
    }

    fn csv_rows(&self) -> Vec<Vec<String>> {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
        self.items
            .iter()
            .map(|e| {
                vec![
                    e.channel.channel.clone(),
                    format!("{:.2}", e.channel.spend),
                    e.channel.new_customers.to_string(),
                    opt(e.cac),
                    opt(e.ltv),
                    opt(e.ltv_cac_ratio),
                    opt(e.payback_months),
                    e.health.as_str().to_string(),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, spend: f64, customers: u64) -> Channel {
        Channel {
            channel: name.to_string(),
            spend,
            new_customers: customers,
            monthly_revenue: 100.0,
            gross_margin: 0.8,
            monthly_churn: 0.05,
        }
    }

    #[test]
    fn unit_economics() {
        let e = economics(channel("seo", 10_000.0, 50), &CacConfig::default());
        assert_eq!(e.cac, Some(200.0));
        assert_eq!(e.ltv, Some(1600.0));
        assert_eq!(e.ltv_cac_ratio, Some(8.0));
        assert_eq!(e.payback_months, Some(2.5));
        assert_eq!(e.health, Health::Healthy);
    }

    #[test]
    fn unprofitable_and_marginal() {
        let cfg = CacConfig::default();
        assert_eq!(economics(channel("ads", 100_000.0, 50), &cfg).health, Health::Unprofitable);
        // cac 800 => ratio 2, payback 10
        assert_eq!(economics(channel("events", 40_000.0, 50), &cfg).health, Health::Marginal);
    }

    #[test]
    fn zero_customers_is_unknown() {
        let e = economics(channel("tv", 5_000.0, 0), &CacConfig::default());
        assert!(e.cac.is_none());
        assert_eq!(e.health, Health::Unknown);
    }

    #[test]
    fn blended_and_ordering() {
        let report = analyze(
            vec![
                channel("tv", 5_000.0, 0),
                channel("ads", 100_000.0, 50),
                channel("seo", 10_000.0, 50),
            ],
            &CacConfig::default(),
        )
        .unwrap();
        assert_eq!(report.total_customers, 100);
        assert_eq!(report.blended_cac, Some(1150.0));
        let names: Vec<&str> = report.items.iter().map(|e| e.channel.channel.as_str()).collect();
        assert_eq!(names, vec!["seo", "ads", "tv"]);
        assert_eq!(report.best_channel.as_deref(), Some("seo"));
    }

    #[test]
    fn percent_inputs_normalised() {
        let mut c = channel("seo", 10_000.0, 50);
        c.gross_margin = 80.0;
        c.monthly_churn = 5.0;
        let report = analyze(vec![c], &CacConfig::default()).unwrap();
        assert_eq!(report.items[0].ltv, Some(1600.0));
    }
}
