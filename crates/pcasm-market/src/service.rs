//! Build engine backed by live Yandex Market offers.

use async_trait::async_trait;
use tracing::{error, info};

use pcasm_core::{
    engine::{BuildEngine, BuildReport, ReportComponent},
    errors::Error,
    formatting::{convert_usd_to_rub, round_cents},
    goals::Goal,
    Result,
};

use crate::{
    client::YandexMarketClient,
    models::{ComponentKind, ComponentRecommendation, PcBuild},
};

const MAX_RECOMMENDATIONS: usize = 5;

pub struct MarketAssembler {
    client: YandexMarketClient,
    usd_rub_rate: f64,
}

impl MarketAssembler {
    pub fn new(client: YandexMarketClient, usd_rub_rate: f64) -> Self {
        Self {
            client,
            usd_rub_rate,
        }
    }

    fn to_rub(&self, usd: u32) -> u64 {
        convert_usd_to_rub(f64::from(usd), self.usd_rub_rate).round() as u64
    }

    pub async fn create_pc_build(&self, budget_usd: u32, goal: Goal) -> Result<PcBuild> {
        let budget_rub = self.to_rub(budget_usd);
        self.client
            .generate_pc_build(budget_rub, goal, self.usd_rub_rate)
            .await
            .map_err(|e| {
                error!("Error creating PC build: {e}");
                e
            })
    }

    /// Up to five offers of one kind within the whole budget.
    pub async fn get_component_recommendations(
        &self,
        kind_key: &str,
        budget_usd: u32,
        goal: Goal,
    ) -> Result<ComponentRecommendation> {
        let kind = ComponentKind::from_key(kind_key).ok_or_else(|| {
            Error::InvalidInput(format!("Unsupported component type: {kind_key}"))
        })?;

        let mut found = self
            .client
            .list_components(kind, None, Some(self.to_rub(budget_usd)), None)
            .await?;
        found.truncate(MAX_RECOMMENDATIONS);

        Ok(ComponentRecommendation {
            kind,
            budget_usd,
            goal,
            recommendations: found,
        })
    }

    fn report(&self, build: &PcBuild, budget_usd: u32) -> BuildReport {
        let components = build
            .components
            .iter()
            .map(|c| ReportComponent {
                label: c.kind.category().label_ru().to_string(),
                name: c.name.clone(),
                price_usd: build.to_usd(c.price),
                price_rub: round_cents(c.price),
                details: c.specs.details(),
                url: Some(c.url.clone()).filter(|u| !u.is_empty()),
            })
            .collect();

        let total_usd = build.total_price_usd();
        BuildReport {
            goal: build.goal,
            budget_usd,
            components,
            total_usd,
            total_rub: round_cents(build.total_price_rub()),
            remaining_usd: round_cents(f64::from(budget_usd) - total_usd),
        }
    }
}

#[async_trait]
impl BuildEngine for MarketAssembler {
    async fn build(&self, budget_usd: u32, goal: Goal) -> Result<BuildReport> {
        let build = self.create_pc_build(budget_usd, goal).await?;
        if build.components.is_empty() {
            return Err(Error::External(
                "Yandex Market returned no components for this budget".to_string(),
            ));
        }
        info!(
            "Market build for ${budget_usd} ({goal}): {} parts, {:.2} RUB",
            build.components.len(),
            build.total_price_rub()
        );
        Ok(self.report(&build, budget_usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pcasm_core::config::MarketConfig;

    fn assembler() -> MarketAssembler {
        let client = YandexMarketClient::new(&MarketConfig {
            api_key: String::new(),
            oauth_token: String::new(),
            base_url: "https://api.market.yandex.ru/".to_string(),
            mock_mode: true,
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        MarketAssembler::new(client, 75.0)
    }

    #[tokio::test]
    async fn create_pc_build_converts_budget_to_rub() {
        let build = assembler().create_pc_build(1000, Goal::Games).await.unwrap();
        assert_eq!(build.budget_rub, 75_000);
        assert_eq!(build.budget_usd, 1000);
        assert_eq!(build.goal, Goal::Games);
        assert!(build.component(ComponentKind::Cpu).is_some());
    }

    #[tokio::test]
    async fn recommendations_reject_unknown_kinds() {
        let err = assembler()
            .get_component_recommendations("fan", 500, Goal::Office)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("fan")));

        let rec = assembler()
            .get_component_recommendations("psu", 500, Goal::Office)
            .await;
        assert!(rec.is_err());
    }

    #[tokio::test]
    async fn recommendations_are_capped() {
        let rec = assembler()
            .get_component_recommendations("power_supply", 500, Goal::Office)
            .await
            .unwrap();
        assert_eq!(rec.kind, ComponentKind::PowerSupply);
        assert!(rec.recommendations.len() <= MAX_RECOMMENDATIONS);
        assert_eq!(rec.recommendations[0].name, "Corsair RM750x");
    }

    #[tokio::test]
    async fn engine_report_has_links_and_totals() {
        let report = assembler().build(2000, Goal::Universal).await.unwrap();
        assert_eq!(report.components.len(), 7);
        assert_eq!(report.components[0].label, "Процессор");
        assert_eq!(
            report.components[0].url.as_deref(),
            Some("https://market.yandex.ru/product/cpu1")
        );
        assert_eq!(report.total_rub, 150_000.0);
        assert_eq!(report.total_usd, 2000.0);
        assert_eq!(report.remaining_usd, 0.0);
    }
}
