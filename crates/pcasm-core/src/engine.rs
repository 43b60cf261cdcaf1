//! Build engine port plus the offline dataset implementation.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::{
    catalog::{Catalog, Category},
    errors::Error,
    formatting::{convert_usd_to_rub, round_cents},
    goals::Goal,
    optimizer::{self, BuildPlan, SelectedComponent},
    Result,
};

/// Assembles a configuration for a budget (in USD) and a goal.
#[async_trait]
pub trait BuildEngine: Send + Sync {
    async fn build(&self, budget_usd: u32, goal: Goal) -> Result<BuildReport>;
}

/// Engine-neutral description of a finished build, ready for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport {
    pub goal: Goal,
    pub budget_usd: u32,
    pub components: Vec<ReportComponent>,
    pub total_usd: f64,
    pub total_rub: f64,
    pub remaining_usd: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportComponent {
    /// Russian category label ("Процессор", ...).
    pub label: String,
    pub name: String,
    pub price_usd: f64,
    pub price_rub: f64,
    /// Extra spec lines as `(label, value)`.
    pub details: Vec<(String, String)>,
    pub url: Option<String>,
}

/// Offline engine: parts dataset + knapsack optimizer.
pub struct DatasetEngine {
    data_dir: PathBuf,
    usd_rub_rate: f64,
    catalog: OnceCell<Arc<Catalog>>,
}

impl DatasetEngine {
    pub fn new(data_dir: impl Into<PathBuf>, usd_rub_rate: f64) -> Self {
        Self {
            data_dir: data_dir.into(),
            usd_rub_rate,
            catalog: OnceCell::new(),
        }
    }

    /// Engine over an already loaded catalog.
    pub fn with_catalog(catalog: Catalog, usd_rub_rate: f64) -> Self {
        Self {
            data_dir: PathBuf::new(),
            usd_rub_rate,
            catalog: OnceCell::new_with(Some(Arc::new(catalog))),
        }
    }

    async fn catalog(&self) -> Result<Arc<Catalog>> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                let dir = self.data_dir.clone();
                info!("Loading component data from {}", dir.display());
                let loaded = tokio::task::spawn_blocking(move || Catalog::load(&dir))
                    .await
                    .map_err(|e| Error::External(format!("catalog loader failed: {e}")))??;
                Ok::<_, Error>(Arc::new(loaded))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    fn report(&self, plan: &BuildPlan, budget_usd: u32) -> BuildReport {
        let components = plan
            .components
            .iter()
            .map(|c| ReportComponent {
                label: c.category.label_ru().to_string(),
                name: c.name.clone(),
                price_usd: c.price,
                price_rub: round_cents(convert_usd_to_rub(c.price, self.usd_rub_rate)),
                details: component_details(c),
                url: None,
            })
            .collect();

        BuildReport {
            goal: plan.goal,
            budget_usd,
            components,
            total_usd: plan.total_price,
            total_rub: round_cents(convert_usd_to_rub(plan.total_price, self.usd_rub_rate)),
            remaining_usd: plan.remaining_budget,
        }
    }
}

#[async_trait]
impl BuildEngine for DatasetEngine {
    async fn build(&self, budget_usd: u32, goal: Goal) -> Result<BuildReport> {
        let catalog = self.catalog().await?;
        let plan = optimizer::optimize(catalog, f64::from(budget_usd), goal).await?;
        info!(
            "Built {goal} configuration for ${budget_usd}: {} parts, ${:.2}",
            plan.components.len(),
            plan.total_price
        );
        Ok(self.report(&plan, budget_usd))
    }
}

fn component_details(c: &SelectedComponent) -> Vec<(String, String)> {
    let part = &c.part;
    let mut out = Vec::new();
    let mut push = |label: &str, value: String| out.push((label.to_string(), value));

    match c.category {
        Category::Cpu => {
            if let Some(cores) = part.text("core_count") {
                push("Ядра", cores);
            }
            if let Some(boost) = part.text("boost_clock") {
                push("Частота (Boost)", format!("{boost} GHz"));
            }
        }
        Category::Memory => {
            if let Some(m) = part.list("modules").filter(|m| m.len() >= 2) {
                push("Конфигурация", format!("{} x {}GB", plain(&m[0]), plain(&m[1])));
            }
            if let Some(s) = part.list("speed").filter(|s| s.len() >= 2) {
                push("Частота", format!("{} MHz", plain(&s[1])));
            }
        }
        Category::VideoCard => {
            if let Some(memory) = part.text("memory") {
                push("Видеопамять", format!("{memory} GB"));
            }
            if let Some(chipset) = part.text("chipset") {
                push("Чипсет", chipset);
            }
        }
        _ => {}
    }
    out
}

fn plain(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::tests::sample_catalog;

    #[tokio::test]
    async fn dataset_engine_builds_a_report() {
        let engine = DatasetEngine::with_catalog(sample_catalog(), 100.0);
        let report = engine.build(1000, Goal::Games).await.unwrap();

        assert_eq!(report.goal, Goal::Games);
        assert_eq!(report.budget_usd, 1000);
        assert_eq!(report.components.len(), 7);
        assert!(report.total_usd <= 1000.0);
        assert!((report.total_rub - report.total_usd * 100.0).abs() < 0.01);
        assert!((report.remaining_usd - (1000.0 - report.total_usd)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn reports_cpu_memory_and_gpu_details() {
        let engine = DatasetEngine::with_catalog(sample_catalog(), 75.0);
        let report = engine.build(1800, Goal::Games).await.unwrap();

        let cpu = report
            .components
            .iter()
            .find(|c| c.label == "Процессор")
            .unwrap();
        assert_eq!(cpu.details[0].0, "Ядра");
        assert!(cpu.details[1].1.ends_with(" GHz"));

        let memory = report
            .components
            .iter()
            .find(|c| c.label == "Оперативная память")
            .unwrap();
        assert!(memory.details[0].1.contains(" x "));
        assert!(memory.details[1].1.ends_with(" MHz"));

        let gpu = report
            .components
            .iter()
            .find(|c| c.label == "Видеокарта")
            .unwrap();
        assert!(gpu.details.iter().any(|(l, _)| l == "Чипсет"));
    }

    #[tokio::test]
    async fn missing_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = DatasetEngine::new(dir.path(), 75.0);
        let err = engine.build(1000, Goal::Office).await.unwrap_err();
        assert!(matches!(err, Error::Dataset { .. }));
    }

    #[test]
    fn memory_details_use_raw_values() {
        let part = crate::catalog::Part::new("kit", Some(50.0))
            .with("modules", serde_json::json!([2, 16]))
            .with("speed", serde_json::json!([5, 6000]));
        let c = SelectedComponent {
            category: Category::Memory,
            name: part.name.clone(),
            price: 50.0,
            utility: 1.0,
            budget_percentage: 5.0,
            recommended_percentage: 10.0,
            part,
        };
        assert_eq!(
            component_details(&c),
            vec![
                ("Конфигурация".to_string(), "2 x 16GB".to_string()),
                ("Частота".to_string(), "6000 MHz".to_string()),
            ]
        );
    }
}
