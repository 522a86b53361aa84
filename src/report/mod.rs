pub mod html;
pub mod terminal;

use serde::Serialize;

use crate::coverage::Coverage;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Html,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub user_name: String,
    pub paid_services: Vec<String>,
    pub free_services: Vec<String>,
    pub brokers: Vec<ReportEntry>,
    pub summary: ReportSummary,
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub opt_out_link: String,
    pub covered_by: String,
    pub status: String,
    pub coverage: Coverage,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub total_brokers: usize,
    pub service_covered: usize,
    pub manually_completed: usize,
    pub pending: usize,
}

impl ReportSummary {
    /// Share of brokers no longer needing action, in percent.
    pub fn percent_handled(&self) -> f64 {
        if self.total_brokers == 0 {
            return 100.0;
        }
        let handled = self.service_covered + self.manually_completed;
        handled as f64 * 100.0 / self.total_brokers as f64
    }
}

impl Report {
    /// Pending brokers first, then everything already handled.
    pub fn build(session: &Session) -> Self {
        let partition = session.partition();
        let summary = ReportSummary {
            total_brokers: partition.len(),
            service_covered: partition.service_covered.len(),
            manually_completed: partition.manually_completed.len(),
            pending: partition.pending.len(),
        };

        let brokers = session
            .pending()
            .into_iter()
            .chain(session.handled())
            .map(|l| ReportEntry {
                name: l.record.name.clone(),
                opt_out_link: l.record.opt_out_link.clone(),
                covered_by: l.record.covered_by.to_string(),
                status: l.record.status.to_string(),
                coverage: l.coverage,
            })
            .collect();

        let services = session.services();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            user_name: session.user_name().to_string(),
            paid_services: services.paid_services.clone(),
            free_services: services.free_services.clone(),
            brokers,
            summary,
        }
    }

    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Terminal => terminal::render(self),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Html => html::render(self),
        }
    }
}
