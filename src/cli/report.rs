use std::path::Path;

use crate::error::AppError;
use crate::report::{Report, ReportFormat};
use crate::session::Session;

pub fn generate_report(
    session: &Session,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let report = Report::build(session);
    let rendered = report.render(format)?;

    let Some(path) = output else {
        println!("{rendered}");
        return Ok(());
    };

    std::fs::write(path, &rendered).map_err(|e| AppError::from_write(path, e))?;
    println!(
        "Report for {} broker(s) written to {}",
        report.summary.total_brokers,
        path.display()
    );
    Ok(())
}
