use comfy_table::{Cell, Table};

use super::Report;
use crate::coverage::Coverage;

pub fn render(report: &Report) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!(
        "=== Data Scrubber Report for {} ({}) ===\n\n",
        report.user_name, report.generated_at
    ));

    output.push_str("--- Summary ---\n");
    output.push_str(&format!(
        "Brokers tracked:      {}\n",
        report.summary.total_brokers
    ));
    output.push_str(&format!(
        "  Service-covered:    {}\n",
        report.summary.service_covered
    ));
    output.push_str(&format!(
        "  Manually completed: {}\n",
        report.summary.manually_completed
    ));
    output.push_str(&format!(
        "  Pending:            {}\n",
        report.summary.pending
    ));
    output.push_str(&format!(
        "Progress:             {:.0}%\n",
        report.summary.percent_handled()
    ));
    output.push_str(&format!(
        "Services:             {}\n",
        services_line(report)
    ));

    if !report.brokers.is_empty() {
        output.push_str("\n--- Brokers ---\n");
        let mut table = Table::new();
        table.set_header(vec!["Broker", "State", "Covered By", "Opt-out Link"]);
        for b in &report.brokers {
            table.add_row(vec![
                Cell::new(&b.name),
                Cell::new(marker(b.coverage)),
                Cell::new(if b.covered_by.is_empty() { "-" } else { b.covered_by.as_str() }),
                Cell::new(&b.opt_out_link),
            ]);
        }
        output.push_str(&table.to_string());
        output.push('\n');
    }

    Ok(output)
}

pub fn marker(coverage: Coverage) -> &'static str {
    match coverage {
        Coverage::ServiceCovered => "✅ covered",
        Coverage::ManuallyCompleted => "🟡 done",
        Coverage::Pending => "pending",
    }
}

fn services_line(report: &Report) -> String {
    let all: Vec<&str> = report
        .paid_services
        .iter()
        .chain(&report.free_services)
        .map(String::as_str)
        .collect();
    if all.is_empty() {
        "none".to_string()
    } else {
        all.join(", ")
    }
}
