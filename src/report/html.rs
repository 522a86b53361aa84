use super::Report;
use crate::coverage::Coverage;

pub fn render(report: &Report) -> anyhow::Result<String> {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Data Scrubber Report</title>\n");
    html.push_str("<style>\n");
    html.push_str("  body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #1a1a1a; }\n");
    html.push_str("  h1 { border-bottom: 2px solid #333; padding-bottom: 0.5rem; }\n");
    html.push_str("  table { border-collapse: collapse; width: 100%; margin: 1rem 0; }\n");
    html.push_str("  th, td { border: 1px solid #ddd; padding: 0.5rem; text-align: left; }\n");
    html.push_str("  th { background: #f5f5f5; font-weight: 600; }\n");
    html.push_str("  .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; margin: 1rem 0; }\n");
    html.push_str("  .stat { background: #f5f5f5; padding: 1rem; border-radius: 4px; }\n");
    html.push_str("  .stat .value { font-size: 1.5rem; font-weight: 700; }\n");
    html.push_str("  .stat .label { color: #666; font-size: 0.875rem; }\n");
    html.push_str("  tr.pending td:first-child { font-weight: 600; }\n");
    html.push_str("  tr.service-covered { color: #2e7d32; }\n");
    html.push_str("  tr.manually-completed { color: #b8860b; }\n");
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!(
        "<h1>Data Scrubber Report</h1>\n<p>{} &middot; generated {}</p>\n",
        escape_html(&report.user_name),
        escape_html(&report.generated_at)
    ));

    html.push_str("<div class=\"summary\">\n");
    write_stat(&mut html, "Brokers Tracked", report.summary.total_brokers);
    write_stat(&mut html, "Covered by Services", report.summary.service_covered);
    write_stat(
        &mut html,
        "Completed Manually",
        report.summary.manually_completed,
    );
    write_stat(&mut html, "Still Pending", report.summary.pending);
    html.push_str("</div>\n");

    if !report.brokers.is_empty() {
        html.push_str("<h2>Brokers</h2>\n");
        html.push_str("<table>\n<thead><tr><th>Broker</th><th>State</th><th>Covered By</th><th>Opt-out Link</th></tr></thead>\n<tbody>\n");
        for b in &report.brokers {
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td><a href=\"{}\">{}</a></td></tr>\n",
                b.coverage.label(),
                escape_html(&b.name),
                state_text(b.coverage),
                escape_html(&b.covered_by),
                escape_html(&b.opt_out_link),
                escape_html(&b.opt_out_link),
            ));
        }
        html.push_str("</tbody></table>\n");
    }

    html.push_str("</body>\n</html>\n");

    Ok(html)
}

fn state_text(coverage: Coverage) -> &'static str {
    match coverage {
        Coverage::ServiceCovered => "Covered by service",
        Coverage::ManuallyCompleted => "Completed",
        Coverage::Pending => "Pending",
    }
}

fn write_stat(html: &mut String, label: &str, value: usize) {
    html.push_str(&format!(
        "<div class=\"stat\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>\n"
    ));
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
