use anyhow::Result;
use osdash_core::FilterOptions;
use osdash_report::Summary;
use serde::Serialize;

/// JSON shape handed to external consumers: the summary plus the filter
/// selector values.
#[derive(Serialize)]
struct Output<'a> {
    summary: &'a Summary,
    filter_options: &'a FilterOptions,
}

pub fn json(summary: &Summary, options: &FilterOptions) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Output {
        summary,
        filter_options: options,
    })?);
    Ok(())
}

pub fn filter_options(options: &FilterOptions) {
    println!("Situações: {}", options.statuses.join(", "));
    println!("Marcas:    {}", options.brands.join(", "));
    println!("Origens:   {}", options.origins.join(", "));
}

pub fn text(summary: &Summary, total_records: usize, limit: usize) {
    println!("════════════════════════════════════════");
    println!(" Painel de O.S.");
    println!("════════════════════════════════════════");
    println!(
        " {} registros filtrados | Total no arquivo: {}",
        summary.filtered.len(),
        total_records
    );
    println!();
    println!(" Faturamento:    {}", summary.total_revenue);
    println!(" Custo:          {}", summary.total_cost);
    println!(" Lucro líquido:  {}", summary.net_profit);
    println!(" Ordens:         {}", summary.count);
    println!(
        " Concretizadas:  {} ({}%)",
        summary.completed_count,
        if summary.count > 0 {
            summary.completed_count * 100 / summary.count
        } else {
            0
        }
    );
    println!(" Ticket médio:   {}", summary.avg_ticket);
    println!(" Margem:         {}%", summary.margin_percent);

    if !summary.monthly.is_empty() {
        println!();
        println!(" Performance mensal");
        println!(" ──────────────────");
        for m in &summary.monthly {
            println!(
                "  {:<8} {:>5} O.S.  {:>14}  ticket {}",
                m.label, m.count, m.revenue.to_string(), m.avg_ticket
            );
        }
    }

    if !summary.daily.is_empty() {
        println!();
        println!(" Faturamento diário");
        println!(" ──────────────────");
        for d in &summary.daily {
            println!(
                "  {:<12} {:>4} O.S.  {:>14}",
                d.display_date, d.count, d.revenue.to_string()
            );
        }
    }

    breakdown_section("Situação", &summary.by_status);
    breakdown_section("Top marcas", &summary.by_brand);
    breakdown_section("Origem", &summary.by_origin);

    if !summary.filtered.is_empty() {
        println!();
        println!(" Registros (primeiros {})", limit.min(summary.filtered.len()));
        println!(" ───────────────────────");
        for o in summary.filtered.iter().take(limit) {
            println!(
                "  {:<12} {:<24} {:<20} {:<16} {}",
                o.raw_date,
                truncate(&o.client, 24),
                truncate(&o.equipment, 20),
                truncate(&o.status, 16),
                o.total_value
            );
        }
    }
}

fn breakdown_section(title: &str, entries: &[osdash_report::BreakdownEntry]) {
    if entries.is_empty() {
        return;
    }
    println!();
    println!(" {title}");
    println!(" ──────────");
    for e in entries {
        println!("  {:<24} {:>5}", truncate(&e.label, 24), e.count);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
