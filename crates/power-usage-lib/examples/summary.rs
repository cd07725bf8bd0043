use power_usage_calendar::prelude::*;
use power_usage_calendar::TouComponent;
use std::env;

fn print_series(title: &str, series: &ChartSeries) {
    println!("{}", title);
    println!(
        "  {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "", "valley", "peak", "normal", "sharp", "total", "unattributed", "cost"
    );

    for (i, category) in series.categories().iter().enumerate() {
        let flag = if series.balanced()[i] { "" } else { " *" };
        println!(
            "  {:>6} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>12.1} {:>10.2}{}",
            category,
            series.component(TouComponent::Valley)[i],
            series.component(TouComponent::Peak)[i],
            series.component(TouComponent::Normal)[i],
            series.component(TouComponent::Sharp)[i],
            series.total()[i],
            series.unattributed()[i],
            series.cost()[i],
            flag,
        );
    }
    println!();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <attributes.json>", args[0]);
        std::process::exit(1);
    }

    let path = shellexpand::tilde(&args[1]).to_string();
    println!("Loading usage data from: {}", path);

    let mut dashboard = UsageDashboard::new(&EngineConfig::default());
    dashboard.load_file(&path, Utc::now())?;

    if dashboard.is_empty() {
        println!("No usage records found.");
        return Ok(());
    }

    println!("Available years: {:?}", dashboard.available_years());
    println!();

    print_series("=== Yearly ===", &dashboard.yearly_series());

    for &year in dashboard.available_years() {
        print_series(&format!("=== Monthly {} ===", year), &dashboard.monthly_series(year));
    }

    let total = dashboard.total_breakdown();
    println!("=== All years ===");
    for slice in total.slices() {
        println!(
            "  {:<13} {:>10.1} kWh ({:.1}%)",
            slice.kind.name(),
            slice.value,
            total.share(slice) * 100.0
        );
    }
    println!("  Cost: {:.2}", total.cost());
    if !total.reconciliation().is_balanced() {
        println!(
            "  Components under-explain the total by {:.1} kWh",
            total.reconciliation().display_remainder()
        );
    }

    Ok(())
}
