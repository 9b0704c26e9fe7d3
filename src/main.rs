// Interactive report viewer.
//
// [1] loads the JSON summary, [2]-[3] print tables for the current selection,
// [4] exports chart series for the charting front end.
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use log::{error, info};
use once_cell::sync::Lazy;

use finreport::loader;
use finreport::output;
use finreport::reports;
use finreport::series;
use finreport::types::Report;
use finreport::util::{format_amount, format_int, month_name};
use finreport::{Result, Selection, Translator, YearIndex};

#[derive(Parser, Debug)]
#[command(name = "finreport", about = "Monthly financial report viewer")]
struct CliArgs {
    /// Path to the JSON summary
    #[arg(short, long, default_value = "detail.json")]
    input: PathBuf,

    /// Directory for exported chart series
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Currency suffix appended to amounts
    #[arg(short, long, default_value = "zł")]
    currency: String,

    /// Log level (overrides RUST_LOG)
    #[arg(short, long)]
    log_level: Option<String>,
}

struct Loaded {
    report: Report,
    index: YearIndex,
    selection: Selection,
}

static APP_STATE: Lazy<Mutex<Option<Loaded>>> = Lazy::new(|| Mutex::new(None));

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn handle_load(args: &CliArgs) {
    match loader::load_report(&args.input) {
        Ok((report, load_report)) => {
            let index = YearIndex::build(&report.data);
            let Some(selection) = Selection::latest(&index) else {
                println!("The file contains no months.\n");
                return;
            };
            println!(
                "Loaded {} months across {} years ({} .. {}).",
                format_int(load_report.months),
                format_int(load_report.years),
                load_report.first.map(|k| k.to_string()).unwrap_or_default(),
                load_report.last.map(|k| k.to_string()).unwrap_or_default(),
            );
            if load_report.saldo_gaps > 0 {
                println!(
                    "Note: {} months do not carry their closing saldo into the next month.",
                    format_int(load_report.saldo_gaps)
                );
            }
            if let Some(ops) = report.stats.as_ref().and_then(|s| s.operations.as_ref()) {
                println!("Source operations: {}", format_int(ops.all));
            }
            println!();
            let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
            *state = Some(Loaded { report, index, selection });
        }
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

/// Prompt for a year, keeping the current one on empty input.
fn choose_year(loaded: &mut Loaded) -> Result<()> {
    let years: Vec<String> = loaded.index.available_years().iter().map(|y| y.to_string()).collect();
    let input = read_line(&format!("Rok [{}] ({}): ", loaded.selection.year, years.join(", ")));
    if input.is_empty() {
        return Ok(());
    }
    match input.parse::<i32>() {
        Ok(year) => {
            loaded.selection = loaded.selection.with_year(&loaded.index, year)?;
        }
        Err(_) => println!("Not a year: {}", input),
    }
    Ok(())
}

fn choose_month(loaded: &mut Loaded) -> Result<()> {
    let months: Vec<String> = loaded
        .index
        .months(loaded.selection.year)?
        .iter()
        .map(|m| format!("{:02}", m))
        .collect();
    let input = read_line(&format!(
        "Miesiąc [{:02}.{}] ({}): ",
        loaded.selection.month,
        loaded.selection.year,
        months.join(", ")
    ));
    if input.is_empty() {
        return Ok(());
    }
    match input.parse::<u32>() {
        Ok(month) => {
            loaded.selection = loaded.selection.with_month(&loaded.index, month)?;
        }
        Err(_) => println!("Not a month: {}", input),
    }
    Ok(())
}

fn handle_year_summary(loaded: &mut Loaded, args: &CliArgs) -> Result<()> {
    choose_year(loaded)?;
    let t = Translator::new(&loaded.report.legend);
    let table = reports::generate_year_summary(
        &loaded.report.data,
        &loaded.index,
        loaded.selection.year,
        &t,
        &args.currency,
    )?;
    output::preview_table(&table);
    Ok(())
}

fn handle_month_breakdown(loaded: &mut Loaded, args: &CliArgs) -> Result<()> {
    choose_month(loaded)?;
    let key = loaded.selection.key();
    let data = &loaded.report.data;
    let t = Translator::new(&loaded.report.legend);

    output::preview_table(&reports::generate_costs_table(data, key, &t, &args.currency)?);
    output::preview_table(&reports::generate_income_table(data, key, &t, &args.currency)?);

    if let Some(record) = data.get(&key) {
        let name = month_name(key.month);
        let itemised = [
            (format!("Wpływy opisane ({})", name), &record.income_described),
            (format!("Wydatki opisane ({})", name), &record.costs_described),
        ];
        for (caption, entries) in itemised {
            if let Some(table) = reports::generate_described_table(&caption, entries, &t, &args.currency) {
                output::preview_table(&table);
            }
        }

        let breakdown = series::build_category_breakdown(record, &t);
        println!("Pie breakdown:");
        for (kind, items) in [("income", &breakdown.income), ("cost", &breakdown.cost)] {
            for item in items {
                println!("  {:<6} {:<28} {}", kind, item.name, format_amount(item.value, &args.currency));
            }
        }
        println!(
            "Month total: {} in, {} out\n",
            format_amount(record.income_total(), &args.currency),
            format_amount(-record.cost_total(), &args.currency)
        );
    }
    Ok(())
}

fn handle_export(loaded: &Loaded, args: &CliArgs) -> Result<()> {
    let data = &loaded.report.data;
    let index = &loaded.index;
    let t = Translator::new(&loaded.report.legend);
    let year = loaded.selection.year;
    std::fs::create_dir_all(&args.out_dir)?;

    let year_series = series::build_year_series(data, index, year, &t)?;
    let year_file = args.out_dir.join(format!("series_{}.csv", year));
    output::write_series_csv(&year_file, &year_series)?;
    output::write_json(args.out_dir.join(format!("series_{}.json", year)), &year_series)?;

    let full = series::build_full_series(data, index, &t)?;
    output::write_series_csv(args.out_dir.join("series_all.csv"), &full)?;
    output::write_json(args.out_dir.join("series_all.json"), &full)?;

    let plot = series::build_balance_plot(data, index)?;
    output::write_csv(args.out_dir.join("balance_plot.csv"), &plot)?;

    if let Some(record) = data.get(&loaded.selection.key()) {
        let breakdown = series::build_category_breakdown(record, &t);
        output::write_json(
            args.out_dir.join(format!("breakdown_{}.json", loaded.selection.key())),
            &breakdown,
        )?;
    }

    info!("exported series to {}", args.out_dir.display());
    println!(
        "Exported {} months for {}, {} months overall, {} plot points to {}\n",
        year_series.len(),
        year,
        full.len(),
        plot.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn with_loaded<F>(f: F)
where
    F: FnOnce(&mut Loaded) -> Result<()>,
{
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    let Some(loaded) = state.as_mut() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    if let Err(e) = f(loaded) {
        error!("{}", e);
        eprintln!("Error: {}\n", e);
    }
}

fn main() {
    let args = CliArgs::parse();
    match &args.log_level {
        Some(level) => env_logger::Builder::new().parse_filters(level).init(),
        None => env_logger::init_from_env(env_logger::Env::new().default_filter_or("info")),
    }

    loop {
        println!("Monthly Financial Report");
        println!("[1] Load the file");
        println!("[2] Yearly summary");
        println!("[3] Monthly breakdown");
        println!("[4] Export chart series");
        println!("[5] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(&args),
            "2" => with_loaded(|l| handle_year_summary(l, &args)),
            "3" => with_loaded(|l| handle_month_breakdown(l, &args)),
            "4" => with_loaded(|l| handle_export(l, &args)),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}
