// File: crates/demo/src/main.rs
// Summary: Demo loads a material or ship CSV log, builds one chart and writes its table + option JSON.

use anyhow::{Context as _, Result};
use logbook_core::period::parse_timestamp;
use logbook_core::{render, Attribute, ChartKind, Configuration, Context, Directive, DomainRules, Relation, Value};
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: logbook-demo <log.csv> <chart> <kind> [option] [config.json]";

fn main() -> Result<()> {
    // e.g. `assets/materials.csv candlestick Fuel Daily` or `assets/ships.csv bubble Levels`
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, chart, kind) = match &args[..] {
        [input, chart, kind, ..] => (PathBuf::from(input), chart.as_str(), kind.as_str()),
        _ => anyhow::bail!(USAGE),
    };
    let option = args.get(3).filter(|o| !o.ends_with(".json")).map(String::as_str);
    let config_path = args
        .iter()
        .skip(3)
        .find(|a| a.ends_with(".json"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config.json")));

    let chart_kind: ChartKind = chart.parse()?;
    let directive = Directive::new(kind, option);
    println!("Using input file: {}", input.display());
    println!("Using configuration: {}", config_path.display());

    let text = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read configuration '{}'", config_path.display()))?;
    let configuration = Configuration::from_json_str(&text)?;
    let rules = DomainRules::default();

    let relation = load_log_csv(&input).with_context(|| format!("failed to load CSV '{}'", input.display()))?;
    println!("Loaded {} tuples with attributes {:?}", relation.count(), relation.attribute_names());

    let rendering = render(&relation, chart_kind, directive.clone(), Context::new(&configuration, &rules))
        .with_context(|| format!("failed to build {chart_kind} chart for {directive}"))?;
    println!("Built '{}' with {} rows", rendering.option.title, rendering.table.rows.len());

    let out = out_name_with(&input, chart_kind, &directive)?;
    std::fs::write(&out, serde_json::to_string_pretty(&rendering)?)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}

/// Output file name like target/out/<stem>_<chart>_<kind>[_<option>].json
fn out_name_with(input: &Path, chart: ChartKind, directive: &Directive) -> Result<PathBuf> {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
    let mut out = PathBuf::from("target/out");
    std::fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
    let mut name = format!("{stem}_{}_{}", chart.name().to_lowercase(), directive.kind);
    if let Some(option) = &directive.option {
        name.push('_');
        name.push_str(option);
    }
    out.push(format!("{name}.json"));
    Ok(out)
}

/// Load a CSV whose headers are attribute names (`DateTime`, `Fuel`, `Id`, `Level`, ...).
/// Empty cells become nulls.
fn load_log_csv(path: &Path) -> Result<Relation> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let attributes = rdr
        .headers()?
        .iter()
        .map(|h| Attribute::from_name(h).with_context(|| format!("unknown column '{h}'")))
        .collect::<Result<Vec<_>>>()?;

    let mut tuples = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let tuple = attributes
            .iter()
            .zip(rec.iter())
            .map(|(attribute, cell)| parse_cell(*attribute, cell))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("record {}", line + 1))?;
        tuples.push(tuple);
    }
    Ok(Relation::new(attributes, tuples)?)
}

fn parse_cell(attribute: Attribute, cell: &str) -> Result<Value> {
    if cell.is_empty() {
        return Ok(Value::Null);
    }
    Ok(match attribute {
        Attribute::DateTime => Value::DateTime(parse_timestamp(cell)?),
        Attribute::Name | Attribute::Classification => Value::from(cell),
        _ => {
            let number: f64 = cell.parse().with_context(|| format!("{attribute}: '{cell}' is not a number"))?;
            anyhow::ensure!(number.is_finite(), "{attribute}: '{cell}' is not a finite number");
            Value::Number(number)
        }
    })
}
