use clap::{Args, Parser, Subcommand};
use folio::{
    DataSourceVariant, ExportFormat, ExportSettings, ParameterMap, ReportEngineBuilder, parse_xml,
};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Fill report templates and export them.
#[derive(Parser)]
#[clap(name = "folio", version, about = "Fill report templates and export them as PDF, XML or Office documents")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template from a data file and export it
    Render(RenderArgs),
    /// Compile every template source in a directory into a .compiled artifact
    Recompile {
        dir: PathBuf,
        /// Extension of the files to compile (leading dot optional)
        #[clap(long, default_value = "source")]
        ext: String,
        #[clap(long)]
        recursive: bool,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Path to a .source or .compiled template
    template: PathBuf,

    #[clap(flatten)]
    data: DataArgs,

    /// Extra parameter as key=value; values are read as JSON when they parse
    #[clap(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    #[clap(long, default_value = "pdf")]
    format: ExportFormat,

    #[clap(long)]
    out: PathBuf,

    /// JSON file with xlsx/docx/pptx export settings
    #[clap(long)]
    export_config: Option<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DataArgs {
    /// JSON array of row objects
    #[clap(long)]
    rows: Option<PathBuf>,
    /// XML document; rows are selected by the template's xpath query
    #[clap(long)]
    xml: Option<PathBuf>,
    /// JSON object used as the parameter map, without rows
    #[clap(long)]
    map: Option<PathBuf>,
}

fn parse_param(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn read_json(path: &Path) -> Result<Value, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))?)
}

fn render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let template_dir = args.template.parent().unwrap_or(Path::new("."));
    let identifier = args
        .template
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("invalid template path {}", args.template.display()))?;

    let settings: ExportSettings = match &args.export_config {
        Some(path) => serde_json::from_value(read_json(path)?)?,
        None => ExportSettings::default(),
    };
    let engine = ReportEngineBuilder::new()
        .with_template_dir(template_dir)
        .with_export_settings(settings)
        .build();

    let mut params = ParameterMap::new();
    for (key, value) in args.params {
        params.insert(key, value);
    }

    let source = if let Some(path) = &args.data.rows {
        match read_json(path)? {
            Value::Array(rows) => DataSourceVariant::RowCollection(rows),
            _ => return Err(format!("{} must hold a JSON array of rows", path.display()).into()),
        }
    } else if let Some(path) = &args.data.xml {
        let text = fs::read_to_string(path)?;
        DataSourceVariant::XmlTree(Arc::new(parse_xml(&text)?))
    } else if let Some(path) = &args.data.map {
        match read_json(path)? {
            Value::Object(map) => DataSourceVariant::FlatMap(ParameterMap::from(map)),
            _ => return Err(format!("{} must hold a JSON object", path.display()).into()),
        }
    } else {
        return Err("one of --rows, --xml or --map is required".into());
    };

    let report = engine.generate(identifier, Some(source), params)?;
    engine.export_and_save(&report, args.format, &args.out.to_string_lossy())?;
    println!(
        "Wrote {} ({} pages, {} rows) to {}",
        args.format,
        report.page_count(),
        report.row_count(),
        args.out.display()
    );
    Ok(())
}

fn recompile(dir: &Path, ext: &str, recursive: bool) -> Result<bool, Box<dyn Error>> {
    let engine = ReportEngineBuilder::new().build();
    let summary = engine.recompile_all(dir, ext, recursive)?;
    for outcome in summary.outcomes() {
        match &outcome.result {
            Ok(target) => println!("ok     {} -> {}", outcome.source.display(), target.display()),
            Err(e) => println!("failed {}: {}", outcome.source.display(), e),
        }
    }
    println!("{} of {} templates recompiled", summary.succeeded(), summary.len());
    Ok(summary.is_success())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => render(args).map(|_| true),
        Commands::Recompile { dir, ext, recursive } => recompile(&dir, &ext, recursive),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_reads_the_chosen_data_file() {
        let cli = Cli::try_parse_from([
            "folio", "render", "reports/invoice.source", "--rows", "rows.json", "--param", "year=2024", "--format",
            "xlsx", "--out", "invoice.xlsx",
        ])
        .unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.data.rows, Some(PathBuf::from("rows.json")));
        assert!(args.data.xml.is_none() && args.data.map.is_none());
        assert_eq!(args.format, ExportFormat::Xlsx);
        assert_eq!(args.params, vec![("year".to_string(), serde_json::json!(2024))]);
    }

    #[test]
    fn test_render_takes_exactly_one_data_file() {
        let both = Cli::try_parse_from([
            "folio", "render", "t.source", "--rows", "r.json", "--map", "m.json", "--out", "o.pdf",
        ]);
        assert!(both.is_err());
        let none = Cli::try_parse_from(["folio", "render", "t.source", "--out", "o.pdf"]);
        assert!(none.is_err());
    }
}
