//! Command implementations for the CLI

use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::app::models::geometry::Geometry;
use crate::app::models::Feature;
use crate::app::services::layer::LayerSchema;
use crate::cli::args::{Args, Commands, DumpArgs, InfoArgs, OutputFormat, ScanArgs};
use crate::{DatConfig, DataSource, Error, Result};

/// Dispatch the parsed command line
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Info(info) => run_info(info),
        Commands::Dump(dump) => run_dump(dump),
        Commands::Scan(scan) => run_scan(scan),
    }
}

fn run_info(args: InfoArgs) -> Result<()> {
    let mut source = DataSource::open(&args.file, DatConfig::default())?;

    println!(
        "{} {} ({} format)",
        "File:".bold(),
        args.file.display(),
        source.format()
    );

    let layers = source.layers()?;
    let name_width = layers.iter().map(|l| l.name().len()).max().unwrap_or(0);
    println!("{}", "Layers:".bold());
    for layer in layers {
        let count = layer.len();
        let count_text = if count == 0 {
            count.to_string().dimmed().to_string()
        } else {
            count.to_string().green().to_string()
        };
        println!("  {:width$}  {}", layer.name(), count_text, width = name_width);
    }

    let stats = source.stats();
    println!(
        "{} {} records, {} parsed, {} skipped, {} unknown codes",
        "Parse:".bold(),
        stats.records_read,
        stats.records_parsed,
        stats.records_skipped,
        stats.unknown_codes
    );
    Ok(())
}

fn geometry_summary(geometry: Option<&Geometry>) -> String {
    match geometry {
        None => "-".to_string(),
        Some(Geometry::Point(p)) => format!("POINT({:.6} {:.6})", p.lon, p.lat),
        Some(Geometry::Line(l)) => format!("LINESTRING[{} pts]", l.len()),
        Some(Geometry::Polygon(p)) => format!(
            "POLYGON[{} pts, {} holes]",
            p.exterior.len(),
            p.interiors.len()
        ),
        Some(Geometry::MultiLine(ml)) => format!("MULTILINESTRING[{} parts]", ml.len()),
        Some(Geometry::MultiPolygon(mp)) => format!("MULTIPOLYGON[{} parts]", mp.len()),
    }
}

fn print_feature_text(schema: &LayerSchema, feature: &Feature) {
    let fields: Vec<String> = schema
        .fields
        .iter()
        .zip(feature.values())
        .map(|(defn, value)| format!("{}={}", defn.name, value))
        .collect();
    println!(
        "{}[{}] {} {}",
        schema.name,
        feature.fid(),
        fields.join(" "),
        geometry_summary(feature.geometry()).dimmed()
    );
}

fn print_feature_json(schema: &LayerSchema, feature: &Feature) -> Result<()> {
    let mut properties = serde_json::Map::new();
    for (defn, value) in schema.fields.iter().zip(feature.values()) {
        properties.insert(defn.name.to_string(), json!(value));
    }
    let object = json!({
        "layer": schema.name,
        "fid": feature.fid(),
        "properties": properties,
        "geometry": feature.geometry(),
    });
    let line = serde_json::to_string(&object)
        .map_err(|e| Error::serialization("failed to encode feature", e))?;
    println!("{}", line);
    Ok(())
}

fn print_feature(format: OutputFormat, schema: &LayerSchema, feature: &Feature) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_feature_text(schema, feature);
            Ok(())
        }
        OutputFormat::Json => print_feature_json(schema, feature),
    }
}

fn run_dump(args: DumpArgs) -> Result<()> {
    if args.streaming {
        let layer_name = args.layer.as_deref().ok_or_else(|| {
            Error::invalid_state("--streaming requires --layer (streams are per layer)")
        })?;
        let mut source = DataSource::open(&args.file, DatConfig::default().with_streaming())?;
        let stream = source.open_stream(layer_name)?;
        let schema = stream.schema();
        for feature in stream {
            print_feature(args.format, schema, &feature?)?;
        }
        return Ok(());
    }

    let mut source = DataSource::open(&args.file, DatConfig::default())?;
    if let Some(wanted) = &args.layer {
        if !source.layer_names().contains(&wanted.as_str()) {
            return Err(Error::unknown_layer(wanted.clone()));
        }
    }
    for layer in source.layers()? {
        if let Some(wanted) = &args.layer {
            if layer.name() != wanted {
                continue;
            }
        }
        for feature in layer.features() {
            print_feature(args.format, layer.schema(), feature)?;
        }
    }
    Ok(())
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let pattern = args.directory.join("*.dat");
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern)
        .map_err(|e| Error::invalid_state(format!("bad scan pattern '{}': {}", pattern, e)))?;

    let mut recognized = 0usize;
    let mut rejected = 0usize;
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        match DataSource::open(&path, DatConfig::default()) {
            Ok(source) => {
                recognized += 1;
                println!(
                    "{}  {} ({} format)",
                    "ok".green().bold(),
                    path.display(),
                    source.format()
                );
            }
            Err(Error::UnrecognizedFormat { message, .. }) => {
                rejected += 1;
                println!("{}  {}: {}", "--".dimmed(), path.display(), message.dimmed());
            }
            Err(e) => return Err(e),
        }
    }

    println!(
        "\n{} {} recognized, {} rejected",
        "Scan:".bold(),
        recognized,
        rejected
    );
    Ok(())
}
