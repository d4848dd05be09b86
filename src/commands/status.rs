//! `pcsync status` - show the primitives the CIB holds.

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use pcskit::Primitive;

use super::{client, explain, load_manifest, shadow};
use crate::Context;
use crate::cli::StatusArgs;
use crate::progress;
use crate::ui;

pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let manifest = load_manifest(ctx, false)?;
    let client = client(ctx, &manifest);
    let cib = shadow(ctx, &manifest);

    let pb = progress::spinner("Reading CIB...");
    let primitives = client.discover(cib.as_deref());
    pb.finish_and_clear();
    let primitives = primitives.map_err(explain)?;

    if args.json {
        let json = serde_json::to_string_pretty(&primitives)
            .context("Failed to serialize primitives")?;
        println!("{json}");
        return Ok(());
    }

    ui::header(&match &cib {
        Some(shadow) => format!("Primitives (shadow CIB {shadow})"),
        None => "Primitives".to_string(),
    });

    if primitives.is_empty() {
        ui::info("No primitives configured");
        return Ok(());
    }

    let declared: Vec<&str> = manifest.primitives.iter().map(|s| s.name.as_str()).collect();
    for primitive in &primitives {
        print_primitive(primitive, declared.contains(&primitive.name.as_str()), ctx.verbose > 0);
    }

    println!();
    ui::dim(&format!("{} primitive(s)", primitives.len()));
    Ok(())
}

fn print_primitive(primitive: &Primitive, declared: bool, detailed: bool) {
    let marker = if declared { "●".green() } else { "○".dimmed() };
    let wrapper = if primitive.promotable {
        format!(" in {}", primitive.master_id()).cyan().to_string()
    } else {
        String::new()
    };
    println!(
        "{} {} {}{}",
        marker,
        primitive.name.bold(),
        primitive.descriptor.to_string().dimmed(),
        wrapper
    );

    if !detailed {
        return;
    }
    for (key, value) in &primitive.parameters {
        ui::kv(key, value);
    }
    for (name, fields) in &primitive.operations {
        let fields: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
        ui::kv(&format!("op {name}"), &fields.join(" "));
    }
    for (key, value) in &primitive.utilization {
        ui::kv(&format!("utilization {key}"), value);
    }
    for (key, value) in &primitive.metadata {
        ui::kv(&format!("meta {key}"), value);
    }
}
