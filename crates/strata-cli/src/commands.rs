use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use strata_catalog::Catalog;
use strata_collection::{
    AccountId, Collection, CollectionManifest, ErrorKind, FixedEnvironment, InMemoryBlobStore,
    ItemId,
};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Validate(args) => cmd_validate(args, cli.format),
        Command::Simulate(args) => cmd_simulate(args, cli.format),
        Command::Render(args) => cmd_render(args, cli.format),
    }
}

fn operator() -> AccountId {
    AccountId::derive("strata-cli")
}

fn open(path: &Path, seed: u64) -> anyhow::Result<Collection> {
    let manifest = CollectionManifest::load(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let collection = manifest
        .build(
            operator(),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(FixedEnvironment::from_seed(seed)),
        )
        .with_context(|| format!("applying manifest {}", path.display()))?;
    Ok(collection)
}

/// Create `count` items for the CLI operator, `batch` at a time.
fn mint(collection: &mut Collection, count: u64, batch: u64) -> anyhow::Result<()> {
    let op = operator();
    let batch = batch.max(1);
    let mut left = count;
    while left > 0 {
        let take = batch.min(left);
        collection.on_create(&op, &op, take)?;
        left -= take;
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let collection = open(&args.manifest, 1)?;
    let catalog = collection.catalog();
    let capacity = collection.state().capacity();
    let shortfalls = catalog.weight_shortfalls(capacity);

    match format {
        OutputFormat::Json => {
            let layers: Vec<_> = catalog
                .layers()
                .iter()
                .map(|layer| {
                    json!({
                        "name": layer.name,
                        "prime": layer.selection_prime,
                        "traits": layer.trait_count(),
                        "total_weight": layer.total_weight().to_string(),
                    })
                })
                .collect();
            let links: Vec<_> = catalog
                .links()
                .iter()
                .map(|(from, rule)| json!({ "from": from.to_string(), "to": rule.target().to_string() }))
                .collect();
            let report = json!({
                "capacity": capacity,
                "layers": layers,
                "links": links,
                "shortfalls": shortfalls.iter().map(|s| s.layer).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "{} ({} items, {} layers)",
                collection.config().name.bold(),
                capacity,
                catalog.layer_count()
            );
            for (index, layer) in catalog.layers().iter().enumerate() {
                let total = layer.total_weight();
                let mark = if total >= u128::from(capacity) {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!(
                    "  {} {} {}  prime {}, {} traits, weight {}",
                    mark,
                    index.to_string().dimmed(),
                    layer.name.bold(),
                    layer.selection_prime,
                    layer.trait_count(),
                    total
                );
                for unreachable in unreachable_traits(catalog, index) {
                    println!("      {} {} can never be picked", "!".yellow(), unreachable);
                }
            }
            for (from, rule) in catalog.links() {
                println!("  link {} → {}", from.to_string().cyan(), rule.target().to_string().cyan());
            }
        }
    }

    if let Some(first) = shortfalls.first() {
        bail!(
            "{} layer(s) undersum the identifier space; first is layer {} ({}): {} < {}",
            shortfalls.len(),
            first.layer,
            first.name,
            first.total,
            first.required
        );
    }
    if format == OutputFormat::Text {
        println!("{} Manifest is valid.", "✓".green().bold());
    }
    Ok(())
}

/// Traits of `layer` with zero weight that no link forces.
fn unreachable_traits(catalog: &Catalog, layer: usize) -> Vec<String> {
    let Some(def) = catalog.layer(layer) else {
        return Vec::new();
    };
    let links = catalog.links();
    def.traits
        .iter()
        .enumerate()
        .filter(|(slot, t)| {
            t.weight == 0
                && !links
                    .iter()
                    .any(|(_, rule)| rule.target_layer == layer && rule.forced_slot == *slot)
        })
        .map(|(_, t)| t.name.clone())
        .collect()
}

/// Per-layer pick counts over every created item, plus items whose traits
/// could not be placed.
struct Distribution {
    counts: Vec<Vec<u64>>,
    failures: u64,
}

fn distribution(collection: &Collection) -> anyhow::Result<Distribution> {
    let mut counts: Vec<Vec<u64>> = collection
        .catalog()
        .layers()
        .iter()
        .map(|layer| vec![0; layer.trait_count()])
        .collect();
    let mut failures = 0;
    for (item, _) in collection.items() {
        match collection.traits_of(item) {
            Ok(vector) => {
                for (layer, slot) in vector.iter() {
                    counts[layer][slot] += 1;
                }
            }
            Err(e) if e.kind() == ErrorKind::InvalidTraitSelection => {
                debug!(%item, error = %e, "trait selection failed");
                failures += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Distribution { counts, failures })
}

fn cmd_simulate(args: SimulateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut collection = open(&args.manifest, args.seed)?;
    let count = args.mint.unwrap_or(collection.state().capacity());
    mint(&mut collection, count, args.batch)?;
    if !collection.is_revealed() {
        collection.reveal(&operator())?;
    }
    let dist = distribution(&collection)?;
    let catalog = collection.catalog();

    match format {
        OutputFormat::Json => {
            let layers: Vec<_> = catalog
                .layers()
                .iter()
                .zip(&dist.counts)
                .map(|(layer, counts)| {
                    let traits: Vec<_> = layer
                        .traits
                        .iter()
                        .zip(counts)
                        .map(|(t, n)| json!({ "name": t.name, "count": n }))
                        .collect();
                    json!({ "name": layer.name, "traits": traits })
                })
                .collect();
            let report = json!({
                "minted": collection.minted(),
                "reveal_seed": collection.state().reveal_seed(),
                "failures": dist.failures,
                "layers": layers,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Created {} items, reveal seed {}",
                "✓".green().bold(),
                collection.minted(),
                collection.state().reveal_seed().to_string().yellow()
            );
            let minted = collection.minted().max(1) as f64;
            for (layer, counts) in catalog.layers().iter().zip(&dist.counts) {
                println!("{}", layer.name.bold());
                for (t, n) in layer.traits.iter().zip(counts) {
                    println!(
                        "  {:<24} {:>6}  {:>5.1}%",
                        t.name,
                        n,
                        *n as f64 * 100.0 / minted
                    );
                }
            }
            if dist.failures > 0 {
                println!(
                    "{} {} items fall outside every weight interval",
                    "✗".red().bold(),
                    dist.failures
                );
            }
        }
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut collection = open(&args.manifest, args.seed)?;
    let capacity = collection.state().capacity();
    if args.item >= capacity {
        bail!("item {} does not exist (capacity {})", args.item, capacity);
    }
    let count = args.mint.unwrap_or(0).max(args.item + 1).min(capacity);
    mint(&mut collection, count, count)?;
    if !args.hidden && !collection.is_revealed() {
        collection.reveal(&operator())?;
    }

    let item = ItemId(args.item);
    if args.uri {
        println!("{}", collection.token_uri(item)?);
        return Ok(());
    }

    let doc = collection.metadata(item)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
        OutputFormat::Text => {
            println!("{}", doc.name.bold());
            if !doc.description.is_empty() {
                println!("  {}", doc.description);
            }
            if collection.is_revealed() {
                let vector = collection.traits_of(item)?;
                println!("  code  {}", vector.code().cyan());
            }
            for attr in &doc.attributes {
                println!("  {:<16} {}", attr.trait_type, attr.value.yellow());
            }
            println!("  image {} bytes", doc.image.len());
        }
    }
    Ok(())
}
