use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;
use tracing::info;

use gw_core::{Entity, EntityId, EntityKind};
use gw_simulation::{SimConfig, SimEventKind, Simulation};

use crate::scenario::Scenario;

pub struct RunOptions {
    pub steps: u64,
    pub dt: f64,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct WorldSnapshot<'a> {
    time: f64,
    cols: i32,
    rows: i32,
    entities: Vec<EntityRow<'a>>,
}

#[derive(Serialize)]
struct EntityRow<'a> {
    id: EntityId,
    #[serde(flatten)]
    entity: &'a Entity,
}

pub fn run(path: &Path, opts: &RunOptions) -> Result<(), String> {
    if !opts.dt.is_finite() || opts.dt < 0.0 {
        return Err(format!("--dt must be a non-negative number, got {}", opts.dt));
    }

    let scenario = Scenario::load(path)?;
    let mut config = SimConfig::default().with_max_events(1000);
    if let Some(seed) = opts.seed.or(scenario.seed) {
        config = config.with_seed(seed);
    }
    let world = scenario.build_world(&config)?;
    info!(
        path = %path.display(),
        entities = world.entity_count(),
        "scenario loaded"
    );

    let seed = config.seed;
    let mut sim = Simulation::new(world, config);
    sim.run(opts.steps, opts.dt)
        .map_err(|e| format!("simulation error at t={:.2}: {e}", sim.now()))?;

    if opts.json {
        return print_json(&sim);
    }

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        path.display(),
        format!("({} steps of {}s, seed={seed})", opts.steps, opts.dt).dimmed()
    );
    println!(
        "  t={:.2}, {} entities live, {} events fired, {} pending",
        sim.now(),
        sim.world().entity_count(),
        sim.scheduler().clock().fired(),
        sim.scheduler().pending_count()
    );
    println!();

    if opts.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let time_label = format!("[t {:>7.2}]", event.time).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {time_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    println!("  {}", "World".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Kind", "Position", "Frame", "State"]);

    for (id, entity) in sim.world().entities() {
        table.add_row(vec![
            id.to_string(),
            entity.name.clone(),
            entity.kind.to_string(),
            entity.position.to_string(),
            entity.image_index.to_string(),
            state_column(entity),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} entities", sim.world().entity_count());

    Ok(())
}

fn print_json(sim: &Simulation) -> Result<(), String> {
    let world = sim.world();
    let snapshot = WorldSnapshot {
        time: sim.now(),
        cols: world.num_cols(),
        rows: world.num_rows(),
        entities: world
            .entities()
            .map(|(id, entity)| EntityRow { id, entity })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("failed to serialize world: {e}"))?;
    println!("{json}");
    Ok(())
}

fn state_column(entity: &Entity) -> String {
    match entity.kind {
        EntityKind::Tree => format!("health {}", entity.health),
        EntityKind::Sapling => format!("health {}/{}", entity.health, entity.health_limit),
        EntityKind::DudeNotFull => {
            format!("load {}/{}", entity.resource_count, entity.resource_limit)
        }
        EntityKind::DudeFull => "full".to_string(),
        _ => "-".to_string(),
    }
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::Spawned { .. } => description.green(),
        SimEventKind::Moved { .. } => description.normal(),
        SimEventKind::Displaced { .. } => description.red(),
        SimEventKind::Transformed { .. } => description.cyan(),
        SimEventKind::Harvested { .. } => description.yellow(),
        SimEventKind::Replanted { .. } => description.green().bold(),
    }
}
