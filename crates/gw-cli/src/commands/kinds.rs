use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use gw_core::EntityKind;

pub fn run(key: Option<&str>) -> Result<(), String> {
    // Both dude states share one key, so filter by key rather than by kind.
    let wanted = match key {
        Some(k) => Some(
            EntityKind::parse(k)
                .ok_or_else(|| format!("unknown entity kind '{k}'"))?
                .key(),
        ),
        None => None,
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Kind", "Key", "Activity", "Animated"]);

    let mark = |on: bool| if on { "yes" } else { "no" };
    for kind in EntityKind::ALL
        .into_iter()
        .filter(|k| wanted.is_none_or(|w| k.key() == w))
    {
        table.add_row(vec![
            kind.to_string(),
            kind.key().to_string(),
            mark(kind.has_activity()).to_string(),
            mark(kind.is_animated()).to_string(),
        ]);
    }

    println!("  {}", "Entity Kinds".bold().underline());
    println!();
    println!("{table}");
    Ok(())
}
