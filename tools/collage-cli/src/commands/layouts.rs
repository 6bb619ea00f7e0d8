//! List layouts.

use collage_common::AppConfig;

pub fn run(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let editor = super::open_editor(config, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(editor.layouts())?);
        return Ok(());
    }

    println!("Layouts ({}):", editor.layouts().len());
    for layout in editor.layouts() {
        let kind = if layout.is_custom { "custom" } else { "built-in" };
        let cells: Vec<&str> = layout.cell_ids().collect();
        println!(
            "  {} \"{}\" [{kind}, gap {}px]: {}",
            layout.id,
            layout.name,
            layout.gap,
            cells.join(", ")
        );
    }

    Ok(())
}
