//! Validate area grammar text.

use collage_layout::AreaGrid;

pub fn run(rows: Vec<String>) -> anyhow::Result<()> {
    let areas = super::areas_from_rows(&rows);
    println!("Validating areas:");
    for line in areas.lines() {
        println!("  {line}");
    }

    let grid = AreaGrid::parse(&areas).map_err(|e| anyhow::anyhow!("Invalid areas: {e}"))?;

    println!(
        "\n  Tracks: {} row(s) x {} column(s)",
        grid.row_count(),
        grid.column_count()
    );
    for id in grid.cell_ids() {
        if let Some(span) = grid.span_of(&id) {
            println!(
                "  - {id}: rows {}-{}, columns {}-{}",
                span.row_start + 1,
                span.row_end + 1,
                span.col_start + 1,
                span.col_end + 1
            );
        }
    }
    println!("\nAreas are valid.");

    Ok(())
}
