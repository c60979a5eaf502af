// SPDX-License-Identifier: MIT
//! Basic usage example for the map annotation container

use map_container::{MapFile, MapImage, MapPosition, MapPositions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=map_container=debug shows the header and index dumps
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();

    println!("=== Map Annotation Container - Basic Usage ===\n");

    // Step 1: Build a document
    println!("1. Building document...");
    let output_path = std::env::temp_dir().join("map_container_demo.map");
    let mut map = MapFile::new(&output_path);

    let mut spawns = MapPositions::player_spawns("Player Spawns");
    spawns.add_position(MapPosition::new(100.0, 0.0, 200.0));
    spawns.add_position(MapPosition::new(150.5, 2.5, 175.25));
    map.add_object(spawns);

    map.add_object(MapPositions::with_positions(
        "HeliCrashNorth",
        "Heli Crashes",
        vec![MapPosition::new(4200.0, 310.0, 9800.0)],
    ));
    // Same display name: merged into the layer above
    map.add_object(MapPositions::with_positions(
        "HeliCrashSouth",
        "Heli Crashes",
        vec![MapPosition::new(6100.0, 12.0, 2300.0)],
    ));
    map.add_object(MapImage::from_bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]));

    for layer in map.all_positions() {
        println!(
            "   Layer '{}' ({}): {} positions",
            layer.display_name(),
            layer.name(),
            layer.len()
        );
    }
    println!("   Images: {}", map.all_images().len());

    // Step 2: Save
    println!("\n2. Saving to {}...", output_path.display());
    map.save()?;
    println!("   Written {} bytes", std::fs::metadata(&output_path)?.len());

    // Step 3: Inspect the index without loading payloads
    println!("\n3. Inspecting index...");
    let mut probe = MapFile::new(&output_path);
    println!("   Has images: {}", probe.has_images()?);
    if let Some(header) = probe.header() {
        println!("{}", serde_json::to_string_pretty(header)?);
    }

    // Step 4: Selective reads
    println!("\n4. Reading points only, then images...");
    let mut reloaded = MapFile::new(PathBuf::from(&output_path));
    reloaded.read_positions_only()?;
    println!(
        "   After points-only read: {} layers, {} images, fully read: {}",
        reloaded.all_positions().len(),
        reloaded.all_images().len(),
        reloaded.has_fully_read_content()
    );
    reloaded.read_images_only()?;
    println!(
        "   After images-only read: {} layers, {} images, fully read: {}",
        reloaded.all_positions().len(),
        reloaded.all_images().len(),
        reloaded.has_fully_read_content()
    );

    if let Some(spawns) = reloaded.player_spawns() {
        println!("\n5. Player spawns as JSON:");
        println!("{}", serde_json::to_string_pretty(spawns)?);
    }

    println!("\n=== Map Container Demo Complete ===");
    Ok(())
}
