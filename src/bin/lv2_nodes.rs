#[cfg(all(unix, not(target_os = "macos")))]
fn main() {
    use lv2_bridge::world::Lv2World;

    tracing_subscriber::fmt::init();

    let world = Lv2World::new();
    let registry = world.discover();
    println!("Found {} LV2 node types", registry.len());

    let json = std::env::args().any(|arg| arg == "--json");

    for uri in registry.uris() {
        let schema = registry.get(&uri).expect("registered uri");
        if json {
            match serde_json::to_string_pretty(&schema.node_info()) {
                Ok(dump) => println!("{dump}"),
                Err(error) => eprintln!("Failed to serialize '{uri}': {error}"),
            }
            continue;
        }
        println!(
            "- {} [{}] | {} | pads: {} | params: {} | in-place: {}",
            schema.details.long_name,
            uri,
            schema.details.category.tags(),
            schema.pad_templates().len(),
            schema.params().len(),
            schema.can_process_in_place
        );
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn main() {
    eprintln!("LV2 discovery is not supported on this platform");
}
