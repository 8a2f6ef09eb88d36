use mvs_core::prelude::Machine;
use mvs_neogeo::NeoGeoSystem;

mod emulator;
mod input;
mod video;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    // Usage: mvs-engine <cartridge-dir> [--scale N]

    let cart_dir = args
        .get(1)
        .expect("Usage: mvs-engine <cartridge-dir> [--scale N]");
    let scale = parse_scale_arg(&args).unwrap_or(3);

    let mut machine =
        NeoGeoSystem::new(std::path::Path::new(cart_dir)).expect("Failed to load cartridge");

    let nvram_path = nvram_path_for(cart_dir);
    if let Ok(data) = std::fs::read(&nvram_path) {
        machine.load_nvram(&data);
    }

    let key_map = input::default_key_map(machine.input_map());
    machine.reset();
    emulator::run(&mut machine, &key_map, scale);

    if let Some(data) = machine.save_nvram() {
        if let Err(e) = std::fs::write(&nvram_path, data) {
            eprintln!("Warning: failed to save NVRAM: {e}");
        }
    }
}

fn nvram_path_for(cart_dir: &str) -> std::path::PathBuf {
    std::path::Path::new(cart_dir).join("cart.nvram")
}

fn parse_scale_arg(args: &[String]) -> Option<u32> {
    args.windows(2).find_map(|w| {
        if w[0] == "--scale" {
            w[1].parse().ok()
        } else {
            None
        }
    })
}
