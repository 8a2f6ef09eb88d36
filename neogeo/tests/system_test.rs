use mvs_core::prelude::Machine;
use mvs_neogeo::NeoGeoSystem;

const BIOS_SIZE: usize = 128 * 1024;
const FIX_SIZE: usize = 128 * 1024;

fn write_minimal_cartridge(dir: &std::path::Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("p.bios"), vec![0u8; BIOS_SIZE]).unwrap();
    std::fs::write(dir.join("p.rom"), vec![0u8; 0x1000]).unwrap();
    std::fs::write(dir.join("s.bios"), vec![0u8; FIX_SIZE]).unwrap();
    std::fs::write(dir.join("s.rom"), vec![0u8; FIX_SIZE]).unwrap();
    std::fs::write(dir.join("c.rom"), vec![0u8; 0x1000]).unwrap();
}

fn temp_cart_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("mvs-system-test-{name}-{}", std::process::id()))
}

#[test]
fn new_from_a_minimal_cartridge_directory_boots_and_renders_a_frame() {
    let dir = temp_cart_dir("boot");
    write_minimal_cartridge(&dir);

    let mut system = NeoGeoSystem::new(&dir).unwrap();
    system.reset();
    system.run_frame();

    let (w, h) = system.display_size();
    let mut fb = vec![0u8; (w * h * 3) as usize];
    system.render_frame(&mut fb);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn input_map_lists_every_button_set_input_accepts() {
    let dir = temp_cart_dir("inputs");
    write_minimal_cartridge(&dir);

    let mut system = NeoGeoSystem::new(&dir).unwrap();
    let buttons: Vec<u8> = system.input_map().iter().map(|b| b.id).collect();
    assert!(!buttons.is_empty());
    for id in buttons {
        system.set_input(id, true);
        system.set_input(id, false);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_required_rom_file_fails_construction() {
    let dir = temp_cart_dir("missing-file");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("p.bios"), vec![0u8; BIOS_SIZE]).unwrap();

    let result = NeoGeoSystem::new(&dir);
    assert!(result.is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn nvram_round_trips_through_save_and_load() {
    let dir = temp_cart_dir("nvram");
    write_minimal_cartridge(&dir);

    let mut system = NeoGeoSystem::new(&dir).unwrap();
    system.reset();
    if let Some(initial) = system.save_nvram() {
        let data = initial.to_vec();
        let mut modified = data.clone();
        if let Some(first) = modified.first_mut() {
            *first = first.wrapping_add(1);
        }
        system.load_nvram(&modified);
        assert_eq!(system.save_nvram(), Some(modified.as_slice()));
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
