//! Benchmark for PropertyTree and script.dat decoding.
//!
//! Usage: bench-settings [settings.json] [mod count] [players per mod]
//!
//! The settings tree is read from a JSON file when one is given, otherwise
//! a synthetic settings tree is generated. The script.dat document is always
//! synthetic.

use std::fs;
use std::time::{Duration, Instant};

use factorio_dat::codec::{Writer, encode_version};
use factorio_dat::model::SavedLuaValueType;
use factorio_dat::{
    MapVersion, ModSettings, PropertyDict, PropertyTree, decode_mod_settings, decode_script_dat,
    encode_mod_settings, validate_mod_settings, validate_script_dat,
};

const VERSION: MapVersion = MapVersion {
    major: 1,
    minor: 1,
    patch: 110,
    build: 0,
    branch: 0,
};

const ENCODE_ITERS: u32 = 10;
const DECODE_ITERS: u32 = 10;

// =============================================================================
// SYNTHETIC DATA
// =============================================================================

fn synthetic_settings(mods: usize, per_mod: usize) -> serde_json::Value {
    let scopes = ["startup", "runtime-global", "runtime-per-user"];
    let mut root = serde_json::Map::new();
    for (i, scope) in scopes.iter().enumerate() {
        let mut settings = serde_json::Map::new();
        for m in 0..mods {
            for s in 0..per_mod {
                let value = match (m + s + i) % 3 {
                    0 => serde_json::json!(true),
                    1 => serde_json::json!((m * per_mod + s) as f64 * 0.5),
                    _ => serde_json::json!(format!("option-{}", s % 7)),
                };
                settings.insert(
                    format!("mod{}-setting-{}", m, s),
                    serde_json::json!({ "value": value }),
                );
            }
        }
        root.insert(scope.to_string(), serde_json::Value::Object(settings));
    }
    serde_json::Value::Object(root)
}

fn write_string_value(w: &mut Writer, s: &str) {
    w.write_u8(SavedLuaValueType::String as u8);
    w.write_packed_string(s);
}

fn write_number_value(w: &mut Writer, n: f64) {
    w.write_u8(SavedLuaValueType::Number as u8);
    w.write_f64(n);
}

/// Builds one mod's sub-stream: a root table of per-player tables, with
/// every fifth player also pointing back at the first player's table.
fn synthetic_mod_data(players: usize) -> Vec<u8> {
    let mut w = Writer::new();
    encode_version(&mut w, &VERSION);

    // root table is gcid 0, player tables follow in order
    w.write_u8(SavedLuaValueType::TableWithMeta as u8);
    w.write_packed_string("players");
    w.write_packed_u8_32(players as u32);
    for p in 0..players {
        write_string_value(&mut w, &format!("player_{}", p));

        let refs_first = p > 0 && p % 5 == 0;
        w.write_u8(SavedLuaValueType::Table as u8);
        w.write_packed_u8_32(if refs_first { 4 } else { 3 });

        write_string_value(&mut w, "name");
        write_string_value(&mut w, &format!("engineer-{}", p));
        write_string_value(&mut w, "score");
        write_number_value(&mut w, (p * 37 % 1000) as f64);
        write_string_value(&mut w, "online");
        w.write_u8(if p % 2 == 0 {
            SavedLuaValueType::BoolTrue as u8
        } else {
            SavedLuaValueType::BoolFalse as u8
        });
        if refs_first {
            write_string_value(&mut w, "buddy");
            w.write_u8(SavedLuaValueType::ExistingGCObject as u8);
            w.write_packed_u16_32(1);
        }
    }
    w.into_bytes()
}

fn synthetic_script_dat(mods: usize, players: usize) -> Vec<u8> {
    let mut w = Writer::new();
    encode_version(&mut w, &VERSION);
    w.write_u32(mods as u32);
    for m in 0..mods {
        let data = synthetic_mod_data(players);
        w.write_packed_string(&format!("mod-{}", m));
        w.write_packed_u8_32(data.len() as u32);
        w.write_bytes(&data);
        w.write_u8(0);
    }
    w.into_bytes()
}

// =============================================================================
// REPORTING
// =============================================================================

fn report(label: &str, bytes: usize, elapsed: Duration, iters: u32) {
    println!("\n{}: {:?} (avg of {} iterations)", label, elapsed, iters);
    println!(
        "  Throughput: {:.2} MB/s",
        (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
    );
}

/// Command-line arguments. Only a `.json` first argument is taken as the
/// settings path; the counts follow it positionally either way.
#[derive(Debug, PartialEq)]
struct Args {
    json_path: Option<String>,
    mods: usize,
    players: usize,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter().peekable();
        let json_path = args.next_if(|a| a.ends_with(".json"));
        let mods = args.next().and_then(|a| a.parse().ok()).unwrap_or(50);
        let players = args.next().and_then(|a| a.parse().ok()).unwrap_or(2000);
        Self {
            json_path,
            mods,
            players,
        }
    }
}

fn main() {
    env_logger::init();

    let Args {
        json_path,
        mods,
        players,
    } = Args::parse(std::env::args().skip(1));

    // =========================================================================
    // mod-settings.dat
    // =========================================================================

    let json_value = match &json_path {
        Some(path) => {
            println!("Loading settings from {}...", path);
            let text = fs::read_to_string(path).expect("Failed to read settings JSON");
            serde_json::from_str(&text).expect("Failed to parse settings JSON")
        }
        None => {
            println!("Generating synthetic settings ({} mods)...", mods);
            synthetic_settings(mods, 20)
        }
    };
    let json_size = serde_json::to_vec(&json_value).map(|v| v.len()).unwrap_or(0);

    let tree = PropertyTree::from_json(&json_value);
    if let Err(e) = validate_mod_settings(&tree) {
        log::warn!("settings tree does not have the mod-settings layout: {}", e);
    }
    let setting_count = tree
        .as_dict()
        .map(|root| root.values().filter_map(PropertyTree::as_dict).map(PropertyDict::len).sum())
        .unwrap_or(0usize);
    let settings = ModSettings::new(VERSION, tree);

    println!("\n=== Settings ===");
    println!("Settings: {}", setting_count);

    let encode_start = Instant::now();
    let mut encoded = Vec::new();
    for _ in 0..ENCODE_ITERS {
        encoded = encode_mod_settings(&settings).expect("Failed to encode settings");
    }
    report(
        "Encode",
        encoded.len(),
        encode_start.elapsed() / ENCODE_ITERS,
        ENCODE_ITERS,
    );

    // Warmup
    for _ in 0..3 {
        let _ = decode_mod_settings(&encoded).expect("Failed to decode settings");
    }

    let decode_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(decode_mod_settings(&encoded).expect("Failed to decode settings"));
    }
    report(
        "Decode",
        encoded.len(),
        decode_start.elapsed() / DECODE_ITERS,
        DECODE_ITERS,
    );
    assert_eq!(decoded.as_ref(), Some(&settings), "Settings should round-trip");

    // =========================================================================
    // script.dat
    // =========================================================================

    println!("\n=== script.dat ===");
    println!("Mods: {}, players per mod: {}", mods, players);

    let script = synthetic_script_dat(mods, players);
    println!("Document size: {} bytes", script.len());

    for _ in 0..3 {
        let _ = decode_script_dat(&script).expect("Failed to decode script.dat");
    }

    let decode_start = Instant::now();
    let mut doc = None;
    for _ in 0..DECODE_ITERS {
        doc = Some(decode_script_dat(&script).expect("Failed to decode script.dat"));
    }
    report(
        "Decode",
        script.len(),
        decode_start.elapsed() / DECODE_ITERS,
        DECODE_ITERS,
    );

    let Some(doc) = doc else {
        return;
    };
    validate_script_dat(&doc).expect("Decoded document should validate");
    let objects: usize = doc.mods().iter().map(|m| m.object_count()).sum();
    assert_eq!(doc.len(), mods);
    assert_eq!(objects, mods * (players + 1));

    // Summary
    println!("\n=== Summary ===");
    println!(
        "Settings JSON: {} bytes, PropertyTree: {} bytes ({:.1}%)",
        json_size,
        encoded.len(),
        100.0 * encoded.len() as f64 / json_size.max(1) as f64
    );
    println!(
        "script.dat: {} bytes, {} gc objects across {} mods",
        script.len(),
        objects,
        doc.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        Args::parse(list.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_counts_without_json_path() {
        assert_eq!(
            args(&["10", "100"]),
            Args {
                json_path: None,
                mods: 10,
                players: 100
            }
        );
    }

    #[test]
    fn test_counts_after_json_path() {
        assert_eq!(
            args(&["settings.json", "3"]),
            Args {
                json_path: Some("settings.json".into()),
                mods: 3,
                players: 2000
            }
        );
        assert_eq!(args(&[]).mods, 50);
    }

    #[test]
    fn test_synthetic_script_dat_decodes() {
        let doc = decode_script_dat(&synthetic_script_dat(2, 12)).unwrap();
        validate_script_dat(&doc).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.mods()[0].object_count(), 13);
    }
}
