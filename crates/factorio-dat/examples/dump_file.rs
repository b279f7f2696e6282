//! Simple inspector for script.dat and mod-settings.dat files.
//!
//! Usage: dump_file <path> [--json]
//!
//! Files named `mod-settings.dat` are read as settings; anything else is
//! read as an extracted script.dat.

use std::fs;
use std::path::Path;

use factorio_dat::{
    LuaObject, ModState, SavedLuaValue, decode_mod_settings, decode_script_dat,
    validate_mod_settings,
};

const MAX_DEPTH: usize = 4;
const MAX_ENTRIES: usize = 8;

fn format_scalar(v: &SavedLuaValue) -> String {
    match v {
        SavedLuaValue::Nil => "nil".to_string(),
        SavedLuaValue::Bool(b) => b.to_string(),
        SavedLuaValue::Number(n) => n.to_string(),
        SavedLuaValue::String(s) => {
            let preview: String = s.chars().take(60).collect();
            if s.chars().count() > 60 {
                format!("{:?}...", preview)
            } else {
                format!("{:?}", preview)
            }
        }
        SavedLuaValue::Table(t) => format!("table {} ({} entries)", t.gcid, t.len()),
        SavedLuaValue::ExistingGCObjectRef(id) => format!("<ref {}>", id),
        SavedLuaValue::LuaObject(o) => format_object(o),
    }
}

fn format_object(o: &LuaObject) -> String {
    let fields: Vec<String> = o
        .fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    format!("{} {} [{}]", o.object_type, o.gcid, fields.join(", "))
}

fn print_value(state: &ModState, v: &SavedLuaValue, indent: usize) {
    let pad = "  ".repeat(indent);
    let SavedLuaValue::Table(table) = v else {
        println!("{}{}", pad, format_scalar(v));
        return;
    };

    match &table.metatable {
        Some(meta) => println!("{}table {} <{}>", pad, table.gcid, meta),
        None => println!("{}table {}", pad, table.gcid),
    }
    if indent >= MAX_DEPTH {
        println!("{}  ... {} entries", pad, table.len());
        return;
    }
    for (key, value) in table.entries.iter().take(MAX_ENTRIES) {
        match value {
            SavedLuaValue::Table(_) => {
                println!("{}  [{}] =", pad, format_scalar(key));
                print_value(state, value, indent + 2);
            }
            SavedLuaValue::ExistingGCObjectRef(id) => {
                let target = state
                    .object(*id)
                    .map(|o| format_scalar(&o.to_value()))
                    .unwrap_or_else(|| "dangling".to_string());
                println!("{}  [{}] = <ref {}> -> {}", pad, format_scalar(key), id, target);
            }
            _ => println!("{}  [{}] = {}", pad, format_scalar(key), format_scalar(value)),
        }
    }
    if table.len() > MAX_ENTRIES {
        println!("{}  ... and {} more entries", pad, table.len() - MAX_ENTRIES);
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "script.dat".to_string());
    let json = args.any(|a| a == "--json");

    println!("Reading: {}", path);
    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let is_settings = Path::new(&path)
        .file_name()
        .is_some_and(|name| name == "mod-settings.dat");

    if is_settings {
        let settings = decode_mod_settings(&data).expect("Failed to decode");
        println!("Version: {}", settings.version);
        if let Err(e) = validate_mod_settings(&settings.tree) {
            println!("Warning: {}", e);
        }
        if json {
            let rendered = serde_json::to_string_pretty(&settings.tree.to_json())
                .expect("Failed to render JSON");
            println!("{}", rendered);
        } else {
            for (scope, name, value) in settings.iter() {
                println!("  [{}] {} = {:?}", scope, name, value);
            }
        }
        return;
    }

    let doc = decode_script_dat(&data).expect("Failed to decode");
    println!("Version: {}", doc.version);
    println!("\n=== Mods ({}) ===", doc.len());
    for state in doc.mods() {
        println!(
            "\n[{}] {} objects, root is {}",
            state.name,
            state.object_count(),
            state.root.type_name()
        );
        print_value(state, &state.root, 1);
    }
}
