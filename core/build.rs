use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    generate_icon_atlas_map(&out_dir);

    println!("cargo:rerun-if-changed=data/atlas.csv");
}

/// Turn `data/atlas.csv` (name,u0,v0,u1,v1) into a static phf map of UV rects.
fn generate_icon_atlas_map(out_dir: &str) {
    let csv = fs::read_to_string("data/atlas.csv").expect("failed to read atlas.csv");

    // BTreeMap for deterministic output (sorted by key)
    let mut entries = BTreeMap::new();
    for line in csv.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 5 || fields[0].is_empty() {
            continue;
        }
        let uv: Option<Vec<f32>> = fields[1..5].iter().map(|f| f.parse().ok()).collect();
        let Some(uv) = uv else {
            continue;
        };
        entries
            .entry(fields[0].to_string())
            .or_insert(format!("[{:?}f32, {:?}f32, {:?}f32, {:?}f32]", uv[0], uv[1], uv[2], uv[3]));
    }

    let path = Path::new(out_dir).join("icon_atlas.rs");
    let mut file = BufWriter::new(fs::File::create(&path).unwrap());

    let mut builder = phf_codegen::Map::new();
    for (name, uv) in &entries {
        builder.entry(name.as_str(), uv.as_str());
    }

    writeln!(
        file,
        "pub static ICON_ATLAS: phf::Map<&'static str, [f32; 4]> = {};",
        builder.build()
    )
    .unwrap();
}
