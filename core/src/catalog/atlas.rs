//! Icon atlas lookup
//!
//! The UV table is generated at build time from `data/atlas.csv`.

include!(concat!(env!("OUT_DIR"), "/icon_atlas.rs"));

/// Atlas entry name derived from a display name: lowercase, spaces and quotes become `_`
pub fn atlas_entry_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '"' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// UV rect `[u0, v0, u1, v1]` of an atlas entry, if present
pub fn icon_uv(entry: &str) -> Option<[f32; 4]> {
    ICON_ATLAS.get(entry).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name() {
        assert_eq!(atlas_entry_name("Signet of \"Might\""), "signet_of__might_");
        assert_eq!(atlas_entry_name("Aegis"), "aegis");
    }

    #[test]
    fn test_known_entries_have_valid_rects() {
        for name in ["aegis", "might", "unknown"] {
            let uv = icon_uv(name).expect(name);
            assert!(uv[0] < uv[2] && uv[1] < uv[3], "{name}: {uv:?}");
            assert!(uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert!(icon_uv("not_an_icon").is_none());
    }
}
