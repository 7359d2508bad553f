//! Definitions shipped with the overlay

use super::{BuffCatalog, CatalogBuilder};

/// Stack ceiling for intensity-stacking effects
const INTENSITY: i32 = 25;
/// Duration-stacking effects never show a number
const DURATION: i32 = 1;

pub fn builtin_catalog() -> BuffCatalog {
    let mut b = CatalogBuilder::new();

    b.category(&["Boons"])
        .buff(743, "Aegis", DURATION)
        .buff(30328, "Alacrity", DURATION)
        .buff(725, "Fury", DURATION)
        .buff(740, "Might", INTENSITY)
        .buff(717, "Protection", DURATION)
        .buff(1187, "Quickness", DURATION)
        .buff(718, "Regeneration", DURATION)
        .buff(26980, "Resistance", DURATION)
        .buff(873, "Resolution", DURATION)
        .buff(1122, "Stability", INTENSITY)
        .buff(719, "Swiftness", DURATION)
        .buff(726, "Vigor", DURATION);

    b.category(&["Movement"])
        .buff(5974, "Superspeed", DURATION)
        .buff_with_extras(13017, &[10269, 58026], "Stealth", DURATION)
        .buff(890, "Revealed", DURATION);

    b.category(&["Conditions", "Damaging"])
        .buff(736, "Bleeding", INTENSITY)
        .buff(737, "Burning", INTENSITY)
        .buff(861, "Confusion", INTENSITY)
        .buff(723, "Poison", INTENSITY)
        .buff(19426, "Torment", INTENSITY);

    b.category(&["Conditions", "Impairing"])
        .buff(720, "Blinded", DURATION)
        .buff(722, "Chilled", DURATION)
        .buff(721, "Crippled", DURATION)
        .buff(791, "Fear", DURATION)
        .buff(727, "Immobile", DURATION)
        .buff(26766, "Slow", DURATION)
        .buff(27705, "Taunt", DURATION)
        .buff(742, "Weakness", DURATION)
        .buff(738, "Vulnerability", INTENSITY);

    b.category(&["Control"])
        .buff(872, "Stun", DURATION)
        .buff(833, "Daze", DURATION)
        .buff(770, "Knockdown", DURATION);

    b.category(&["Defensive"])
        .buff_with_extras(757, &[848, 31229], "Invulnerability", DURATION)
        .buff(38218, "Barrier", DURATION)
        .buff_with_extras(37184, &[37185, 48179], "Fixated", DURATION);

    b.build()
}
