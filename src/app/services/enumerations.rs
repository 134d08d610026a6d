//! Code-to-text lookup tables for apt.dat attribute codes.
//!
//! Tables are immutable association lists consulted while building feature
//! attributes. Unknown codes are logged at debug level and yield `None`,
//! which layers store as a null field value; they never fail a record.

use tracing::debug;

/// Immutable code-to-text table with linear lookup
pub struct EnumTable {
    name: &'static str,
    entries: &'static [(i32, &'static str)],
}

impl EnumTable {
    pub const fn new(name: &'static str, entries: &'static [(i32, &'static str)]) -> Self {
        Self { name, entries }
    }

    /// Text for a code, or `None` (with a debug log) when unknown
    pub fn text(&self, code: i32) -> Option<&'static str> {
        match self.entries.iter().find(|(c, _)| *c == code) {
            Some((_, text)) => Some(text),
            None => {
                debug!("Unknown code {} for enumeration {}", code, self.name);
                None
            }
        }
    }
}

pub static RUNWAY_SURFACE: EnumTable = EnumTable::new(
    "runway surface",
    &[
        (1, "Asphalt"),
        (2, "Concrete"),
        (3, "Turf/grass"),
        (4, "Dirt"),
        (5, "Gravel"),
        (6, "Asphalt"),
        (7, "Concrete"),
        (8, "Turf/grass"),
        (9, "Dirt"),
        (10, "Asphalt"),
        (11, "Concrete"),
        (12, "Dry lakebed"),
        (13, "Water"),
        (14, "Snow/ice"),
        (15, "Transparent"),
    ],
);

pub static RUNWAY_SHOULDER: EnumTable = EnumTable::new(
    "runway shoulder",
    &[(0, "None"), (1, "Asphalt"), (2, "Concrete")],
);

pub static RUNWAY_MARKING: EnumTable = EnumTable::new(
    "runway marking",
    &[
        (0, "None"),
        (1, "Visual"),
        (2, "Non-precision"),
        (3, "Precision"),
        (4, "UK non-precision"),
        (5, "UK precision"),
    ],
);

pub static RUNWAY_EDGE_LIGHTING: EnumTable = EnumTable::new(
    "runway edge lighting",
    &[
        (0, "None"),
        (1, "Yes"),
        (2, "LIRL"),
        (3, "MIRL"),
        (4, "HIRL"),
    ],
);

pub static HELIPAD_EDGE_LIGHTING: EnumTable = EnumTable::new(
    "helipad edge lighting",
    &[(0, "None"), (1, "Yes"), (2, "Yellow"), (3, "Blue")],
);

pub static RUNWAY_APPROACH_LIGHTING: EnumTable = EnumTable::new(
    "runway approach lighting",
    &[
        (0, "None"),
        (1, "ALSF-I"),
        (2, "ALSF-II"),
        (3, "Calvert"),
        (4, "Calvert ILS Cat II and III"),
        (5, "SSALR"),
        (6, "SSALF"),
        (7, "SALS"),
        (8, "MALSR"),
        (9, "MALSF"),
        (10, "MALS"),
        (11, "ODALS"),
        (12, "RAIL"),
    ],
);

/// Approach-lighting codes used by v8.10 combined runway records
pub static RUNWAY_APPROACH_LIGHTING_V810: EnumTable = EnumTable::new(
    "runway approach lighting (v810)",
    &[
        (0, "None"),
        (1, "SSALS"),
        (2, "SALSF"),
        (3, "ALSF-I"),
        (4, "ALSF-II"),
        (5, "ODALS"),
        (6, "Calvert"),
        (7, "Calvert ILS Cat II and III"),
    ],
);

pub static RUNWAY_REIL: EnumTable = EnumTable::new(
    "runway REIL",
    &[(0, "None"), (1, "Omni-directional"), (2, "Unidirectional")],
);

pub static VASI_PAPI_WIGWAG: EnumTable = EnumTable::new(
    "VASI/PAPI/wigwag",
    &[
        (1, "VASI"),
        (2, "PAPI Left"),
        (3, "PAPI Right"),
        (4, "Space Shuttle PAPI"),
        (5, "Tri-colour VASI"),
        (6, "Wig-Wag lights"),
    ],
);

/// Visual approach path indicator codes used by v8.10 combined records
pub static VASI_PAPI_V810: EnumTable = EnumTable::new(
    "VASI/PAPI (v810)",
    &[
        (1, "VASI"),
        (2, "PAPI"),
        (3, "Space Shuttle PAPI"),
    ],
);

pub static LIGHT_BEACON_COLOR: EnumTable = EnumTable::new(
    "light beacon color",
    &[
        (0, "None"),
        (1, "White-green"),
        (2, "White-yellow"),
        (3, "Green-yellow-white"),
        (4, "White-white-green"),
    ],
);
