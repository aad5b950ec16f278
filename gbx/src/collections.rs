//! Static table of well-known collection (environment) names
//!
//! Lookback values without a flag bit and below the index mask name a collection
//! directly instead of referring to a stored string.

/// Name of the collection with numeric id `id`
pub fn collection_name(id: u32) -> Option<&'static str> {
    let name = match id {
        0 => "Desert",
        1 => "Snow",
        2 => "Rally",
        3 => "Island",
        4 => "Bay",
        5 => "Coast",
        6 => "Stadium",
        7 => "Basic",
        8 => "Plain",
        9 => "Moon",
        10 => "Toy",
        11 => "Valley",
        12 => "Canyon",
        13 => "Lagoon",
        14 => "Deprecated_Arena",
        15 => "TMCommon",
        16 => "Canyon4",
        17 => "Canyon256",
        18 => "Valley4",
        19 => "Valley256",
        20 => "Lagoon4",
        21 => "Lagoon256",
        22 => "Stadium4",
        23 => "Stadium256",
        26 => "Stadium",
        100 => "History",
        101 => "Society",
        102 => "Galaxy",
        103 => "Gothic",
        104 => "Paris",
        200 => "Storm",
        201 => "Cryo",
        202 => "Meteor",
        203 => "Meteor4",
        204 => "Meteor64",
        205 => "Meteor256",
        299 => "SMCommon",
        10000 => "Vehicles",
        10001 => "Orbital",
        10002 => "Actors",
        10003 => "Common",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(collection_name(6), Some("Stadium"));
        assert_eq!(collection_name(26), Some("Stadium"));
        assert_eq!(collection_name(12), Some("Canyon"));
        assert_eq!(collection_name(10003), Some("Common"));
    }

    #[test]
    fn test_unknown_ids() {
        assert_eq!(collection_name(24), None);
        assert_eq!(collection_name(999), None);
    }
}
