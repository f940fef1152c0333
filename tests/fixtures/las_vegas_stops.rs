//! Real Las Vegas area stops with street addresses.

use trip_planner::model::Node;

/// A named place a trip can stop at.
#[derive(Debug, Clone, Copy)]
pub struct Stop {
    pub name: &'static str,
    pub address: &'static str,
}

impl Stop {
    pub const fn new(name: &'static str, address: &'static str) -> Self {
        Self { name, address }
    }
}

pub const STRIP: &[Stop] = &[
    Stop::new("Bellagio", "3600 S Las Vegas Blvd, Las Vegas, NV 89109"),
    Stop::new("Caesars Palace", "3570 S Las Vegas Blvd, Las Vegas, NV 89109"),
    Stop::new("MGM Grand", "3799 S Las Vegas Blvd, Las Vegas, NV 89109"),
    Stop::new("Wynn Las Vegas", "3131 S Las Vegas Blvd, Las Vegas, NV 89109"),
    Stop::new("The Venetian", "3355 S Las Vegas Blvd, Las Vegas, NV 89109"),
    Stop::new("Sphere", "255 Sands Ave, Las Vegas, NV 89169"),
    Stop::new("Welcome to Fabulous Las Vegas Sign", "5200 S Las Vegas Blvd, Las Vegas, NV 89119"),
];

pub const DOWNTOWN: &[Stop] = &[
    Stop::new("Fremont Street Experience", "425 Fremont St, Las Vegas, NV 89101"),
    Stop::new("The Mob Museum", "300 Stewart Ave, Las Vegas, NV 89101"),
    Stop::new("The Neon Museum", "770 Las Vegas Blvd N, Las Vegas, NV 89101"),
    Stop::new("Springs Preserve", "333 S Valley View Blvd, Las Vegas, NV 89107"),
];

pub const DAY_TRIPS: &[Stop] = &[
    Stop::new("Red Rock Canyon", "1000 Scenic Loop Dr, Las Vegas, NV 89161"),
    Stop::new("Hoover Dam", "Hoover Dam, Boulder City, NV 89005"),
    Stop::new("Valley of Fire State Park", "29450 Valley of Fire Hwy, Overton, NV 89040"),
    Stop::new("Ethel M Chocolates", "2 Cactus Garden Dr, Henderson, NV 89014"),
    Stop::new("Harry Reid International Airport", "5757 Wayne Newton Blvd, Las Vegas, NV 89119"),
];

pub fn all_stops() -> Vec<Stop> {
    let mut all = Vec::with_capacity(STRIP.len() + DOWNTOWN.len() + DAY_TRIPS.len());
    all.extend_from_slice(STRIP);
    all.extend_from_slice(DOWNTOWN);
    all.extend_from_slice(DAY_TRIPS);
    all
}

/// First `count` stops as canvas nodes with ids `n0`, `n1`, ...
pub fn sample_nodes(count: usize) -> Vec<Node> {
    all_stops()
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, stop)| Node::new(format!("n{i}"), stop.name, stop.address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_stops_have_addresses() {
        for stop in all_stops() {
            assert!(stop.address.contains("NV"), "{} has no Nevada address", stop.name);
        }
    }
}
