use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use cool_finder::core::distance::haversine_meters;
use cool_finder::{resolve, Center, CenterType, Filter, Hours, Location};

/// Deterministic spread of centers around Seattle, with repeated coordinates
/// so ties show up.
fn catalog(size: usize) -> Vec<Center> {
    let hours = [
        "24/7",
        "CLOSED",
        "MON-FRI:9:00AM-5:00PM",
        "SAT-SUN:10:00-18:00",
        "FRI:10:00PM-2:00AM",
    ];
    (0..size)
        .map(|i| {
            let step = (i % 7) as f64;
            Center {
                id: format!("c{}", i),
                name: format!("Center {}", i),
                address: format!("{} Pine St, Seattle, WA", 100 + i),
                location: Location {
                    latitude: 47.55 + step * 0.02,
                    longitude: -122.40 + ((i * 3) % 11) as f64 * 0.01,
                },
                kind: CenterType::ALL[i % CenterType::ALL.len()],
                hours: hours[i % hours.len()].parse::<Hours>().unwrap(),
                features: vec![],
                notes: None,
            }
        })
        .collect()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

fn origins() -> Vec<Location> {
    vec![
        Location::new(47.6062, -122.3321).unwrap(),
        Location::new(47.5, -122.5).unwrap(),
        Location::new(47.7, -122.3).unwrap(),
    ]
}

#[test]
fn test_results_are_sorted_subset_of_matching_centers() {
    let catalog = catalog(40);
    let filters = [
        Filter::all(),
        Filter::all().with_types([CenterType::Library, CenterType::Other]),
        Filter::all().open_at(at(1, 12)),
        Filter::all()
            .with_types([CenterType::CommunityCenter])
            .open_at(at(6, 1)),
    ];

    for origin in origins() {
        for filter in &filters {
            let ranked = resolve(&origin, &catalog, Some(filter), None).unwrap();

            let expected = catalog.iter().filter(|c| filter.matches(c)).count();
            assert_eq!(ranked.len(), expected);

            let distances: Vec<f64> = ranked.iter().map(|r| r.distance_m).collect();
            assert!(distances.windows(2).all(|w| w[0] <= w[1]));

            for entry in ranked.iter() {
                assert!(filter.matches(entry.center));
                assert!(catalog.iter().any(|c| std::ptr::eq(c, entry.center)));
                assert_eq!(
                    entry.distance_m,
                    haversine_meters(&origin, &entry.center.location)
                );
            }
        }
    }
}

#[test]
fn test_ties_keep_catalog_order() {
    let catalog = catalog(40);
    let origin = origins()[0];
    let ranked = resolve(&origin, &catalog, None, None).unwrap();

    let position = |id: &str| catalog.iter().position(|c| c.id == id).unwrap();
    for pair in ranked.entries().windows(2) {
        if pair[0].distance_m == pair[1].distance_m {
            assert!(position(&pair[0].center.id) < position(&pair[1].center.id));
        }
    }
}

#[test]
fn test_limit_returns_prefix_of_unlimited_result() -> Result<()> {
    let catalog = catalog(25);
    let origin = origins()[1];
    let full = resolve(&origin, &catalog, None, None)?;

    for limit in [1_i64, 3, 10, 25, 100] {
        let limited = resolve(&origin, &catalog, None, Some(limit))?;
        assert_eq!(limited.len(), full.len().min(limit as usize));
        assert_eq!(limited.entries(), &full.entries()[..limited.len()]);
    }
    Ok(())
}

#[test]
fn test_same_inputs_give_same_output() -> Result<()> {
    let catalog = catalog(30);
    let filter = Filter::all().open_at(at(5, 23));
    for origin in origins() {
        let first = resolve(&origin, &catalog, Some(&filter), Some(7))?;
        let second = resolve(&origin, &catalog, Some(&filter), Some(7))?;
        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn test_invalid_limit_is_rejected() {
    let catalog = catalog(3);
    for limit in [0_i64, -1] {
        assert!(resolve(&origins()[0], &catalog, None, Some(limit)).is_err());
    }
}

#[test]
fn test_overnight_hours_reach_into_next_day() {
    let catalog = catalog(5);
    let origin = origins()[0];

    // c4 is open FRI 22:00 to SAT 02:00; 2024-07-06 is a Saturday
    let late = resolve(&origin, &catalog, Some(&Filter::all().open_at(at(6, 1))), None).unwrap();
    assert!(late.iter().any(|r| r.center.id == "c4"));

    let morning =
        resolve(&origin, &catalog, Some(&Filter::all().open_at(at(6, 3))), None).unwrap();
    assert!(morning.iter().all(|r| r.center.id != "c4"));
}
