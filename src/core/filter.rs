use crate::domain::model::{Center, Filter};

impl Filter {
    /// Type and hours criteria combined with AND. Never looks at distance.
    pub fn matches(&self, center: &Center) -> bool {
        self.matches_type(center) && self.matches_hours(center)
    }

    fn matches_type(&self, center: &Center) -> bool {
        self.types.is_empty() || self.types.contains(&center.kind)
    }

    fn matches_hours(&self, center: &Center) -> bool {
        match self.open_at {
            Some(at) => center.hours.is_open_at(at),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hours::Hours;
    use crate::domain::model::{CenterType, Location};
    use chrono::{NaiveDate, NaiveDateTime};

    fn center(kind: CenterType, hours: &str) -> Center {
        Center {
            id: "1".to_string(),
            name: "Test Center".to_string(),
            address: "1 Main St".to_string(),
            location: Location {
                latitude: 47.6,
                longitude: -122.3,
            },
            kind,
            hours: hours.parse::<Hours>().unwrap(),
            features: vec![],
            notes: None,
        }
    }

    // a Monday
    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let filter = Filter::all();
        assert!(filter.matches(&center(CenterType::Library, "MON:9:00AM-5:00PM")));
        assert!(filter.matches(&center(CenterType::Other, "CLOSED")));
    }

    #[test]
    fn test_type_filter() {
        let filter = Filter::all().with_types([CenterType::Library, CenterType::EventHall]);
        assert!(filter.matches(&center(CenterType::Library, "24/7")));
        assert!(filter.matches(&center(CenterType::EventHall, "24/7")));
        assert!(!filter.matches(&center(CenterType::CommunityCenter, "24/7")));
    }

    #[test]
    fn test_open_now_filter() {
        let filter = Filter::all().open_at(monday_noon());
        assert!(filter.matches(&center(CenterType::Library, "MON:9:00AM-5:00PM")));
        assert!(filter.matches(&center(CenterType::Library, "24/7")));
        assert!(!filter.matches(&center(CenterType::Library, "TUE:9:00AM-5:00PM")));
        assert!(!filter.matches(&center(CenterType::Library, "CLOSED")));
    }

    #[test]
    fn test_type_and_hours_combine_with_and() {
        let filter = Filter::all()
            .with_types([CenterType::CommunityCenter])
            .open_at(monday_noon());
        assert!(filter.matches(&center(CenterType::CommunityCenter, "MON:9:00AM-5:00PM")));
        assert!(!filter.matches(&center(CenterType::Library, "MON:9:00AM-5:00PM")));
        assert!(!filter.matches(&center(CenterType::CommunityCenter, "CLOSED")));
    }
}
