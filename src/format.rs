const POSITIONS: [&str; 21] = [
    "QB", "HB", "FB", "WR", "TE", "LT", "LG", "C", "RG", "RT", "LE", "RE", "DT", "LOLB", "MLB",
    "ROLB", "CB", "FS", "SS", "K", "P",
];

pub fn position_name(code: i64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|idx| POSITIONS.get(idx))
        .copied()
        .unwrap_or("Unknown")
}

/// Inches to metres, two decimals.
pub fn format_height(inches: i64) -> String {
    let cm = (inches as f64 * 2.54).round();
    format!("{:.2} m", cm / 100.0)
}

/// Stored weight is an offset from 160 lb; zero means unknown.
pub fn format_weight(weight: i64) -> String {
    if weight == 0 {
        return "N/A".to_string();
    }
    let kg = ((160 + weight) as f64 * 0.453592).round();
    format!("{kg} kg")
}

pub fn format_dev_trait(code: Option<&str>) -> String {
    match code {
        None | Some("") => "N/A".to_string(),
        Some("0") => "Normal".to_string(),
        Some("1") => "Impact".to_string(),
        Some("2") => "Star".to_string(),
        Some("3") => "Elite".to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillTier {
    Elite,
    Good,
    Average,
    Low,
}

impl SkillTier {
    pub fn of(value: i64) -> Self {
        match value {
            v if v >= 90 => SkillTier::Elite,
            v if v >= 80 => SkillTier::Good,
            v if v >= 70 => SkillTier::Average,
            _ => SkillTier::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_codes_map_to_abbreviations() {
        assert_eq!(position_name(0), "QB");
        assert_eq!(position_name(14), "MLB");
        assert_eq!(position_name(20), "P");
        assert_eq!(position_name(21), "Unknown");
        assert_eq!(position_name(-1), "Unknown");
    }

    #[test]
    fn height_and_weight_use_metric() {
        assert_eq!(format_height(74), "1.88 m");
        assert_eq!(format_weight(60), "100 kg");
        assert_eq!(format_weight(0), "N/A");
    }

    #[test]
    fn dev_trait_and_tiers() {
        assert_eq!(format_dev_trait(Some("2")), "Star");
        assert_eq!(format_dev_trait(Some("9")), "9");
        assert_eq!(format_dev_trait(None), "N/A");
        assert_eq!(SkillTier::of(90), SkillTier::Elite);
        assert_eq!(SkillTier::of(85), SkillTier::Good);
        assert_eq!(SkillTier::of(70), SkillTier::Average);
        assert_eq!(SkillTier::of(12), SkillTier::Low);
    }
}
