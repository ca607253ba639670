use crate::models::Player;

#[derive(Debug, Clone, Copy)]
pub struct SkillCategory {
    pub key: &'static str,
    pub name: &'static str,
    /// `(wire key, label)` pairs.
    pub skills: &'static [(&'static str, &'static str)],
}

pub const SKILL_CATEGORIES: &[SkillCategory] = &[
    SkillCategory {
        key: "physical",
        name: "Physical",
        skills: &[
            ("speed", "Speed"),
            ("acceleration", "Acceleration"),
            ("strength", "Strength"),
            ("agility", "Agility"),
            ("jumping", "Jumping"),
            ("stamina", "Stamina"),
            ("toughness", "Toughness"),
            ("injury", "Injury"),
            ("awareness", "Awareness"),
        ],
    },
    SkillCategory {
        key: "passing",
        name: "Passing",
        skills: &[
            ("throwPower", "Throw Power"),
            ("throwAccuracy", "Throw Accuracy"),
            ("throwAccuracyShort", "Short Accuracy"),
            ("throwAccuracyMid", "Mid Accuracy"),
            ("throwAccuracyDeep", "Deep Accuracy"),
            ("playAction", "Play Action"),
            ("throwOnTheRun", "Throw on the Run"),
            ("throwUnderPressure", "Throw Under Pressure"),
            ("breakSack", "Break Sack"),
        ],
    },
    SkillCategory {
        key: "rushing",
        name: "Rushing",
        skills: &[
            ("carrying", "Carrying"),
            ("trucking", "Trucking"),
            ("backfieldVision", "Ball Carrier Vision"),
            ("stiffArm", "Stiff Arm"),
            ("spinMove", "Spin Move"),
            ("jukeMove", "Juke Move"),
            ("breakTackle", "Break Tackle"),
            ("changeOfDirection", "Change of Direction"),
        ],
    },
    SkillCategory {
        key: "receiving",
        name: "Receiving",
        skills: &[
            ("catching", "Catching"),
            ("spectacularCatch", "Spectacular Catch"),
            ("catchInTraffic", "Catch in Traffic"),
            ("shortRouteRun", "Short Routes"),
            ("mediumRouteRun", "Medium Routes"),
            ("deepRouteRun", "Deep Routes"),
            ("release", "Release"),
        ],
    },
    SkillCategory {
        key: "blocking",
        name: "Blocking",
        skills: &[
            ("runBlock", "Run Block"),
            ("passBlock", "Pass Block"),
            ("impactBlocking", "Impact Block"),
            ("runBlockPower", "Run Block Power"),
            ("runBlockFinesse", "Run Block Finesse"),
            ("passBlockPower", "Pass Block Power"),
            ("passBlockFinesse", "Pass Block Finesse"),
            ("leadBlock", "Lead Block"),
        ],
    },
    SkillCategory {
        key: "defense",
        name: "Defense",
        skills: &[
            ("tackle", "Tackle"),
            ("hitPower", "Hit Power"),
            ("powerMoves", "Power Moves"),
            ("finesseMoves", "Finesse Moves"),
            ("blockShedding", "Block Shedding"),
            ("pursuit", "Pursuit"),
            ("playRecognition", "Play Recognition"),
        ],
    },
    SkillCategory {
        key: "coverage",
        name: "Coverage",
        skills: &[
            ("manCoverage", "Man Coverage"),
            ("zoneCoverage", "Zone Coverage"),
            ("playRecognition", "Play Recognition"),
            ("press", "Press"),
        ],
    },
    SkillCategory {
        key: "kicking",
        name: "Kicking",
        skills: &[
            ("kickPower", "Kick Power"),
            ("kickAccuracy", "Kick Accuracy"),
            ("kickReturn", "Kick Return"),
            ("longSnapRating", "Long Snap"),
        ],
    },
];

/// Every skill key once, in category order. `playRecognition` sits in two
/// categories.
pub fn all_skills() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for category in SKILL_CATEGORIES {
        for (key, _) in category.skills {
            if !out.contains(key) {
                out.push(*key);
            }
        }
    }
    out
}

pub fn is_skill(name: &str) -> bool {
    SKILL_CATEGORIES
        .iter()
        .any(|c| c.skills.iter().any(|(key, _)| *key == name))
}

pub fn skill_label(name: &str) -> Option<&'static str> {
    SKILL_CATEGORIES
        .iter()
        .flat_map(|c| c.skills.iter())
        .find(|(key, _)| *key == name)
        .map(|(_, label)| *label)
}

/// The player's three highest ratings as `(key, value)`, best first. Ties keep
/// category order; skills the player lacks are skipped.
pub fn best_three(player: &Player) -> Vec<(&'static str, i64)> {
    let mut rated: Vec<(&'static str, i64)> = all_skills()
        .into_iter()
        .filter_map(|key| player.skill(key).map(|value| (key, value)))
        .collect();
    rated.sort_by(|a, b| b.1.cmp(&a.1));
    rated.truncate(3);
    rated
}
