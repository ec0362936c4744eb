use serde::{Deserialize, Serialize};

/// Trophy award for one completed session, broken into named components.
/// `final_amount = round(sum(components) * difficulty_multiplier)`, floored
/// at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrophyBreakdown {
    pub base_trophies: u32,
    pub accuracy_bonus: u32,
    pub streak_bonus: u32,
    pub speed_bonus: u32,
    pub completion_bonus: u32,
    pub difficulty_multiplier: f64,
    pub final_amount: u32,
}

impl TrophyBreakdown {
    pub fn component_sum(&self) -> u32 {
        self.base_trophies
            + self.accuracy_bonus
            + self.streak_bonus
            + self.speed_bonus
            + self.completion_bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrophyReward {
    pub total_trophies: u32,
    pub breakdown: TrophyBreakdown,
}
