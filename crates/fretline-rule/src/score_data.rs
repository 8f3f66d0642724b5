use serde::Serialize;

use crate::judge_window::JudgeLevel;

/// In-memory tally of one play session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreData {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
    pub hold_completed: u32,
    pub hold_failed: u32,
    pub combo: u32,
    pub max_combo: u32,
}

impl ScoreData {
    /// Count a judged event. `Empty` is ignored.
    pub fn update(&mut self, level: JudgeLevel) {
        match level {
            JudgeLevel::Perfect => {
                self.perfect += 1;
                self.add_combo();
            }
            JudgeLevel::Good => {
                self.good += 1;
                self.add_combo();
            }
            JudgeLevel::Miss => {
                self.miss += 1;
                self.combo = 0;
            }
            JudgeLevel::Empty => {}
        }
    }

    pub fn on_hold_completed(&mut self) {
        self.hold_completed += 1;
    }

    pub fn on_hold_failed(&mut self) {
        self.hold_failed += 1;
        self.combo = 0;
    }

    /// Number of events judged by hit or miss.
    pub fn judged_count(&self) -> u32 {
        self.perfect + self.good + self.miss
    }

    fn add_combo(&mut self) {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_extend_combo() {
        let mut score = ScoreData::default();
        score.update(JudgeLevel::Perfect);
        score.update(JudgeLevel::Good);
        score.update(JudgeLevel::Perfect);
        assert_eq!(score.perfect, 2);
        assert_eq!(score.good, 1);
        assert_eq!(score.combo, 3);
        assert_eq!(score.max_combo, 3);
        assert_eq!(score.judged_count(), 3);
    }

    #[test]
    fn miss_resets_combo_but_keeps_max() {
        let mut score = ScoreData::default();
        score.update(JudgeLevel::Perfect);
        score.update(JudgeLevel::Perfect);
        score.update(JudgeLevel::Miss);
        score.update(JudgeLevel::Good);
        assert_eq!(score.combo, 1);
        assert_eq!(score.max_combo, 2);
        assert_eq!(score.miss, 1);
    }

    #[test]
    fn empty_is_not_counted() {
        let mut score = ScoreData::default();
        score.update(JudgeLevel::Perfect);
        score.update(JudgeLevel::Empty);
        assert_eq!(score.judged_count(), 1);
        assert_eq!(score.combo, 1);
    }

    #[test]
    fn failed_hold_breaks_combo() {
        let mut score = ScoreData::default();
        score.update(JudgeLevel::Perfect);
        score.on_hold_completed();
        assert_eq!(score.combo, 1);
        score.on_hold_failed();
        assert_eq!(score.combo, 0);
        assert_eq!(score.hold_completed, 1);
        assert_eq!(score.hold_failed, 1);
    }
}
