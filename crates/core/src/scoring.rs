//! Scoring module - cascade step scoring
//!
//! The score of one cascade step is
//! `10 * cells_removed * max(1, chain_bonus + connection_bonus + color_bonus)`.
//! Garbage conversion depends on these exact integer values, so the tables
//! below must not be tuned.

use puyo_duel_types::Puyo;

/// Score breakdown of one cascade step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Colored cells removed by the step (garbage never counts)
    pub cells_removed: u32,
    pub chain_bonus: u32,
    pub connection_bonus: u32,
    pub color_bonus: u32,
    /// `max(1, chain_bonus + connection_bonus + color_bonus)`
    pub multiplier: u32,
    pub total: u32,
}

/// Chain bonus for the n-th step of a cascade (1-based)
///
/// 8 per step up to the third step, then 32 per step beyond it:
/// 0, 8, 16, 32, 64, 96, ...
pub fn chain_bonus(chain_num: u32) -> u32 {
    match chain_num {
        0 => 0,
        1..=3 => 8 * (chain_num - 1),
        _ => 32 * (chain_num - 3),
    }
}

/// Bonus for one popped group of `count` cells
pub fn group_bonus(count: usize) -> u32 {
    match count {
        0..=4 => 0,
        5..=10 => (count - 3) as u32,
        _ => 10,
    }
}

/// Connection bonus for a list of popped groups
pub fn connection_bonus(connections: &[(Puyo, usize)]) -> u32 {
    connections.iter().map(|&(_, count)| group_bonus(count)).sum()
}

/// Color bonus for the number of distinct colors popped in one step
pub fn color_bonus(color_count: usize) -> u32 {
    match color_count {
        0 | 1 => 0,
        2 | 3 => 3 * (color_count as u32 - 1),
        _ => 12 * (color_count as u32 - 3),
    }
}

/// Number of distinct colors among the popped groups
pub fn distinct_colors(connections: &[(Puyo, usize)]) -> usize {
    let mut seen = [false; 5];
    for &(puyo, _) in connections {
        seen[puyo.code() as usize - 1] = true;
    }
    seen.iter().filter(|s| **s).count()
}

/// Score one cascade step from its popped groups
///
/// # Examples
///
/// ```
/// use puyo_duel_core::scoring::calculate_score;
/// use puyo_duel_types::Puyo;
///
/// let result = calculate_score(1, &[(Puyo::Red, 4)]);
/// assert_eq!(result.multiplier, 1);
/// assert_eq!(result.total, 40);
/// ```
pub fn calculate_score(chain_num: u32, connections: &[(Puyo, usize)]) -> ScoreResult {
    let cells_removed: u32 = connections.iter().map(|&(_, count)| count as u32).sum();

    let chain = chain_bonus(chain_num);
    let connection = connection_bonus(connections);
    let color = color_bonus(distinct_colors(connections));
    let multiplier = (chain + connection + color).max(1);

    ScoreResult {
        cells_removed,
        chain_bonus: chain,
        connection_bonus: connection,
        color_bonus: color,
        multiplier,
        total: 10 * cells_removed * multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_bonus_table() {
        let expected = [0, 8, 16, 32, 64, 96, 128, 160];
        for (i, bonus) in expected.iter().enumerate() {
            assert_eq!(chain_bonus(i as u32 + 1), *bonus, "chain {}", i + 1);
        }
    }

    #[test]
    fn test_group_bonus_steps() {
        assert_eq!(group_bonus(4), 0);
        assert_eq!(group_bonus(5), 2);
        assert_eq!(group_bonus(10), 7);
        assert_eq!(group_bonus(11), 10);
        assert_eq!(group_bonus(30), 10);
        assert_eq!(connection_bonus(&[(Puyo::Red, 5), (Puyo::Blue, 6)]), 5);
    }

    #[test]
    fn test_color_bonus() {
        assert_eq!(color_bonus(1), 0);
        assert_eq!(color_bonus(2), 3);
        assert_eq!(color_bonus(3), 6);
        assert_eq!(color_bonus(4), 12);
    }

    #[test]
    fn test_single_group_of_four() {
        let result = calculate_score(1, &[(Puyo::Red, 4)]);
        assert_eq!(result.cells_removed, 4);
        assert_eq!(result.chain_bonus, 0);
        assert_eq!(result.connection_bonus, 0);
        assert_eq!(result.color_bonus, 0);
        assert_eq!(result.multiplier, 1);
        assert_eq!(result.total, 40);
    }

    #[test]
    fn test_second_step_two_colors() {
        // chain 8 + color 3
        let result = calculate_score(2, &[(Puyo::Red, 4), (Puyo::Blue, 4)]);
        assert_eq!(result.multiplier, 11);
        assert_eq!(result.total, 10 * 8 * 11);
    }

    #[test]
    fn test_ten_group_scores_seven_hundred() {
        let result = calculate_score(1, &[(Puyo::Yellow, 10)]);
        assert_eq!(result.multiplier, 7);
        assert_eq!(result.total, 700);
    }

    #[test]
    fn test_repeated_color_counts_once() {
        let connections = [(Puyo::Green, 4), (Puyo::Green, 4), (Puyo::Red, 4)];
        assert_eq!(distinct_colors(&connections), 2);
    }

    #[test]
    fn test_empty_step_scores_zero() {
        let result = calculate_score(1, &[]);
        assert_eq!(result.multiplier, 1);
        assert_eq!(result.total, 0);
    }
}
