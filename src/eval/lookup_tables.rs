use crate::domain::card::Rank;

/// Битовая маска рангов.
///
/// Используем 13 бит (от 2 до A):
/// бит 0 = двойка, бит 12 = туз.
pub type RankMask = u16;

/// Маска пяти подряд идущих рангов со старшим `high` (6..=14).
const fn run_mask(high: u8) -> RankMask {
    let mut mask: RankMask = 0;
    let mut r = high - 4;
    while r <= high {
        mask |= 1 << (r - 2);
        r += 1;
    }
    mask
}

/// Колесо A-2-3-4-5: туз играет как единица.
pub const WHEEL_MASK: RankMask = (1 << 12) | 0b1111;

/// Маски стритов от бродвея к шестёрке: (старшая карта, маска).
/// Колесо проверяется отдельно последним.
pub const STRAIGHT_MASKS: [(u8, RankMask); 9] = [
    (14, run_mask(14)),
    (13, run_mask(13)),
    (12, run_mask(12)),
    (11, run_mask(11)),
    (10, run_mask(10)),
    (9, run_mask(9)),
    (8, run_mask(8)),
    (7, run_mask(7)),
    (6, run_mask(6)),
];

/// Получить битовую маску для одного ранга.
pub fn rank_to_bit(rank: Rank) -> RankMask {
    1u16 << (rank.value() - 2)
}

/// Найти стрит в битовой маске рангов.
/// Возвращает значение старшей карты стрита (для колеса это 5).
pub fn detect_straight(rank_mask: RankMask) -> Option<u8> {
    STRAIGHT_MASKS
        .iter()
        .find(|(_, m)| rank_mask & m == *m)
        .map(|(high, _)| *high)
        .or_else(|| (rank_mask & WHEEL_MASK == WHEEL_MASK).then_some(5))
}
