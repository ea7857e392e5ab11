use crate::domain::SeatIndex;

/// Следующее место по часовой стрелке после `after` среди `seats`
/// (отсортированы по возрастанию). Если больших нет – самое младшее.
pub fn next_seat_clockwise(seats: &[SeatIndex], after: SeatIndex) -> Option<SeatIndex> {
    seats
        .iter()
        .copied()
        .find(|&s| s > after)
        .or_else(|| seats.first().copied())
}

/// Места по часовой стрелке, начиная со следующего после `after`.
pub fn clockwise_from(seats: &[SeatIndex], after: SeatIndex) -> Vec<SeatIndex> {
    let (behind, ahead): (Vec<SeatIndex>, Vec<SeatIndex>) =
        seats.iter().copied().partition(|&s| s <= after);
    ahead.into_iter().chain(behind).collect()
}

/// Новая позиция кнопки:
/// - если кнопка уже была – следующее подходящее место;
/// - если нет – первое подходящее место от нуля.
pub fn next_dealer(eligible: &[SeatIndex], previous: Option<SeatIndex>) -> Option<SeatIndex> {
    match previous {
        Some(button) => next_seat_clockwise(eligible, button),
        None => eligible.first().copied(),
    }
}

/// Кнопка, блайнды и первый ходящий на префлопе.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindPositions {
    pub button: SeatIndex,
    pub small_blind: SeatIndex,
    pub big_blind: SeatIndex,
    pub first_to_act: SeatIndex,
}

/// Хедз-ап: кнопка ставит SB и ходит первой на префлопе.
/// 3+ игроков: SB слева от кнопки, BB следующий, первым ходит место после BB.
pub fn blind_positions(eligible: &[SeatIndex], button: SeatIndex) -> Option<BlindPositions> {
    if eligible.len() < 2 {
        return None;
    }
    if eligible.len() == 2 {
        let other = next_seat_clockwise(eligible, button)?;
        return Some(BlindPositions {
            button,
            small_blind: button,
            big_blind: other,
            first_to_act: button,
        });
    }
    let small_blind = next_seat_clockwise(eligible, button)?;
    let big_blind = next_seat_clockwise(eligible, small_blind)?;
    let first_to_act = next_seat_clockwise(eligible, big_blind)?;
    Some(BlindPositions {
        button,
        small_blind,
        big_blind,
        first_to_act,
    })
}
